use super::{skipped, AuthGate};
use crate::domain::{PoemRequest, PoemRequestForm, UserIdentity, WriteOutcome};
use crate::infrastructure::security::{InputSanitizer, RateLimiter};
use crate::infrastructure::store::PoetryStore;
use khyaalaat_errors::AppError;
use std::net::IpAddr;
use uuid::Uuid;

pub struct RequestService {
    store: PoetryStore,
    gate: AuthGate,
    rate_limiter: RateLimiter,
}

impl RequestService {
    pub fn new(store: PoetryStore, gate: AuthGate) -> Self {
        Self {
            store,
            gate,
            rate_limiter: RateLimiter::new(),
        }
    }

    /// Anyone may ask for a poem; submissions are rate limited per client.
    pub async fn submit_request(
        &self,
        form: &PoemRequestForm,
        client: IpAddr,
    ) -> Result<WriteOutcome<PoemRequest>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("add request from {:?}", form.name));
        };

        let form = PoemRequestForm {
            description: InputSanitizer::clean_text(&form.description),
            ..form.clone()
        };
        let request = form.validate()?;

        self.rate_limiter.check_rate_limit(client).map_err(|e| {
            tracing::warn!(%client, "Request submission rate limited");
            AppError::from(e)
        })?;

        let saved = db.insert_request(&request).await?;
        tracing::info!(request = %saved.id, topic = %saved.topic, "Poem request received");
        Ok(WriteOutcome::Stored(saved))
    }

    /// Requests newest first.
    pub async fn list_requests(&self) -> Result<Vec<PoemRequest>, AppError> {
        self.store.list_requests().await
    }

    pub async fn set_request_completed(
        &self,
        identity: Option<&UserIdentity>,
        id: Uuid,
        completed: bool,
    ) -> Result<WriteOutcome<PoemRequest>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("mark request {id} completed={completed}"));
        };
        self.gate.require_admin(identity)?;

        db.set_request_completed(id, completed)
            .await?
            .map(WriteOutcome::Stored)
            .ok_or_else(|| AppError::NotFound("request".to_string()))
    }

    pub async fn delete_request(
        &self,
        identity: Option<&UserIdentity>,
        id: Uuid,
    ) -> Result<WriteOutcome<()>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("delete request {id}"));
        };
        self.gate.require_admin(identity)?;

        if db.delete_request(id).await? {
            tracing::info!(request = %id, "Poem request deleted");
            Ok(WriteOutcome::Stored(()))
        } else {
            Err(AppError::NotFound("request".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestGenre;
    use crate::infrastructure::db::{test_connection, DbStore};
    use crate::infrastructure::fixture::FixtureStore;
    use std::net::Ipv4Addr;

    const ADMIN_EMAIL: &str = "poet@example.com";
    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 4));

    fn identity(email: &str) -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            name: None,
            photo: None,
            is_anonymous: false,
        }
    }

    fn form(topic: &str) -> PoemRequestForm {
        PoemRequestForm {
            name: "Michael Chen".into(),
            topic: topic.into(),
            genre: "Love".into(),
            mood: "Nostalgic and sweet".into(),
            description: "The butterflies of a first love in high school.".into(),
        }
    }

    async fn live_service() -> RequestService {
        let db = DbStore::new(test_connection().await);
        RequestService::new(
            PoetryStore::Database(db),
            AuthGate::new(Some(ADMIN_EMAIL.into())),
        )
    }

    #[tokio::test]
    async fn submitted_requests_are_listed_newest_first() {
        let service = live_service().await;
        service.submit_request(&form("First love"), CLIENT).await.unwrap();
        service.submit_request(&form("Summer rain"), CLIENT).await.unwrap();

        let requests = service.list_requests().await.unwrap();
        let topics: Vec<_> = requests.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, ["Summer rain", "First love"]);
        assert_eq!(requests[0].genre, RequestGenre::Love);
        assert!(!requests[0].completed);
    }

    #[tokio::test]
    async fn invalid_requests_are_refused() {
        let service = live_service().await;
        let Err(AppError::Validation(errors)) =
            service.submit_request(&form("a"), CLIENT).await
        else {
            panic!("one character topic should fail");
        };
        assert_eq!(errors.get("topic"), Some("Topic must be at least 2 characters."));
        assert!(service.list_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fourth_submission_in_a_minute_is_rate_limited() {
        let service = live_service().await;
        for _ in 0..3 {
            service.submit_request(&form("Ocean waves"), CLIENT).await.unwrap();
        }
        assert!(matches!(
            service.submit_request(&form("Ocean waves"), CLIENT).await,
            Err(AppError::RateLimited(_))
        ));
        assert_eq!(service.list_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn non_admin_cannot_toggle_completion() {
        let service = live_service().await;
        let request = service
            .submit_request(&form("First love"), CLIENT)
            .await
            .unwrap()
            .stored()
            .unwrap();

        let reader = identity("reader@example.com");
        assert!(matches!(
            service.set_request_completed(Some(&reader), request.id, true).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(!service.list_requests().await.unwrap()[0].completed);

        let admin = identity(ADMIN_EMAIL);
        let updated = service
            .set_request_completed(Some(&admin), request.id, true)
            .await
            .unwrap()
            .stored()
            .unwrap();
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let service = live_service().await;
        let request = service
            .submit_request(&form("First love"), CLIENT)
            .await
            .unwrap()
            .stored()
            .unwrap();
        let admin = identity(ADMIN_EMAIL);

        assert!(service.delete_request(Some(&admin), request.id).await.is_ok());
        assert!(matches!(
            service.delete_request(Some(&admin), request.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.set_request_completed(Some(&admin), request.id, false).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn demo_mode_skips_writes() {
        let service = RequestService::new(
            PoetryStore::Fixture(FixtureStore::new()),
            AuthGate::new(None),
        );
        let requests = service.list_requests().await.unwrap();
        assert_eq!(requests.len(), 2);

        assert!(service
            .submit_request(&form("Ocean waves"), CLIENT)
            .await
            .unwrap()
            .is_skipped());
        assert!(service
            .set_request_completed(None, requests[0].id, true)
            .await
            .unwrap()
            .is_skipped());
        assert!(service
            .delete_request(None, requests[0].id)
            .await
            .unwrap()
            .is_skipped());
        assert_eq!(service.list_requests().await.unwrap(), requests);
    }
}
