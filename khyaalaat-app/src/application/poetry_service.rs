use super::{skipped, AuthGate};
use crate::domain::{
    validate_comment, Comment, ImageUpload, LikeSummary, Poem, PoemImage, PoemListing,
    PoemUploadForm, UserIdentity, WriteOutcome,
};
use crate::infrastructure::security::InputSanitizer;
use crate::infrastructure::store::PoetryStore;
use crate::infrastructure::supabase::SupabaseStorage;
use khyaalaat_errors::{AppError, FieldErrors};
use uuid::Uuid;

pub struct PoetryService {
    store: PoetryStore,
    storage: Option<SupabaseStorage>,
    gate: AuthGate,
}

impl PoetryService {
    pub fn new(store: PoetryStore, storage: Option<SupabaseStorage>, gate: AuthGate) -> Self {
        Self {
            store,
            storage,
            gate,
        }
    }

    /// Poems newest first, with the viewer's like state.
    pub async fn list_poems(
        &self,
        viewer: Option<&UserIdentity>,
    ) -> Result<Vec<PoemListing>, AppError> {
        self.store.list_poems(viewer.map(|v| v.id)).await
    }

    /// Checked before an upload body is read. Demo mode lets everyone
    /// through since the upload is skipped anyway.
    pub fn authorize_upload(&self, identity: Option<&UserIdentity>) -> Result<(), AppError> {
        if self.store.live().is_some() {
            self.gate.require_admin(identity)?;
        }
        Ok(())
    }

    pub async fn upload_poem(
        &self,
        identity: Option<&UserIdentity>,
        form: &PoemUploadForm,
        image: Option<ImageUpload>,
    ) -> Result<WriteOutcome<Poem>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("upload poem {:?}", form.title));
        };
        let admin = self.gate.require_admin(identity)?;

        let form = PoemUploadForm {
            caption: InputSanitizer::clean_text(&form.caption),
            poem: InputSanitizer::clean_text(&form.poem),
            ..form.clone()
        };
        let poem = form.validate_with_image(image.as_ref())?;
        let Some(image) = image else {
            return Err(FieldErrors::single("image", "Image is required.").into());
        };

        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| AppError::Internal("image storage is not configured".to_string()))?;
        let url = storage
            .upload(image.bytes, &image.content_type, &image.file_name, admin.id)
            .await?;

        let image = PoemImage {
            url: url.clone(),
            hint: poem.title.clone(),
            description: poem.caption.clone().unwrap_or_else(|| poem.title.clone()),
        };

        match db.insert_poem(&poem, &image, admin).await {
            Ok(saved) => {
                tracing::info!(poem = %saved.id, title = %saved.title, "Poem uploaded");
                Ok(WriteOutcome::Stored(saved))
            }
            Err(e) => {
                if let Err(cleanup) = storage.delete(&url).await {
                    tracing::warn!("Could not remove orphaned image {}: {}", url, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Deletes the poem, its likes and comments, then its image. A failed
    /// image delete is logged and otherwise ignored.
    pub async fn delete_poem(
        &self,
        identity: Option<&UserIdentity>,
        poem_id: Uuid,
    ) -> Result<WriteOutcome<()>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("delete poem {poem_id}"));
        };
        self.gate.require_admin(identity)?;

        let image_url = db
            .delete_poem(poem_id)
            .await?
            .ok_or_else(|| AppError::NotFound("poem".to_string()))?;
        tracing::info!(poem = %poem_id, "Poem deleted");

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.delete(&image_url).await {
                tracing::warn!("Could not delete image {}: {}", image_url, e);
            }
        }
        Ok(WriteOutcome::Stored(()))
    }

    pub async fn toggle_like(
        &self,
        identity: Option<&UserIdentity>,
        poem_id: Uuid,
    ) -> Result<WriteOutcome<LikeSummary>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("toggle like on {poem_id}"));
        };
        let user = self.gate.require_user(identity)?;

        db.toggle_like(poem_id, user)
            .await?
            .map(WriteOutcome::Stored)
            .ok_or_else(|| AppError::NotFound("poem".to_string()))
    }

    pub async fn add_comment(
        &self,
        identity: Option<&UserIdentity>,
        poem_id: Uuid,
        text: &str,
    ) -> Result<WriteOutcome<Comment>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("add comment to {poem_id}"));
        };
        let user = self.gate.require_user(identity)?;
        let text = validate_comment(&InputSanitizer::clean_text(text))?;

        db.add_comment(poem_id, user, &text)
            .await?
            .map(WriteOutcome::Stored)
            .ok_or_else(|| AppError::NotFound("poem".to_string()))
    }

    /// The comment's author and the admin may delete a comment.
    pub async fn delete_comment(
        &self,
        identity: Option<&UserIdentity>,
        poem_id: Uuid,
        comment_id: Uuid,
    ) -> Result<WriteOutcome<()>, AppError> {
        let Some(db) = self.store.live() else {
            return skipped(&format!("delete comment {comment_id}"));
        };
        let user = self.gate.require_user(identity)?;

        let author = db
            .comment_author(poem_id, comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("comment".to_string()))?;
        if author != user.id && !self.gate.is_admin(user) {
            return Err(AppError::Forbidden(
                "only the author or the site owner can delete this comment".to_string(),
            ));
        }

        if db.delete_comment(comment_id).await? {
            Ok(WriteOutcome::Stored(()))
        } else {
            Err(AppError::NotFound("comment".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Genre, NewPoem};
    use crate::infrastructure::db::{test_connection, DbStore};
    use crate::infrastructure::fixture::FixtureStore;

    const ADMIN_EMAIL: &str = "poet@example.com";

    fn identity(email: &str) -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            name: email.split('@').next().map(str::to_string),
            photo: None,
            is_anonymous: false,
        }
    }

    fn guest() -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: None,
            name: Some("Guest".into()),
            photo: None,
            is_anonymous: true,
        }
    }

    async fn live_service() -> (PoetryService, DbStore, Poem) {
        let db = DbStore::new(test_connection().await);
        let poem = db
            .insert_poem(
                &NewPoem {
                    title: "Rise Above".into(),
                    caption: None,
                    body: "When the mountain seems too high to climb".into(),
                    genre: Genre::Motivational,
                },
                &PoemImage {
                    url: "https://picsum.photos/seed/peak/600/400".into(),
                    hint: "Mountain peak".into(),
                    description: "Person standing on mountain peak".into(),
                },
                &identity(ADMIN_EMAIL),
            )
            .await
            .unwrap();
        let service = PoetryService::new(
            PoetryStore::Database(db.clone()),
            None,
            AuthGate::new(Some(ADMIN_EMAIL.into())),
        );
        (service, db, poem)
    }

    fn demo_service() -> PoetryService {
        PoetryService::new(
            PoetryStore::Fixture(FixtureStore::new()),
            None,
            AuthGate::new(Some(ADMIN_EMAIL.into())),
        )
    }

    #[tokio::test]
    async fn non_admin_cannot_delete_a_poem() {
        let (service, _, poem) = live_service().await;
        let reader = identity("reader@example.com");

        let result = service.delete_poem(Some(&reader), poem.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(service.list_poems(None).await.unwrap().len(), 1);

        let anonymous = service.delete_poem(None, poem.id).await;
        assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn admin_deletes_a_poem_once() {
        let (service, _, poem) = live_service().await;
        let admin = identity(ADMIN_EMAIL);

        assert_eq!(
            service.delete_poem(Some(&admin), poem.id).await,
            Ok(WriteOutcome::Stored(()))
        );
        assert!(service.list_poems(None).await.unwrap().is_empty());
        assert!(matches!(
            service.delete_poem(Some(&admin), poem.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn guests_can_like_but_visitors_must_sign_in() {
        let (service, _, poem) = live_service().await;

        assert!(matches!(
            service.toggle_like(None, poem.id).await,
            Err(AppError::Unauthorized(_))
        ));

        let guest = guest();
        let summary = service
            .toggle_like(Some(&guest), poem.id)
            .await
            .unwrap()
            .stored()
            .unwrap();
        assert!(summary.liked);
        assert_eq!(summary.count, 1);

        let listing = service.list_poems(Some(&guest)).await.unwrap();
        assert!(listing[0].like.liked);
    }

    #[tokio::test]
    async fn liking_a_deleted_poem_is_not_found() {
        let (service, _, _) = live_service().await;
        let result = service.toggle_like(Some(&guest()), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn comments_are_validated_and_trimmed() {
        let (service, _, poem) = live_service().await;
        let reader = identity("reader@example.com");

        let blank = service.add_comment(Some(&reader), poem.id, "   ").await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let comment = service
            .add_comment(Some(&reader), poem.id, "  Very motivating!  ")
            .await
            .unwrap()
            .stored()
            .unwrap();
        assert_eq!(comment.text, "Very motivating!");
        assert_eq!(comment.author.id, reader.id);
    }

    #[tokio::test]
    async fn only_the_author_or_admin_deletes_a_comment() {
        let (service, _, poem) = live_service().await;
        let author = identity("author@example.com");
        let other = identity("other@example.com");
        let admin = identity(ADMIN_EMAIL);

        let first = service
            .add_comment(Some(&author), poem.id, "First!")
            .await
            .unwrap()
            .stored()
            .unwrap();
        let second = service
            .add_comment(Some(&author), poem.id, "Second")
            .await
            .unwrap()
            .stored()
            .unwrap();

        assert!(matches!(
            service.delete_comment(Some(&other), poem.id, first.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(service
            .delete_comment(Some(&author), poem.id, first.id)
            .await
            .is_ok());
        assert!(service
            .delete_comment(Some(&admin), poem.id, second.id)
            .await
            .is_ok());
        assert!(matches!(
            service.delete_comment(Some(&admin), poem.id, second.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn upload_checks_the_admin_before_anything_else() {
        let (service, _, _) = live_service().await;
        let form = PoemUploadForm::default();
        let result = service
            .upload_poem(Some(&identity("reader@example.com")), &form, None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let invalid = service
            .upload_poem(Some(&identity(ADMIN_EMAIL)), &form, None)
            .await;
        let Err(AppError::Validation(errors)) = invalid else {
            panic!("empty form should fail validation");
        };
        assert_eq!(errors.get("image"), Some("Image is required."));
    }

    #[tokio::test]
    async fn demo_mode_lists_fixtures_and_skips_every_write() {
        let service = demo_service();
        let poems = service.list_poems(None).await.unwrap();
        assert_eq!(poems.len(), 3);

        let poem_id = poems[0].poem.id;
        let comment_id = poems[0].poem.comments[0].id;
        let nobody = None;

        assert!(service.toggle_like(nobody, poem_id).await.unwrap().is_skipped());
        assert!(service
            .add_comment(nobody, poem_id, "hello")
            .await
            .unwrap()
            .is_skipped());
        assert!(service
            .delete_comment(nobody, poem_id, comment_id)
            .await
            .unwrap()
            .is_skipped());
        assert!(service.delete_poem(nobody, poem_id).await.unwrap().is_skipped());
        assert!(service
            .upload_poem(nobody, &PoemUploadForm::default(), None)
            .await
            .unwrap()
            .is_skipped());

        assert_eq!(service.list_poems(None).await.unwrap(), poems);
    }

    #[tokio::test]
    async fn uploads_are_authorized_before_the_body_is_read() {
        let (service, _, _) = live_service().await;
        assert!(matches!(
            service.authorize_upload(None),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.authorize_upload(Some(&identity("reader@example.com"))),
            Err(AppError::Forbidden(_))
        ));
        assert!(service.authorize_upload(Some(&identity(ADMIN_EMAIL))).is_ok());
        assert!(demo_service().authorize_upload(None).is_ok());
    }
}
