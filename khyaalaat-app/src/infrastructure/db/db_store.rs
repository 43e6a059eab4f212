use super::entities::{comment, poem, poem_request, user};
use super::{
    db_error, CommentRepository, LikeRepository, PoemRepository, RequestRepository,
    UserRepository,
};
use crate::domain::{
    Comment, Genre, LikeSummary, NewPoem, NewPoemRequest, Poem, PoemImage, PoemListing,
    PoemRequest, RequestGenre, UserIdentity, UserInfo,
};
use khyaalaat_errors::AppError;
use sea_orm::DatabaseConnection;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Live data source backed by the Supabase Postgres database.
#[derive(Clone)]
pub struct DbStore {
    poems: PoemRepository,
    likes: LikeRepository,
    comments: CommentRepository,
    requests: RequestRepository,
    users: UserRepository,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            poems: PoemRepository::new(db.clone()),
            likes: LikeRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            requests: RequestRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    pub async fn list_poems(&self, viewer: Option<Uuid>) -> Result<Vec<PoemListing>, AppError> {
        let rows = self.poems.list_newest_first().await.map_err(db_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();

        let likes = self.likes.for_poems(ids.clone()).await.map_err(db_error)?;
        let comments = self.comments.for_poems(ids).await.map_err(db_error)?;

        let user_ids: HashSet<Uuid> = likes
            .iter()
            .map(|l| l.user_id)
            .chain(comments.iter().map(|c| c.user_id))
            .collect();
        let users: HashMap<Uuid, UserInfo> = self
            .users
            .find_many(user_ids.into_iter().collect())
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|u| (u.id, user_info(u)))
            .collect();

        let mut likes_by_poem: HashMap<Uuid, Vec<UserInfo>> = HashMap::new();
        for like in likes {
            likes_by_poem
                .entry(like.poem_id)
                .or_default()
                .push(lookup_user(&users, like.user_id));
        }

        let mut comments_by_poem: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for row in comments {
            let author = lookup_user(&users, row.user_id);
            comments_by_poem
                .entry(row.poem_id)
                .or_default()
                .push(to_comment(row, author));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let likes = likes_by_poem.remove(&row.id).unwrap_or_default();
                let comments = comments_by_poem.remove(&row.id).unwrap_or_default();
                PoemListing::new(to_poem(row, likes, comments), viewer)
            })
            .collect())
    }

    pub async fn insert_poem(
        &self,
        poem: &NewPoem,
        image: &PoemImage,
        owner: &UserIdentity,
    ) -> Result<Poem, AppError> {
        self.users.upsert(owner).await.map_err(db_error)?;
        let row = self
            .poems
            .create(poem, image, owner.id)
            .await
            .map_err(db_error)?;
        Ok(to_poem(row, Vec::new(), Vec::new()))
    }

    /// Returns the image URL of the deleted poem, `None` if it did not exist.
    pub async fn delete_poem(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let deleted = self
            .poems
            .delete_with_children(id)
            .await
            .map_err(db_error)?;
        Ok(deleted.map(|row| row.image_url))
    }

    pub async fn toggle_like(
        &self,
        poem_id: Uuid,
        user: &UserIdentity,
    ) -> Result<Option<LikeSummary>, AppError> {
        if !self.poems.exists(poem_id).await.map_err(db_error)? {
            return Ok(None);
        }
        self.users.upsert(user).await.map_err(db_error)?;
        self.likes
            .toggle(poem_id, user.id)
            .await
            .map(Some)
            .map_err(db_error)
    }

    pub async fn add_comment(
        &self,
        poem_id: Uuid,
        author: &UserIdentity,
        text: &str,
    ) -> Result<Option<Comment>, AppError> {
        if !self.poems.exists(poem_id).await.map_err(db_error)? {
            return Ok(None);
        }
        self.users.upsert(author).await.map_err(db_error)?;
        let row = self
            .comments
            .create(poem_id, author.id, text)
            .await
            .map_err(db_error)?;
        Ok(Some(to_comment(row, author.to_user_info())))
    }

    /// Author of a comment, `None` if the comment is not on that poem.
    pub async fn comment_author(
        &self,
        poem_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        let row = self
            .comments
            .find_in_poem(poem_id, comment_id)
            .await
            .map_err(db_error)?;
        Ok(row.map(|c| c.user_id))
    }

    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, AppError> {
        self.comments.delete(comment_id).await.map_err(db_error)
    }

    pub async fn insert_request(&self, request: &NewPoemRequest) -> Result<PoemRequest, AppError> {
        let row = self.requests.create(request).await.map_err(db_error)?;
        to_request(row)
    }

    pub async fn list_requests(&self) -> Result<Vec<PoemRequest>, AppError> {
        let rows = self.requests.list_newest_first().await.map_err(db_error)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match to_request(row) {
                Ok(request) => Some(request),
                Err(e) => {
                    tracing::warn!("Skipping unreadable poem request: {}", e);
                    None
                }
            })
            .collect())
    }

    pub async fn set_request_completed(
        &self,
        id: Uuid,
        completed: bool,
    ) -> Result<Option<PoemRequest>, AppError> {
        let row = self
            .requests
            .set_completed(id, completed)
            .await
            .map_err(db_error)?;
        row.map(to_request).transpose()
    }

    pub async fn delete_request(&self, id: Uuid) -> Result<bool, AppError> {
        self.requests.delete(id).await.map_err(db_error)
    }

    pub async fn upsert_user(&self, identity: &UserIdentity) -> Result<(), AppError> {
        self.users.upsert(identity).await.map_err(db_error)?;
        Ok(())
    }
}

fn user_info(row: user::Model) -> UserInfo {
    UserInfo {
        id: row.id,
        name: row.name,
        photo: row.photo,
    }
}

fn lookup_user(users: &HashMap<Uuid, UserInfo>, id: Uuid) -> UserInfo {
    users.get(&id).cloned().unwrap_or(UserInfo {
        id,
        name: None,
        photo: None,
    })
}

fn to_comment(row: comment::Model, author: UserInfo) -> Comment {
    Comment {
        id: row.id,
        text: row.text,
        author,
        created_at: Some(row.created_at),
    }
}

fn to_poem(row: poem::Model, likes: Vec<UserInfo>, comments: Vec<Comment>) -> Poem {
    let genre = row.genre.parse().unwrap_or_else(|_| {
        tracing::warn!(poem = %row.id, genre = %row.genre, "Unknown genre, showing as Other");
        Genre::Other
    });
    Poem {
        id: row.id,
        title: row.title,
        caption: row.caption,
        body: row.body,
        genre,
        image: PoemImage {
            url: row.image_url,
            hint: row.image_hint,
            description: row.image_description,
        },
        likes,
        comments,
        created_at: Some(row.created_at),
    }
}

fn to_request(row: poem_request::Model) -> Result<PoemRequest, AppError> {
    let genre: RequestGenre = row
        .genre
        .parse()
        .map_err(|e: crate::domain::UnknownGenre| AppError::Internal(e.to_string()))?;
    Ok(PoemRequest {
        id: row.id,
        name: row.name,
        topic: row.topic,
        genre,
        mood: row.mood,
        description: row.description,
        completed: row.completed,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::test_connection;

    fn identity(name: &str) -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            name: Some(name.to_string()),
            photo: None,
            is_anonymous: false,
        }
    }

    fn new_poem(title: &str) -> NewPoem {
        NewPoem {
            title: title.to_string(),
            caption: None,
            body: "Golden rays pierce through morning mist".to_string(),
            genre: Genre::Nature,
        }
    }

    fn image() -> PoemImage {
        PoemImage {
            url: "https://abc.supabase.co/storage/v1/object/public/poetry-images/a/1.png".into(),
            hint: "Morning sunrise".into(),
            description: "Sunrise over mountains".into(),
        }
    }

    async fn store_with_poem() -> (DbStore, Poem, UserIdentity) {
        let store = DbStore::new(test_connection().await);
        let admin = identity("Admin");
        let poem = store
            .insert_poem(&new_poem("Whispers of Dawn"), &image(), &admin)
            .await
            .unwrap();
        (store, poem, admin)
    }

    #[tokio::test]
    async fn like_is_on_after_an_odd_number_of_toggles() {
        let (store, poem, _) = store_with_poem().await;
        let user = identity("Alice");

        for round in 1..=5u32 {
            let summary = store.toggle_like(poem.id, &user).await.unwrap().unwrap();
            assert_eq!(summary.liked, round % 2 == 1);
            assert_eq!(summary.count, round % 2);
        }
    }

    #[tokio::test]
    async fn likes_from_different_users_add_up() {
        let (store, poem, _) = store_with_poem().await;
        store.toggle_like(poem.id, &identity("Alice")).await.unwrap();
        let summary = store
            .toggle_like(poem.id, &identity("Bob"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.count, 2);

        let listing = store.list_poems(None).await.unwrap();
        assert_eq!(listing[0].like.count, 2);
        assert!(!listing[0].like.liked);
    }

    #[tokio::test]
    async fn liking_a_missing_poem_reports_none() {
        let store = DbStore::new(test_connection().await);
        let result = store.toggle_like(Uuid::new_v4(), &identity("Alice")).await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn listing_attaches_comments_and_viewer_state() {
        let (store, poem, _) = store_with_poem().await;
        let alice = identity("Alice");
        store.toggle_like(poem.id, &alice).await.unwrap();
        let comment = store
            .add_comment(poem.id, &alice, "Beautiful poem!")
            .await
            .unwrap()
            .unwrap();

        let listing = store.list_poems(Some(alice.id)).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing[0].like.liked);
        assert_eq!(listing[0].poem.comments, vec![comment]);
        assert_eq!(listing[0].poem.likes[0].display_name(), "Alice");
    }

    #[tokio::test]
    async fn deleting_a_poem_removes_its_children() {
        let (store, poem, _) = store_with_poem().await;
        let alice = identity("Alice");
        store.toggle_like(poem.id, &alice).await.unwrap();
        let comment = store
            .add_comment(poem.id, &alice, "Lovely")
            .await
            .unwrap()
            .unwrap();

        let url = store.delete_poem(poem.id).await.unwrap();
        assert_eq!(url, Some(image().url));
        assert!(store.list_poems(None).await.unwrap().is_empty());
        assert_eq!(store.comment_author(poem.id, comment.id).await, Ok(None));
        assert_eq!(store.delete_poem(poem.id).await, Ok(None));
    }

    #[tokio::test]
    async fn requests_round_trip_through_completion() {
        let store = DbStore::new(test_connection().await);
        let created = store
            .insert_request(&NewPoemRequest {
                name: "Sarah Miller".into(),
                topic: "Ocean waves".into(),
                genre: RequestGenre::Nature,
                mood: "Peaceful".into(),
                description: "The soothing sound of waves.".into(),
            })
            .await
            .unwrap();
        assert!(!created.completed);

        let updated = store
            .set_request_completed(created.id, true)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.completed);
        assert_eq!(store.list_requests().await.unwrap(), vec![updated]);

        assert_eq!(store.delete_request(created.id).await, Ok(true));
        assert_eq!(store.delete_request(created.id).await, Ok(false));
        assert_eq!(store.set_request_completed(created.id, false).await, Ok(None));
    }
}
