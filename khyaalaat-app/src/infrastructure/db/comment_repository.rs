use super::entities::{comment, Comment};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
}

impl CommentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        poem_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> Result<comment::Model, DbErr> {
        let active = comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            poem_id: Set(poem_id),
            user_id: Set(user_id),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now()),
        };
        active.insert(&self.db).await
    }

    pub async fn find_in_poem(
        &self,
        poem_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<comment::Model>, DbErr> {
        Comment::find_by_id(comment_id)
            .filter(comment::Column::PoemId.eq(poem_id))
            .one(&self.db)
            .await
    }

    pub async fn delete(&self, comment_id: Uuid) -> Result<bool, DbErr> {
        let result = Comment::delete_by_id(comment_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn for_poems(&self, poem_ids: Vec<Uuid>) -> Result<Vec<comment::Model>, DbErr> {
        if poem_ids.is_empty() {
            return Ok(Vec::new());
        }
        Comment::find()
            .filter(comment::Column::PoemId.is_in(poem_ids))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
