use super::entities::{poem_request, PoemRequest};
use crate::domain::NewPoemRequest;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct RequestRepository {
    db: DatabaseConnection,
}

impl RequestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: &NewPoemRequest) -> Result<poem_request::Model, DbErr> {
        let active = poem_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.clone()),
            topic: Set(request.topic.clone()),
            genre: Set(request.genre.as_str().to_string()),
            mood: Set(request.mood.clone()),
            description: Set(request.description.clone()),
            completed: Set(false),
            created_at: Set(chrono::Utc::now()),
        };
        active.insert(&self.db).await
    }

    pub async fn list_newest_first(&self) -> Result<Vec<poem_request::Model>, DbErr> {
        PoemRequest::find()
            .order_by_desc(poem_request::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn set_completed(
        &self,
        id: Uuid,
        completed: bool,
    ) -> Result<Option<poem_request::Model>, DbErr> {
        let Some(existing) = PoemRequest::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active: poem_request::ActiveModel = existing.into();
        active.completed = Set(completed);
        active.update(&self.db).await.map(Some)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = PoemRequest::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
