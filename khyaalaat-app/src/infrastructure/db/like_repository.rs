use super::entities::{like, Like};
use crate::domain::LikeSummary;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, PaginatorTrait};
use uuid::Uuid;

#[derive(Clone)]
pub struct LikeRepository {
    db: DatabaseConnection,
}

impl LikeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn exists(&self, poem_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let found = Like::find_by_id((poem_id, user_id)).one(&self.db).await?;
        Ok(found.is_some())
    }

    /// Inserts the like; a like that already exists is left alone.
    pub async fn create(&self, poem_id: Uuid, user_id: Uuid) -> Result<(), DbErr> {
        let active = like::ActiveModel {
            poem_id: Set(poem_id),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
        };
        Like::insert(active)
            .on_conflict(
                OnConflict::columns([like::Column::PoemId, like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, poem_id: Uuid, user_id: Uuid) -> Result<(), DbErr> {
        Like::delete_many()
            .filter(like::Column::PoemId.eq(poem_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn count(&self, poem_id: Uuid) -> Result<u64, DbErr> {
        Like::find()
            .filter(like::Column::PoemId.eq(poem_id))
            .count(&self.db)
            .await
    }

    /// Flips the like and reports the state the database ended up in.
    pub async fn toggle(&self, poem_id: Uuid, user_id: Uuid) -> Result<LikeSummary, DbErr> {
        let liked = if self.exists(poem_id, user_id).await? {
            self.delete(poem_id, user_id).await?;
            false
        } else {
            self.create(poem_id, user_id).await?;
            true
        };

        let count = self.count(poem_id).await?;
        Ok(LikeSummary {
            poem_id,
            liked,
            count: u32::try_from(count).unwrap_or(u32::MAX),
        })
    }

    pub async fn for_poems(&self, poem_ids: Vec<Uuid>) -> Result<Vec<like::Model>, DbErr> {
        if poem_ids.is_empty() {
            return Ok(Vec::new());
        }
        Like::find()
            .filter(like::Column::PoemId.is_in(poem_ids))
            .order_by_asc(like::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
