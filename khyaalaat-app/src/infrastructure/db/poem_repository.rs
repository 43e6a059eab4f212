use super::entities::{comment, like, poem, Comment, Like, Poem};
use crate::domain::{NewPoem, PoemImage};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, PaginatorTrait, TransactionTrait};
use uuid::Uuid;

#[derive(Clone)]
pub struct PoemRepository {
    db: DatabaseConnection,
}

impl PoemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        poem: &NewPoem,
        image: &PoemImage,
        owner: Uuid,
    ) -> Result<poem::Model, DbErr> {
        let active = poem::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(poem.title.clone()),
            caption: Set(poem.caption.clone()),
            body: Set(poem.body.clone()),
            genre: Set(poem.genre.as_str().to_string()),
            image_url: Set(image.url.clone()),
            image_hint: Set(image.hint.clone()),
            image_description: Set(image.description.clone()),
            user_id: Set(Some(owner)),
            created_at: Set(chrono::Utc::now()),
        };
        active.insert(&self.db).await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, DbErr> {
        Ok(Poem::find_by_id(id).count(&self.db).await? > 0)
    }

    pub async fn list_newest_first(&self) -> Result<Vec<poem::Model>, DbErr> {
        Poem::find()
            .order_by_desc(poem::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Deletes the poem with its likes and comments in one transaction and
    /// returns the deleted row, or `None` when there was nothing to delete.
    pub async fn delete_with_children(&self, id: Uuid) -> Result<Option<poem::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let Some(existing) = Poem::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        Like::delete_many()
            .filter(like::Column::PoemId.eq(id))
            .exec(&txn)
            .await?;
        Comment::delete_many()
            .filter(comment::Column::PoemId.eq(id))
            .exec(&txn)
            .await?;
        Poem::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(Some(existing))
    }
}
