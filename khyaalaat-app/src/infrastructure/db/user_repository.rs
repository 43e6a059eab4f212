use super::entities::{user, User};
use crate::domain::UserIdentity;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>, DbErr> {
        User::find_by_id(id).one(&self.db).await
    }

    pub async fn find_many(&self, ids: Vec<Uuid>) -> Result<Vec<user::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await
    }

    pub async fn upsert(&self, identity: &UserIdentity) -> Result<user::Model, DbErr> {
        let now = chrono::Utc::now();
        if let Some(existing) = self.find_by_id(identity.id).await? {
            let mut active: user::ActiveModel = existing.into();
            active.email = Set(identity.email.clone());
            active.name = Set(identity.name.clone());
            active.photo = Set(identity.photo.clone());
            active.updated_at = Set(now);
            active.update(&self.db).await
        } else {
            let active = user::ActiveModel {
                id: Set(identity.id),
                email: Set(identity.email.clone()),
                name: Set(identity.name.clone()),
                photo: Set(identity.photo.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            };
            active.insert(&self.db).await
        }
    }
}
