use super::db::DbStore;
use super::fixture::FixtureStore;
use crate::domain::{PoemListing, PoemRequest};
use khyaalaat_errors::AppError;
use uuid::Uuid;

/// Where poems and requests come from. Chosen once at startup.
#[derive(Clone)]
pub enum PoetryStore {
    Database(DbStore),
    Fixture(FixtureStore),
}

impl PoetryStore {
    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Fixture(_))
    }

    /// The writable store, `None` in demo mode.
    pub fn live(&self) -> Option<&DbStore> {
        match self {
            Self::Database(db) => Some(db),
            Self::Fixture(_) => None,
        }
    }

    pub async fn list_poems(&self, viewer: Option<Uuid>) -> Result<Vec<PoemListing>, AppError> {
        match self {
            Self::Database(db) => db.list_poems(viewer).await,
            Self::Fixture(fixture) => Ok(fixture.list_poems(viewer)),
        }
    }

    pub async fn list_requests(&self) -> Result<Vec<PoemRequest>, AppError> {
        match self {
            Self::Database(db) => db.list_requests().await,
            Self::Fixture(fixture) => Ok(fixture.list_requests()),
        }
    }
}
