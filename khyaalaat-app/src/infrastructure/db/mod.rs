pub mod entities;
mod comment_repository;
mod db_store;
mod like_repository;
mod poem_repository;
mod request_repository;
mod schema;
mod user_repository;

pub use comment_repository::CommentRepository;
pub use db_store::DbStore;
pub use like_repository::LikeRepository;
pub use poem_repository::PoemRepository;
pub use request_repository::RequestRepository;
pub use schema::{run_migrations, verify_schema, SCHEMA_VERSION};
pub use user_repository::UserRepository;

use khyaalaat_errors::AppError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Maps a database failure onto the application taxonomy, logging it here so
/// callers only see the short message.
pub fn db_error(err: DbErr) -> AppError {
    match err {
        DbErr::RecordNotFound(what) => AppError::NotFound(what),
        other => {
            tracing::error!("Database error: {}", other);
            AppError::Backend(other.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_connection() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&db).await.expect("migrations");
    db
}
