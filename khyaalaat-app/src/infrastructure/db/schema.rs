use super::entities::{schema_version, Comment, Like, Poem, PoemRequest, SchemaVersion, User};
use khyaalaat_errors::AppError;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, EntityName, Schema,
};

/// Bump whenever an entity gains, loses or renames a column.
pub const SCHEMA_VERSION: i32 = 1;

const VERSION_ROW: i32 = 1;

/// Creates every table that does not exist yet and records `SCHEMA_VERSION`.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    // Parents before children so foreign keys resolve.
    create_table(db, &schema, User).await?;
    create_table(db, &schema, Poem).await?;
    create_table(db, &schema, Comment).await?;
    create_table(db, &schema, Like).await?;
    create_table(db, &schema, PoemRequest).await?;
    create_table(db, &schema, SchemaVersion).await?;

    let row = schema_version::ActiveModel {
        id: Set(VERSION_ROW),
        version: Set(SCHEMA_VERSION),
        applied_at: Set(chrono::Utc::now()),
    };
    SchemaVersion::insert(row)
        .on_conflict(
            OnConflict::column(schema_version::Column::Id)
                .update_columns([
                    schema_version::Column::Version,
                    schema_version::Column::AppliedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    tracing::info!(version = SCHEMA_VERSION, "Database schema is up to date");
    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(db.get_database_backend().build(&statement))
        .await?;
    Ok(())
}

/// Checks the recorded version and selects every modelled column of every
/// table once. Fails with `SchemaMismatch` on the first difference.
pub async fn verify_schema(db: &DatabaseConnection) -> Result<(), AppError> {
    let recorded = SchemaVersion::find_by_id(VERSION_ROW)
        .one(db)
        .await
        .map_err(|e| AppError::SchemaMismatch(format!("schema_version: {e}")))?;

    match recorded {
        Some(row) if row.version == SCHEMA_VERSION => {}
        Some(row) => {
            return Err(AppError::SchemaMismatch(format!(
                "database is at version {}, this build expects {}",
                row.version, SCHEMA_VERSION
            )))
        }
        None => {
            return Err(AppError::SchemaMismatch(
                "no schema version recorded, start once with RUN_MIGRATIONS=true".to_string(),
            ))
        }
    }

    probe(db, User).await?;
    probe(db, Poem).await?;
    probe(db, Comment).await?;
    probe(db, Like).await?;
    probe(db, PoemRequest).await?;

    tracing::info!(version = SCHEMA_VERSION, "Database schema verified");
    Ok(())
}

async fn probe<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), AppError> {
    E::find()
        .limit(1)
        .all(db)
        .await
        .map(|_| ())
        .map_err(|e| AppError::SchemaMismatch(format!("table {}: {e}", entity.table_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::test_connection;
    use sea_orm::{Database, Statement};

    #[tokio::test]
    async fn migrated_database_verifies() {
        let db = test_connection().await;
        assert_eq!(verify_schema(&db).await, Ok(()));
        // Running twice is harmless.
        run_migrations(&db).await.unwrap();
        assert_eq!(verify_schema(&db).await, Ok(()));
    }

    #[tokio::test]
    async fn empty_database_is_a_mismatch() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        assert!(matches!(
            verify_schema(&db).await,
            Err(AppError::SchemaMismatch(_))
        ));
    }

    #[tokio::test]
    async fn missing_column_is_a_mismatch() {
        let db = test_connection().await;
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE poem_requests DROP COLUMN mood",
        ))
        .await
        .unwrap();

        let Err(AppError::SchemaMismatch(message)) = verify_schema(&db).await else {
            panic!("dropped column should fail verification");
        };
        assert!(message.contains("poem_requests"));
    }

    #[tokio::test]
    async fn older_version_is_a_mismatch() {
        let db = test_connection().await;
        let row = schema_version::ActiveModel {
            id: Set(VERSION_ROW),
            version: Set(SCHEMA_VERSION - 1),
            applied_at: Set(chrono::Utc::now()),
        };
        row.update(&db).await.unwrap();
        assert!(matches!(
            verify_schema(&db).await,
            Err(AppError::SchemaMismatch(_))
        ));
    }
}
