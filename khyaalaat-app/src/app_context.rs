use crate::application::{AuthGate, AuthService, PoetryService, RequestService, SuggestTopics};
use crate::config::{AppConfig, BackendMode};
use crate::domain::AppMode;
use crate::infrastructure::db::{create_connection, db_error, run_migrations, verify_schema, DbStore};
use crate::infrastructure::fixture::FixtureStore;
use crate::infrastructure::store::PoetryStore;
use crate::infrastructure::supabase::{SupabaseAuth, SupabaseStorage};
use khyaalaat_errors::AppError;
use std::net::IpAddr;
use std::sync::Arc;

/// Address of the client that made the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub IpAddr);

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub poetry: Arc<PoetryService>,
    pub requests: Arc<RequestService>,
    pub auth: Arc<AuthService>,
    pub suggest_topics: Arc<SuggestTopics>,
}

impl AppContext {
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let gate = AuthGate::new(config.admin_email.clone());

        let (store, storage, auth) = match &config.mode {
            BackendMode::Live(live) => {
                let db = create_connection(&live.database_url)
                    .await
                    .map_err(db_error)?;
                tracing::info!("Database connected");

                if config.run_migrations {
                    run_migrations(&db).await.map_err(db_error)?;
                    tracing::info!("Migrations completed");
                }
                verify_schema(&db).await?;

                let storage = SupabaseStorage::new(&live.supabase_url, &live.service_role_key)?;
                let auth = SupabaseAuth::new(&live.supabase_url, &live.anon_key)?;
                (PoetryStore::Database(DbStore::new(db)), Some(storage), Some(auth))
            }
            BackendMode::Demo => {
                tracing::warn!("Backend not configured, serving sample data in demo mode");
                (PoetryStore::Fixture(FixtureStore::new()), None, None)
            }
        };

        if gate.has_admin() {
            tracing::info!("Admin account configured");
        } else {
            tracing::warn!("ADMIN_EMAIL not set, uploads and request management are disabled");
        }

        Ok(Self {
            poetry: Arc::new(PoetryService::new(store.clone(), storage, gate.clone())),
            requests: Arc::new(RequestService::new(store.clone(), gate.clone())),
            auth: Arc::new(AuthService::new(auth, store, gate)),
            suggest_topics: Arc::new(SuggestTopics::new(config.openrouter_api_key.clone())),
            config: Arc::new(config),
        })
    }

    pub fn mode(&self) -> AppMode {
        AppMode {
            demo: self.config.is_demo(),
            suggestions_enabled: self.suggest_topics.is_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_environment_starts_in_demo_mode() {
        let context = AppContext::from_config(AppConfig::from_lookup(|_| None))
            .await
            .unwrap();
        assert_eq!(
            context.mode(),
            AppMode {
                demo: true,
                suggestions_enabled: false,
            }
        );
        assert_eq!(context.poetry.list_poems(None).await.unwrap().len(), 3);
    }
}
