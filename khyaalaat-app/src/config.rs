//! Runtime configuration read from the environment.

const DEMO_MARKER: &str = "demo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveBackend {
    pub supabase_url: String,
    pub anon_key: String,
    /// Used for storage writes. Falls back to the anon key when unset.
    pub service_role_key: String,
    pub database_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    Live(LiveBackend),
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: BackendMode,
    pub admin_email: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let supabase_url = get("SUPABASE_URL");
        let anon_key = get("SUPABASE_ANON_KEY");
        let database_url = get("DATABASE_URL");

        let mode = match (supabase_url, anon_key, database_url) {
            (Some(url), Some(anon_key), Some(database_url))
                if !is_demo_value(&url) && !is_demo_value(&database_url) =>
            {
                let service_role_key =
                    get("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_else(|| anon_key.clone());
                BackendMode::Live(LiveBackend {
                    supabase_url: url.trim_end_matches('/').to_string(),
                    anon_key,
                    service_role_key,
                    database_url,
                })
            }
            _ => BackendMode::Demo,
        };

        let run_migrations = get("RUN_MIGRATIONS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            mode,
            admin_email: get("ADMIN_EMAIL"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            run_migrations,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.mode, BackendMode::Demo)
    }
}

fn is_demo_value(value: &str) -> bool {
    value.to_ascii_lowercase().contains(DEMO_MARKER)
}
