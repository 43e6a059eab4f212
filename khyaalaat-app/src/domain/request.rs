use super::RequestGenre;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemRequest {
    pub id: Uuid,
    pub name: String,
    pub topic: String,
    pub genre: RequestGenre,
    pub mood: String,
    pub description: String,
    pub completed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Input for the topic suggestion helper on the request page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicIdea {
    pub topic: String,
    pub genre: String,
    pub mood: String,
    pub description: String,
}

/// Which optional parts of the site are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMode {
    pub demo: bool,
    pub suggestions_enabled: bool,
}
