use super::{Genre, UserInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemImage {
    pub url: String,
    pub hint: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub author: UserInfo,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    pub id: Uuid,
    pub title: String,
    pub caption: Option<String>,
    pub body: String,
    pub genre: Genre,
    pub image: PoemImage,
    /// Users who liked the poem, oldest first. Never holds a user twice.
    pub likes: Vec<UserInfo>,
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Poem {
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|u| u.id == user_id)
    }

    pub fn like_summary(&self, viewer: Option<Uuid>) -> LikeSummary {
        LikeSummary {
            poem_id: self.id,
            liked: viewer.is_some_and(|id| self.is_liked_by(id)),
            count: self.likes.len() as u32,
        }
    }
}

/// Authoritative like state for one poem as seen by one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSummary {
    pub poem_id: Uuid,
    pub liked: bool,
    pub count: u32,
}

/// A poem together with the viewer's like state, as rendered on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemListing {
    pub poem: Poem,
    pub like: LikeSummary,
}

impl PoemListing {
    pub fn new(poem: Poem, viewer: Option<Uuid>) -> Self {
        let like = poem.like_summary(viewer);
        Self { poem, like }
    }
}
