use crate::domain::LikeSummary;
use serde::{Deserialize, Serialize};

/// What a like button displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub count: u32,
}

impl LikeState {
    pub fn from_summary(summary: &LikeSummary) -> Self {
        Self {
            liked: summary.liked,
            count: summary.count,
        }
    }

    pub fn toggle(&mut self) {
        if self.liked {
            self.count = self.count.saturating_sub(1);
        } else {
            self.count = self.count.saturating_add(1);
        }
        self.liked = !self.liked;
    }
}
