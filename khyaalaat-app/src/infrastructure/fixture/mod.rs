//! The static dataset served when no live backend is configured.

mod demo_data;

use crate::domain::{PoemListing, PoemRequest};
use uuid::Uuid;

#[derive(Clone)]
pub struct FixtureStore;

impl FixtureStore {
    pub fn new() -> Self {
        Self
    }

    pub fn list_poems(&self, viewer: Option<Uuid>) -> Vec<PoemListing> {
        demo_data::poems()
            .into_iter()
            .map(|poem| PoemListing::new(poem, viewer))
            .collect()
    }

    pub fn list_requests(&self) -> Vec<PoemRequest> {
        demo_data::requests()
    }
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_dataset_has_three_poems_and_two_requests() {
        let store = FixtureStore::new();
        let poems = store.list_poems(None);
        let titles: Vec<_> = poems.iter().map(|p| p.poem.title.as_str()).collect();
        assert_eq!(titles, ["Whispers of Dawn", "Love's Eternal Dance", "Rise Above"]);
        assert_eq!(poems[0].like.count, 2);

        let requests = store.list_requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].created_at > requests[1].created_at);
    }
}
