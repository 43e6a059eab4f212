use crate::domain::{Comment, UserInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Identifier handed out for a comment the server has not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKey {
    Persisted(Uuid),
    Pending(TempId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadEntry {
    Persisted(Comment),
    Pending {
        temp: TempId,
        text: String,
        author: UserInfo,
    },
}

impl ThreadEntry {
    pub fn key(&self) -> CommentKey {
        match self {
            Self::Persisted(comment) => CommentKey::Persisted(comment.id),
            Self::Pending { temp, .. } => CommentKey::Pending(*temp),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Persisted(comment) => &comment.text,
            Self::Pending { text, .. } => text,
        }
    }

    pub fn author(&self) -> &UserInfo {
        match self {
            Self::Persisted(comment) => &comment.author,
            Self::Pending { author, .. } => author,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The synthetic entry was swapped for the canonical comment.
    Confirmed,
    /// The user removed the synthetic entry before the server answered. The
    /// server row with this id is unwanted and should be deleted.
    Orphaned(Uuid),
}

/// A comment hidden while its delete is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelete {
    id: Uuid,
}

impl PendingDelete {
    pub fn comment_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteIntent {
    /// Hidden locally; the server still has to delete it.
    Remote(PendingDelete),
    /// An unconfirmed comment was dropped; nothing to send.
    CancelledLocal,
    Missing,
}

/// An entry plus whether it is hidden by an unfinished delete. Hidden entries
/// keep their place so a failed delete restores the exact order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    entry: ThreadEntry,
    hidden: bool,
}

/// The visible comment list of one poem, including unconfirmed additions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentThread {
    slots: Vec<Slot>,
    next_temp: u64,
}

impl CommentThread {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            slots: comments
                .into_iter()
                .map(|comment| Slot {
                    entry: ThreadEntry::Persisted(comment),
                    hidden: false,
                })
                .collect(),
            next_temp: 0,
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &ThreadEntry> {
        self.slots.iter().filter(|s| !s.hidden).map(|s| &s.entry)
    }

    pub fn entries(&self) -> Vec<ThreadEntry> {
        self.visible().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.visible().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn begin_add(&mut self, text: String, author: UserInfo) -> TempId {
        let temp = TempId(self.next_temp);
        self.next_temp += 1;
        self.slots.push(Slot {
            entry: ThreadEntry::Pending { temp, text, author },
            hidden: false,
        });
        temp
    }

    pub fn confirm_add(&mut self, temp: TempId, canonical: Comment) -> AddOutcome {
        match self.position(CommentKey::Pending(temp)) {
            Some(index) => {
                self.slots[index].entry = ThreadEntry::Persisted(canonical);
                AddOutcome::Confirmed
            }
            None => AddOutcome::Orphaned(canonical.id),
        }
    }

    pub fn fail_add(&mut self, temp: TempId) {
        if let Some(index) = self.position(CommentKey::Pending(temp)) {
            self.slots.remove(index);
        }
    }

    pub fn begin_delete(&mut self, key: CommentKey) -> DeleteIntent {
        let Some(index) = self.position(key).filter(|i| !self.slots[*i].hidden) else {
            return DeleteIntent::Missing;
        };
        match &self.slots[index].entry {
            ThreadEntry::Persisted(comment) => {
                let id = comment.id;
                self.slots[index].hidden = true;
                DeleteIntent::Remote(PendingDelete { id })
            }
            ThreadEntry::Pending { .. } => {
                self.slots.remove(index);
                DeleteIntent::CancelledLocal
            }
        }
    }

    pub fn finish_delete(&mut self, pending: PendingDelete) {
        if let Some(index) = self.position(CommentKey::Persisted(pending.id)) {
            self.slots.remove(index);
        }
    }

    pub fn fail_delete(&mut self, pending: PendingDelete) {
        if let Some(index) = self.position(CommentKey::Persisted(pending.id)) {
            self.slots[index].hidden = false;
        }
    }

    /// Adopts the server's list. Unconfirmed additions stay at the end and
    /// comments with a delete in flight stay hidden.
    pub fn reconcile(&mut self, authoritative: Vec<Comment>) {
        let hidden: HashSet<Uuid> = self
            .slots
            .iter()
            .filter(|s| s.hidden)
            .filter_map(|s| match &s.entry {
                ThreadEntry::Persisted(comment) => Some(comment.id),
                ThreadEntry::Pending { .. } => None,
            })
            .collect();
        let pending: Vec<Slot> = self
            .slots
            .drain(..)
            .filter(|s| s.entry.is_pending())
            .collect();
        self.slots = authoritative
            .into_iter()
            .map(|comment| Slot {
                hidden: hidden.contains(&comment.id),
                entry: ThreadEntry::Persisted(comment),
            })
            .chain(pending)
            .collect();
    }

    fn position(&self, key: CommentKey) -> Option<usize> {
        self.slots.iter().position(|s| s.entry.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserInfo {
        UserInfo {
            id: Uuid::new_v4(),
            name: Some(name.to_string()),
            photo: None,
        }
    }

    fn comment(text: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            text: text.to_string(),
            author: user("Alice Johnson"),
            created_at: None,
        }
    }

    #[test]
    fn add_then_delete_before_confirmation_cancels_out() {
        let mut thread = CommentThread::new(vec![comment("Beautiful poem!")]);
        let before = thread.entries();

        let temp = thread.begin_add("So moving".into(), user("Bob Smith"));
        assert_eq!(thread.len(), 2);
        assert_eq!(
            thread.begin_delete(CommentKey::Pending(temp)),
            DeleteIntent::CancelledLocal
        );
        assert_eq!(thread.entries(), before);

        let late = comment("So moving");
        let late_id = late.id;
        assert_eq!(thread.confirm_add(temp, late), AddOutcome::Orphaned(late_id));
        assert_eq!(thread.entries(), before);
    }

    #[test]
    fn confirmed_add_takes_the_canonical_comment() {
        let mut thread = CommentThread::default();
        let temp = thread.begin_add("Lovely".into(), user("Eve Brown"));
        assert!(thread.entries()[0].is_pending());

        let canonical = comment("Lovely");
        let id = canonical.id;
        assert_eq!(thread.confirm_add(temp, canonical), AddOutcome::Confirmed);
        assert_eq!(thread.entries()[0].key(), CommentKey::Persisted(id));
    }

    #[test]
    fn failed_add_removes_the_synthetic_entry() {
        let mut thread = CommentThread::new(vec![comment("first")]);
        let before = thread.entries();
        let temp = thread.begin_add("second".into(), user("Carol Davis"));
        thread.fail_add(temp);
        assert_eq!(thread.entries(), before);
    }

    #[test]
    fn failed_delete_restores_original_position() {
        let (a, b, c) = (comment("a"), comment("b"), comment("c"));
        let mut thread = CommentThread::new(vec![a, b.clone(), c]);
        let before = thread.entries();

        let DeleteIntent::Remote(pending) = thread.begin_delete(CommentKey::Persisted(b.id)) else {
            panic!("persisted comment should need a remote delete");
        };
        assert_eq!(pending.comment_id(), b.id);
        assert_eq!(thread.len(), 2);

        thread.fail_delete(pending);
        assert_eq!(thread.entries(), before);
    }

    #[test]
    fn overlapping_deletes_roll_back_in_place() {
        let (a, b, c) = (comment("a"), comment("b"), comment("c"));
        let mut thread = CommentThread::new(vec![a.clone(), b.clone(), c.clone()]);

        let DeleteIntent::Remote(delete_b) = thread.begin_delete(CommentKey::Persisted(b.id)) else {
            panic!("b should need a remote delete");
        };
        let DeleteIntent::Remote(delete_a) = thread.begin_delete(CommentKey::Persisted(a.id)) else {
            panic!("a should need a remote delete");
        };
        assert_eq!(thread.entries(), vec![ThreadEntry::Persisted(c.clone())]);

        thread.fail_delete(delete_b);
        assert_eq!(
            thread.entries(),
            vec![ThreadEntry::Persisted(b.clone()), ThreadEntry::Persisted(c.clone())]
        );

        thread.finish_delete(delete_a);
        assert_eq!(
            thread.entries(),
            vec![ThreadEntry::Persisted(b), ThreadEntry::Persisted(c)]
        );
    }

    #[test]
    fn a_comment_being_deleted_cannot_be_deleted_again() {
        let a = comment("a");
        let mut thread = CommentThread::new(vec![a.clone()]);
        assert!(matches!(
            thread.begin_delete(CommentKey::Persisted(a.id)),
            DeleteIntent::Remote(_)
        ));
        assert_eq!(
            thread.begin_delete(CommentKey::Persisted(a.id)),
            DeleteIntent::Missing
        );
    }

    #[test]
    fn deleting_an_unknown_comment_is_missing() {
        let mut thread = CommentThread::default();
        assert_eq!(
            thread.begin_delete(CommentKey::Persisted(Uuid::new_v4())),
            DeleteIntent::Missing
        );
    }

    #[test]
    fn reconcile_keeps_unconfirmed_additions() {
        let mut thread = CommentThread::new(vec![comment("old")]);
        let temp = thread.begin_add("draft".into(), user("David Wilson"));

        let fresh = vec![comment("server one"), comment("server two")];
        thread.reconcile(fresh.clone());

        let entries = thread.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], ThreadEntry::Persisted(fresh[0].clone()));
        assert_eq!(entries[2].key(), CommentKey::Pending(temp));
    }

    #[test]
    fn reconcile_keeps_in_flight_deletes_hidden() {
        let (a, b) = (comment("a"), comment("b"));
        let mut thread = CommentThread::new(vec![a.clone(), b.clone()]);
        let DeleteIntent::Remote(pending) = thread.begin_delete(CommentKey::Persisted(a.id)) else {
            panic!("a should need a remote delete");
        };

        // The refetch raced the delete and still lists `a`.
        thread.reconcile(vec![a.clone(), b.clone()]);
        assert_eq!(thread.entries(), vec![ThreadEntry::Persisted(b.clone())]);

        thread.fail_delete(pending);
        assert_eq!(
            thread.entries(),
            vec![ThreadEntry::Persisted(a), ThreadEntry::Persisted(b)]
        );
    }
}
