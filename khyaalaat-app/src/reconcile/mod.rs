//! Optimistic updates for likes, comments and the request completion toggle.
//!
//! Local state changes as soon as the user acts. The persistence call then
//! either commits the server's canonical value or rolls the entity back to
//! the exact snapshot taken before the change.

mod comments;
mod likes;
mod notice;
mod optimistic;

pub use comments::{AddOutcome, CommentKey, CommentThread, DeleteIntent, PendingDelete, TempId, ThreadEntry};
pub use likes::LikeState;
pub use notice::{MutationKind, Notice};
pub use optimistic::{Optimistic, Phase, ReconcileError};
