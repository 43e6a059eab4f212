use serde::{Deserialize, Serialize};

/// Result of a write that may be skipped because the site runs on the demo
/// dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome<T> {
    Stored(T),
    /// Demo mode; nothing was written.
    Skipped,
}

impl<T> WriteOutcome<T> {
    pub fn stored(self) -> Option<T> {
        match self {
            Self::Stored(value) => Some(value),
            Self::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WriteOutcome<U> {
        match self {
            Self::Stored(value) => WriteOutcome::Stored(f(value)),
            Self::Skipped => WriteOutcome::Skipped,
        }
    }
}
