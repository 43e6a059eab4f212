use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("another change is still being saved")]
    MutationPending,
}

/// One mutable entity under optimistic control.
///
/// `Idle -> Pending -> Committed | RolledBack`; from either terminal phase a
/// new mutation may begin. Only one mutation may be pending at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimistic<S> {
    current: S,
    snapshot: Option<S>,
    phase: Phase,
}

impl<S: Clone> Optimistic<S> {
    pub fn new(state: S) -> Self {
        Self {
            current: state,
            snapshot: None,
            phase: Phase::Idle,
        }
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    /// Snapshots the current state and applies `change` to it.
    pub fn begin(&mut self, change: impl FnOnce(&mut S)) -> Result<(), ReconcileError> {
        if self.is_pending() {
            return Err(ReconcileError::MutationPending);
        }
        self.snapshot = Some(self.current.clone());
        change(&mut self.current);
        self.phase = Phase::Pending;
        Ok(())
    }

    /// Replaces local state with the server's canonical value.
    pub fn commit(&mut self, authoritative: S) {
        self.current = authoritative;
        self.snapshot = None;
        self.phase = Phase::Committed;
    }

    /// Restores the snapshot taken by [`Optimistic::begin`]. Returns `false`
    /// when nothing was pending.
    pub fn rollback(&mut self) -> bool {
        match self.snapshot.take() {
            Some(snapshot) if self.is_pending() => {
                self.current = snapshot;
                self.phase = Phase::RolledBack;
                true
            }
            _ => false,
        }
    }

    /// Commits on `Ok`, rolls back on `Err` and hands the error back.
    pub fn settle<E>(&mut self, outcome: Result<S, E>) -> Result<(), E> {
        match outcome {
            Ok(authoritative) => {
                self.commit(authoritative);
                Ok(())
            }
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }

    /// Accepts a freshly fetched value unless a mutation is in flight.
    pub fn refresh(&mut self, authoritative: S) -> bool {
        if self.is_pending() {
            return false;
        }
        self.current = authoritative;
        true
    }
}
