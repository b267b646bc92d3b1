//! Runtime errors for bound instances.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::core::ActionFailure;
use crate::store::StoreError;

/// Pre-commit phase that can exhaust a fire timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirePhase {
    /// Candidate collection and guard evaluation.
    Resolve,
    /// Before-action execution.
    Before,
}

impl fmt::Display for FirePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "guard resolution"),
            Self::Before => write!(f, "before-actions"),
        }
    }
}

/// Errors raised while binding an instance to an entity.
#[derive(Debug, Error)]
pub enum BindError {
    /// The requested starting state is not part of the definition.
    #[error("State '{state}' is not in the machine's declared state set")]
    UnknownState { state: String },

    /// The state store rejected the bind.
    #[error("State store failure")]
    Store(#[from] StoreError),
}

/// Errors raised by a fire that did not commit.
///
/// Every variant leaves the instance exactly where it was: failures after
/// the commit point are not errors, they are reported through
/// [`FireReport::after_failures`](crate::instance::FireReport::after_failures).
#[derive(Debug, Error)]
pub enum FireError {
    /// No transition leaves the current state on this event. Recoverable;
    /// the duplicate dispatch of an already-applied event lands here.
    #[error("No transition from state '{state}' on event '{event}'")]
    NoTransition { state: String, event: String },

    /// Candidates existed but every guard rejected the context.
    #[error("Guards rejected all {candidates} candidate transitions from '{state}' on '{event}'")]
    GuardRejected {
        state: String,
        event: String,
        candidates: usize,
    },

    /// A before-action failed; the transition was aborted pre-commit.
    #[error("Transition aborted: {0}")]
    BeforeAction(#[source] ActionFailure),

    /// Another fire committed first. Re-read the state and re-decide;
    /// the engine never retries on the caller's behalf.
    #[error("Commit lost an optimistic race: resolved against version {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    /// Guard or before-action work exceeded the caller's budget.
    #[error("Fire timed out after {limit:?} during {phase}")]
    Timeout { phase: FirePhase, limit: Duration },

    /// The state store failed at the commit boundary.
    #[error("State store failure")]
    Store(#[from] StoreError),
}
