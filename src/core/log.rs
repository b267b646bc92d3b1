//! Per-instance transition log.
//!
//! Every committed transition appends one record: which event moved the
//! entity from where to where, when, and at which commit version. The log
//! is the audit trail backing snapshots and reconciliation after partial
//! failures.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// The event is stored by name: records outlive the event type and travel
/// through snapshots, where an opaque name is all that is needed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// The state being transitioned from.
    pub from: S,
    /// Name of the event that drove the transition.
    pub event: String,
    /// The state being transitioned to.
    pub to: S,
    /// When the commit happened.
    pub at: DateTime<Utc>,
    /// Commit version the transition produced.
    pub version: u64,
}

/// Ordered log of committed transitions for one instance.
///
/// Appends happen inside the instance's commit section, so the log order
/// is the commit order.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use serde::{Deserialize, Serialize};
/// use turnstile::core::{State, TransitionLog, TransitionRecord};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Phase {
///     Draft,
///     Pending,
///     Settled,
/// }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draft => "Draft",
///             Self::Pending => "Pending",
///             Self::Settled => "Settled",
///         }
///     }
/// }
///
/// let mut log = TransitionLog::new();
/// log.record(TransitionRecord {
///     from: Phase::Draft,
///     event: "CreatedViaApi".to_string(),
///     to: Phase::Pending,
///     at: Utc::now(),
///     version: 1,
/// });
/// log.record(TransitionRecord {
///     from: Phase::Pending,
///     event: "SettledViaApi".to_string(),
///     to: Phase::Settled,
///     at: Utc::now(),
///     version: 2,
/// });
///
/// let path = log.path();
/// assert_eq!(path.len(), 3); // Draft -> Pending -> Settled
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionLog<S: State> {
    records: Vec<TransitionRecord<S>>,
}

impl<S: State> Default for TransitionLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionLog<S> {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a committed transition.
    pub fn record(&mut self, record: TransitionRecord<S>) {
        self.records.push(record);
    }

    /// All records in commit order.
    pub fn records(&self) -> &[TransitionRecord<S>] {
        &self.records
    }

    /// The path of states traversed: the first record's `from`, then each
    /// record's `to`. Empty when nothing has committed yet.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Elapsed time between the first and last commit. `None` while the
    /// log is empty; a single record yields a zero duration.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.at.signed_duration_since(first.at);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Number of committed transitions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has committed yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
