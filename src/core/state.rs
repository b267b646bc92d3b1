//! Core `State` trait for machine states.
//!
//! Every state a machine can occupy implements this trait, which exposes
//! pure methods for inspecting state properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for machine states.
///
/// A state is a named member of a finite set. All methods are pure; states
/// are immutable values describing where an entity currently sits in its
/// lifecycle.
///
/// # Required Traits
///
/// - `Clone`: states are snapshotted out of instances and recorded in logs
/// - `PartialEq`: transition resolution compares states
/// - `Debug`: diagnostics
/// - `Serialize` + `Deserialize`: states persist in snapshots and stores
///
/// # Example
///
/// ```rust
/// use turnstile::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum BankTransactionState {
///     Draft,
///     Creating,
///     Pending,
///     Settled,
///     Failed,
/// }
///
/// impl State for BankTransactionState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draft => "Draft",
///             Self::Creating => "Creating",
///             Self::Pending => "Pending",
///             Self::Settled => "Settled",
///             Self::Failed => "Failed",
///         }
///     }
///
///     fn is_terminal(&self) -> bool {
///         matches!(self, Self::Settled | Self::Failed)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Failed)
///     }
/// }
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display, logging, and definition validation.
    ///
    /// Names identify states within a definition: they must be distinct per
    /// machine, and no event name may collide with them.
    fn name(&self) -> &str;

    /// Check if this is a terminal state.
    ///
    /// Terminal states are completion points: no transition is expected to
    /// leave them. The engine does not forbid declaring one, but firing any
    /// event from a terminal state with no outgoing transition is rejected
    /// like any other unmatched event.
    ///
    /// Default implementation returns `false`.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Error states represent failed lifecycles (e.g. a bank transaction
    /// that bounced). Typically also terminal, but this is not enforced.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}
