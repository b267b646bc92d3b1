//! Core `Event` trait for transition triggers.
//!
//! Events are the names callers invoke on an instance to request a
//! transition. They are declared independently of the state set; one event
//! may drive several transitions out of different states.

use std::fmt::Debug;

/// Trait for machine events.
///
/// An event is a named trigger. It carries no behavior of its own; the
/// definition decides which transition (if any) an event selects from the
/// instance's current state.
///
/// # Example
///
/// ```rust
/// use turnstile::core::Event;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum BankTransactionEvent {
///     CreatedViaApi,
///     SettledViaApi,
/// }
///
/// impl Event for BankTransactionEvent {
///     fn name(&self) -> &str {
///         match self {
///             Self::CreatedViaApi => "CreatedViaApi",
///             Self::SettledViaApi => "SettledViaApi",
///         }
///     }
/// }
/// ```
pub trait Event: Clone + PartialEq + Debug + Send + Sync {
    /// Get the event's name for display, logging, and definition validation.
    ///
    /// Event names must not collide with the state names of the machine they
    /// are declared on; `DefinitionBuilder::build` rejects collisions.
    fn name(&self) -> &str;
}
