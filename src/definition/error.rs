//! Validation errors for machine definitions.

use thiserror::Error;

/// Errors raised while building a machine definition.
///
/// All of these are configuration-time failures: a definition that builds
/// cleanly can never raise one of these at runtime.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitial,

    #[error("Initial state declared twice: '{first}' then '{second}'")]
    DuplicateInitial { first: String, second: String },

    #[error("Initial state '{state}' is not in the declared state set")]
    UndeclaredInitial { state: String },

    #[error("State '{name}' declared more than once")]
    DuplicateState { name: String },

    #[error("Transition on '{event}' references undeclared state '{state}'")]
    UndeclaredState { state: String, event: String },

    #[error("Event name '{name}' collides with a state name")]
    EventStateCollision { name: String },

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFrom,

    #[error("Transition event not specified. Call .on(event)")]
    MissingEvent,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingTo,
}
