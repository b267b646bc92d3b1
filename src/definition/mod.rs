//! Definition API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for declaring states,
//! events and transitions with minimal boilerplate while maintaining type
//! safety. Definitions are validated once at build time and immutable
//! afterwards.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::DefinitionError;
pub use machine::{DefinitionBuilder, MachineDefinition};
pub use transition::{Transition, TransitionBuilder};

use crate::core::{Event, State};

/// Create a simple unconditional transition.
///
/// # Example
///
/// ```
/// use turnstile::definition::simple_transition;
/// use turnstile::{event_enum, state_enum};
///
/// state_enum! {
///     enum MyState {
///         Draft,
///         Pending,
///     }
///     terminal: [Pending]
/// }
///
/// event_enum! {
///     enum MyEvent {
///         Submit,
///     }
/// }
///
/// let transition =
///     simple_transition::<MyState, MyEvent, ()>(MyState::Draft, MyEvent::Submit, MyState::Pending);
/// ```
pub fn simple_transition<S, E, C>(from: S, event: E, to: S) -> Transition<S, E, C>
where
    S: State + 'static,
    E: Event + 'static,
{
    TransitionBuilder::new()
        .from(from)
        .on(event)
        .to(to)
        .build()
        .expect("Simple transition should always build")
}

/// Create a transition with a guard predicate over the fire context.
///
/// # Example
///
/// ```
/// use turnstile::definition::guarded_transition;
/// use turnstile::{event_enum, state_enum};
///
/// state_enum! {
///     enum MyState {
///         Draft,
///         Pending,
///     }
///     terminal: [Pending]
/// }
///
/// event_enum! {
///     enum MyEvent {
///         Submit,
///     }
/// }
///
/// let transition = guarded_transition::<MyState, MyEvent, u64, _>(
///     MyState::Draft,
///     MyEvent::Submit,
///     MyState::Pending,
///     |amount| *amount > 0,
/// );
/// ```
pub fn guarded_transition<S, E, C, F>(from: S, event: E, to: S, guard: F) -> Transition<S, E, C>
where
    S: State + 'static,
    E: Event + 'static,
    F: Fn(&C) -> bool + Send + Sync + 'static,
{
    TransitionBuilder::new()
        .from(from)
        .on(event)
        .to(to)
        .when(guard)
        .build()
        .expect("Guarded transition should always build")
}
