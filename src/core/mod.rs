//! Core vocabulary of the engine.
//!
//! This module holds the types everything else composes:
//! - `State` and `Event` traits over user enums
//! - `Guard` predicates controlling transition selection
//! - `Action` side effects sequenced around the commit point
//! - the per-instance `TransitionLog`
//!
//! Nothing here mutates an instance; state changes happen only through
//! `MachineInstance::fire`.

mod action;
mod event;
mod guard;
mod log;
mod state;

pub use action::{Action, ActionFailure};
pub use event::Event;
pub use guard::Guard;
pub use log::{TransitionLog, TransitionRecord};
pub use state::State;
