//! Turnstile: a hierarchical state machine engine with transactional transitions
//!
//! Turnstile separates what a lifecycle *is* from what any one entity is
//! *doing*: an immutable [`MachineDefinition`] declares states, events and
//! guarded transitions once, and any number of [`MachineInstance`]s bind that
//! definition to concrete entities with versioned, store-backed state.
//!
//! # Core Concepts
//!
//! - **Definition**: validated, immutable description of states, events and
//!   transitions, built fluently and shared behind an `Arc`
//! - **Instance**: one entity's live state, advanced by firing events and
//!   committed through an optimistic version check
//! - **Guards and actions**: caller-supplied closures over a fire context;
//!   before-actions abort the transition, after-actions report
//! - **Bridge**: parent machines broadcasting events downward to children and
//!   aggregating live child states upward in guards
//!
//! # Example
//!
//! ```rust
//! use turnstile::{event_enum, state_enum, DefinitionBuilder, State, TransitionBuilder};
//!
//! state_enum! {
//!     enum TransferState {
//!         Draft,
//!         Depositing,
//!         Deposited,
//!     }
//!     terminal: [Deposited]
//! }
//!
//! event_enum! {
//!     enum TransferEvent {
//!         DepositingViaApi,
//!         BankTransactionSucceeded,
//!     }
//! }
//!
//! let definition = DefinitionBuilder::<_, _, u64>::new()
//!     .states([
//!         TransferState::Draft,
//!         TransferState::Depositing,
//!         TransferState::Deposited,
//!     ])
//!     .initial(TransferState::Draft)
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(TransferState::Draft)
//!             .on(TransferEvent::DepositingViaApi)
//!             .to(TransferState::Depositing)
//!             .when(|amount: &u64| *amount > 0),
//!     )?
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(TransferState::Depositing)
//!             .on(TransferEvent::BankTransactionSucceeded)
//!             .to(TransferState::Deposited),
//!     )?
//!     .build()?;
//!
//! assert_eq!(definition.initial().name(), "Draft");
//! assert_eq!(definition.transitions().len(), 2);
//! # Ok::<(), turnstile::DefinitionError>(())
//! ```

pub mod bridge;
pub mod core;
pub mod definition;
pub mod instance;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use bridge::{BroadcastOutcome, ChildFailure, ChildLink, PartialBroadcast};
pub use core::{Action, ActionFailure, Event, Guard, State, TransitionLog, TransitionRecord};
pub use definition::{
    DefinitionBuilder, DefinitionError, MachineDefinition, Transition, TransitionBuilder,
};
pub use instance::{
    BindError, FireError, FireOptions, FirePhase, FireReport, MachineInstance,
};
pub use snapshot::{InstanceSnapshot, SnapshotError, SNAPSHOT_VERSION};
pub use store::{InMemoryStateStore, StateStore, StoreError};
