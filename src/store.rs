//! Pluggable persistence for bound instances.
//!
//! The engine never writes state on its own; every commit goes through a
//! [`StateStore`] supplied at bind time. The store contract is a versioned
//! compare-and-set so that racing writers from other processes surface as
//! conflicts instead of lost updates.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::core::State;

/// Errors surfaced by persistence collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version no longer matches what the writer resolved
    /// against. Another writer committed first.
    #[error("Version conflict for entity {entity}: expected {expected}, found {found}")]
    Conflict {
        entity: Uuid,
        expected: u64,
        found: u64,
    },

    /// No cell exists for this entity. Bind the entity before firing.
    #[error("Unknown entity {0}")]
    Unknown(Uuid),

    /// A cell already exists for this entity.
    #[error("Entity {0} is already initialized")]
    AlreadyInitialized(Uuid),

    /// Backend-specific failure (connection loss, serialization, ...).
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Versioned state persistence keyed by entity id.
///
/// Implementations must make [`compare_and_set`](Self::compare_and_set)
/// atomic per entity: the check against `expected` and the write of `next`
/// happen as one step, or the call fails with [`StoreError::Conflict`].
#[async_trait]
pub trait StateStore<S: State>: Send + Sync {
    /// Create the cell for `entity` at version 0.
    async fn initialize(&self, entity: Uuid, state: S) -> Result<(), StoreError>;

    /// Read the current state and version for `entity`.
    async fn load(&self, entity: Uuid) -> Result<(S, u64), StoreError>;

    /// Replace the state for `entity` if its stored version still equals
    /// `expected`. Returns the new version on success.
    async fn compare_and_set(
        &self,
        entity: Uuid,
        expected: u64,
        next: S,
    ) -> Result<u64, StoreError>;
}

/// In-memory [`StateStore`] for embedding and tests.
///
/// # Example
///
/// ```rust
/// use turnstile::state_enum;
/// use turnstile::store::{InMemoryStateStore, StateStore};
/// use uuid::Uuid;
///
/// state_enum! {
///     enum Phase {
///         Draft,
///         Pending,
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let store = InMemoryStateStore::new();
/// let entity = Uuid::new_v4();
///
/// store.initialize(entity, Phase::Draft).await.unwrap();
/// let version = store.compare_and_set(entity, 0, Phase::Pending).await.unwrap();
///
/// assert_eq!(version, 1);
/// assert_eq!(store.load(entity).await.unwrap(), (Phase::Pending, 1));
/// # });
/// ```
pub struct InMemoryStateStore<S: State> {
    cells: DashMap<Uuid, (S, u64)>,
}

impl<S: State> InMemoryStateStore<S> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    /// Number of entities currently stored.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the store holds no entities.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<S: State> Default for InMemoryStateStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: State + 'static> StateStore<S> for InMemoryStateStore<S> {
    async fn initialize(&self, entity: Uuid, state: S) -> Result<(), StoreError> {
        match self.cells.entry(entity) {
            Entry::Occupied(_) => Err(StoreError::AlreadyInitialized(entity)),
            Entry::Vacant(slot) => {
                slot.insert((state, 0));
                Ok(())
            }
        }
    }

    async fn load(&self, entity: Uuid) -> Result<(S, u64), StoreError> {
        self.cells
            .get(&entity)
            .map(|cell| cell.value().clone())
            .ok_or(StoreError::Unknown(entity))
    }

    async fn compare_and_set(
        &self,
        entity: Uuid,
        expected: u64,
        next: S,
    ) -> Result<u64, StoreError> {
        // get_mut holds the shard lock, making check-then-write atomic.
        let mut cell = self
            .cells
            .get_mut(&entity)
            .ok_or(StoreError::Unknown(entity))?;

        let (state, version) = cell.value_mut();
        if *version != expected {
            return Err(StoreError::Conflict {
                entity,
                expected,
                found: *version,
            });
        }

        *state = next;
        *version += 1;
        Ok(*version)
    }
}
