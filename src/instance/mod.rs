//! Runtime binding of a machine definition to an entity.
//!
//! An instance pairs one entity id with one shared definition and a state
//! store. A fire resolves candidates and runs guards and before-actions
//! outside the instance lock, then commits through an optimistic version
//! check; concurrent fires on the same instance serialize only at the
//! commit step, and fires on distinct instances never serialize at all.

pub mod error;
mod executor;

pub use error::{BindError, FireError, FirePhase};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{ActionFailure, Event, State, TransitionLog, TransitionRecord};
use crate::definition::MachineDefinition;
use crate::snapshot::{InstanceSnapshot, SnapshotError, SNAPSHOT_VERSION};
use crate::store::{StateStore, StoreError};

/// Options for a single fire.
#[derive(Clone, Copy, Debug, Default)]
pub struct FireOptions {
    /// Budget covering guard resolution and before-actions together.
    /// `None` means unbounded. The commit itself is never interrupted.
    pub timeout: Option<Duration>,
}

impl FireOptions {
    /// Options with the given pre-commit budget.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Outcome of a committed fire.
#[derive(Debug)]
pub struct FireReport<S: State> {
    /// State the transition left.
    pub from: S,
    /// State the transition entered.
    pub to: S,
    /// Name of the event that fired.
    pub event: String,
    /// Commit version after this transition.
    pub version: u64,
    /// After-actions that failed post-commit. The transition stands; these
    /// are follow-up work the caller still owes.
    pub after_failures: Vec<ActionFailure>,
}

impl<S: State> FireReport<S> {
    /// Whether every after-action completed as well.
    pub fn fully_applied(&self) -> bool {
        self.after_failures.is_empty()
    }
}

struct StateCell<S: State> {
    state: S,
    version: u64,
    log: TransitionLog<S>,
}

/// A definition bound to one entity, with live state.
pub struct MachineInstance<S: State, E: Event, C> {
    entity: Uuid,
    definition: Arc<MachineDefinition<S, E, C>>,
    store: Arc<dyn StateStore<S>>,
    cell: Mutex<StateCell<S>>,
}

impl<S: State + 'static, E: Event, C> MachineInstance<S, E, C> {
    /// Bind `entity` to `definition`, starting in the definition's initial
    /// state. Initializes the entity's cell in the store at version 0.
    pub async fn bind(
        definition: Arc<MachineDefinition<S, E, C>>,
        store: Arc<dyn StateStore<S>>,
        entity: Uuid,
    ) -> Result<Self, BindError> {
        let state = definition.initial().clone();
        store.initialize(entity, state.clone()).await?;
        Ok(Self::from_parts(
            definition,
            store,
            entity,
            state,
            0,
            TransitionLog::new(),
        ))
    }

    /// Bind `entity` starting from `state` instead of the definition's
    /// initial state. The state must belong to the definition.
    pub async fn bind_at(
        definition: Arc<MachineDefinition<S, E, C>>,
        store: Arc<dyn StateStore<S>>,
        entity: Uuid,
        state: S,
    ) -> Result<Self, BindError> {
        if !definition.contains_state(&state) {
            return Err(BindError::UnknownState {
                state: state.name().to_string(),
            });
        }
        store.initialize(entity, state.clone()).await?;
        Ok(Self::from_parts(
            definition,
            store,
            entity,
            state,
            0,
            TransitionLog::new(),
        ))
    }

    /// Rebuild an instance from a snapshot.
    ///
    /// The store is left untouched: the snapshot's commit version must
    /// still match the store's cell, and the next fire will verify that
    /// at its commit.
    pub fn restore(
        definition: Arc<MachineDefinition<S, E, C>>,
        store: Arc<dyn StateStore<S>>,
        snapshot: InstanceSnapshot<S>,
    ) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if !definition.contains_state(&snapshot.state) {
            return Err(SnapshotError::UnknownState {
                state: snapshot.state.name().to_string(),
            });
        }
        Ok(Self::from_parts(
            definition,
            store,
            snapshot.entity,
            snapshot.state,
            snapshot.commit_version,
            snapshot.log,
        ))
    }

    fn from_parts(
        definition: Arc<MachineDefinition<S, E, C>>,
        store: Arc<dyn StateStore<S>>,
        entity: Uuid,
        state: S,
        version: u64,
        log: TransitionLog<S>,
    ) -> Self {
        Self {
            entity,
            definition,
            store,
            cell: Mutex::new(StateCell {
                state,
                version,
                log,
            }),
        }
    }

    /// The bound entity id.
    pub fn entity(&self) -> Uuid {
        self.entity
    }

    /// The shared definition this instance runs.
    pub fn definition(&self) -> &Arc<MachineDefinition<S, E, C>> {
        &self.definition
    }

    /// Current state (cloned out of the cell).
    pub async fn current_state(&self) -> S {
        self.cell.lock().await.state.clone()
    }

    /// Current commit version. Starts at 0, bumps once per commit.
    pub async fn version(&self) -> u64 {
        self.cell.lock().await.version
    }

    /// Whether the instance sits in a terminal state.
    pub async fn is_terminal(&self) -> bool {
        self.cell.lock().await.state.is_terminal()
    }

    /// The committed transitions so far (cloned).
    pub async fn log(&self) -> TransitionLog<S> {
        self.cell.lock().await.log.clone()
    }

    /// Capture the cell as a snapshot.
    pub async fn snapshot(&self) -> InstanceSnapshot<S> {
        let cell = self.cell.lock().await;
        InstanceSnapshot {
            version: SNAPSHOT_VERSION,
            entity: self.entity,
            taken_at: Utc::now(),
            state: cell.state.clone(),
            commit_version: cell.version,
            log: cell.log.clone(),
        }
    }

    /// Whether some transition would fire for `event` given `ctx`.
    ///
    /// Consults guards only; no action runs and nothing commits. The
    /// answer can go stale the moment another fire commits.
    pub async fn can_fire(&self, event: &E, ctx: &C) -> bool {
        let state = self.cell.lock().await.state.clone();
        executor::resolve(self.definition.as_ref(), &state, event, ctx)
            .await
            .is_ok()
    }

    /// Fire `event` with default options.
    pub async fn fire(&self, event: E, ctx: &C) -> Result<FireReport<S>, FireError> {
        self.fire_with(event, ctx, FireOptions::default()).await
    }

    /// Fire `event`: resolve a transition, run its before-actions, commit
    /// the state change, then run its after-actions.
    ///
    /// Guards and before-actions run outside the instance lock against the
    /// state observed at entry. If another fire commits in between, the
    /// commit here fails with [`FireError::Conflict`] and nothing changes;
    /// the caller decides whether to re-fire from the new state.
    pub async fn fire_with(
        &self,
        event: E,
        ctx: &C,
        options: FireOptions,
    ) -> Result<FireReport<S>, FireError> {
        let budget = options.timeout.map(|limit| (Instant::now() + limit, limit));

        let (from, resolved_version) = {
            let cell = self.cell.lock().await;
            (cell.state.clone(), cell.version)
        };

        let selected = match bounded(
            budget,
            FirePhase::Resolve,
            executor::resolve(self.definition.as_ref(), &from, &event, ctx),
        )
        .await
        {
            Ok(transition) => transition,
            Err(err) => {
                debug!(
                    entity = %self.entity,
                    state = from.name(),
                    event = event.name(),
                    %err,
                    "fire rejected"
                );
                return Err(err);
            }
        };

        bounded(
            budget,
            FirePhase::Before,
            executor::run_before(selected, ctx),
        )
        .await?;

        let to = selected.to.clone();
        let version = {
            let mut cell = self.cell.lock().await;
            if cell.version != resolved_version {
                debug!(
                    entity = %self.entity,
                    expected = resolved_version,
                    found = cell.version,
                    "fire lost an optimistic race"
                );
                return Err(FireError::Conflict {
                    expected: resolved_version,
                    found: cell.version,
                });
            }

            let version = match self
                .store
                .compare_and_set(self.entity, resolved_version, to.clone())
                .await
            {
                Ok(version) => version,
                Err(StoreError::Conflict {
                    expected, found, ..
                }) => {
                    return Err(FireError::Conflict { expected, found });
                }
                Err(err) => return Err(FireError::Store(err)),
            };

            cell.state = to.clone();
            cell.version = version;
            cell.log.record(TransitionRecord {
                from: from.clone(),
                event: event.name().to_string(),
                to: to.clone(),
                at: Utc::now(),
                version,
            });
            version
        };

        debug!(
            entity = %self.entity,
            from = from.name(),
            to = to.name(),
            event = event.name(),
            version,
            "transition committed"
        );

        let after_failures = executor::run_after(selected, ctx).await;
        for failure in &after_failures {
            warn!(
                entity = %self.entity,
                action = %failure.action,
                error = %failure.source,
                "after-action failed post-commit"
            );
        }

        Ok(FireReport {
            from,
            to,
            event: event.name().to_string(),
            version,
            after_failures,
        })
    }
}

/// Run `work` against the shared pre-commit deadline, if one is set.
async fn bounded<T>(
    budget: Option<(Instant, Duration)>,
    phase: FirePhase,
    work: impl Future<Output = Result<T, FireError>>,
) -> Result<T, FireError> {
    match budget {
        Some((deadline, limit)) => match timeout_at(deadline, work).await {
            Ok(result) => result,
            Err(_) => Err(FireError::Timeout { phase, limit }),
        },
        None => work.await,
    }
}
