//! Parent/child machine composition.
//!
//! A [`ChildLink`] ties a parent entity to the instances it supervises,
//! giving the parent's actions and guards two flows:
//!
//! - **Downward**: [`broadcast`](ChildLink::broadcast) fires one event on
//!   every child. Each child resolves and commits independently; a child
//!   that fails leaves its siblings untouched, and the mixed outcome comes
//!   back as data rather than an abort.
//! - **Upward**: [`all_in`](ChildLink::all_in) and friends read the
//!   children's live states, so a parent guard like "every bank
//!   transaction settled" can never go stale the way a push-counted tally
//!   would.

use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::core::{Event, State};
use crate::instance::{FireError, MachineInstance};

/// One child that did not transition during a broadcast.
#[derive(Debug, Error)]
#[error("Child {child} did not transition")]
pub struct ChildFailure {
    /// Entity id of the child.
    pub child: Uuid,
    /// Why its fire failed.
    #[source]
    pub error: FireError,
}

/// Error summary for a broadcast that left some children unchanged.
#[derive(Debug, Error)]
#[error("Broadcast delivered to {delivered} of {total} children")]
pub struct PartialBroadcast {
    /// Children that transitioned.
    pub delivered: usize,
    /// Children addressed in total.
    pub total: usize,
    /// The children that did not transition, in attach order.
    pub failures: Vec<ChildFailure>,
}

/// Per-child outcome of one broadcast.
#[derive(Debug)]
pub struct BroadcastOutcome<S: State> {
    /// Children that transitioned, with their new states, in attach order.
    pub delivered: Vec<(Uuid, S)>,
    /// Children that did not transition, in attach order.
    pub failures: Vec<ChildFailure>,
}

impl<S: State> BroadcastOutcome<S> {
    /// Every addressed child transitioned.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// At least one addressed child did not transition. Complement of
    /// [`is_clean`](Self::is_clean) for non-empty broadcasts; an all-failed
    /// broadcast is a partial failure too, with nothing delivered.
    pub fn is_partial_failure(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Convert to a `Result` for use inside an action: clean broadcasts
    /// yield the delivered states, anything else becomes a
    /// [`PartialBroadcast`] error naming the children left behind.
    pub fn into_result(self) -> Result<Vec<(Uuid, S)>, PartialBroadcast> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(PartialBroadcast {
                delivered: self.delivered.len(),
                total: self.delivered.len() + self.failures.len(),
                failures: self.failures,
            })
        }
    }
}

/// A parent's handle on the child instances it supervises.
///
/// Children share one definition family (state, event and context types).
/// Attach order is broadcast order.
pub struct ChildLink<S: State, E: Event, C> {
    children: RwLock<Vec<Arc<MachineInstance<S, E, C>>>>,
}

impl<S: State + 'static, E: Event, C> ChildLink<S, E, C> {
    /// Create an empty link.
    pub fn new() -> Self {
        Self {
            children: RwLock::new(Vec::new()),
        }
    }

    /// Attach a child. Broadcasts reach children in attach order.
    pub fn attach(&self, child: Arc<MachineInstance<S, E, C>>) {
        self.write_guard().push(child);
    }

    /// Snapshot of the attached children.
    pub fn children(&self) -> Vec<Arc<MachineInstance<S, E, C>>> {
        self.read_guard().clone()
    }

    /// Number of attached children.
    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    /// Whether no children are attached.
    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    /// Fire `event` on every child, one at a time, in attach order.
    ///
    /// Each child resolves and commits on its own; one child's failure
    /// never stops the walk. Broadcasting to no children is a clean,
    /// empty outcome.
    pub async fn broadcast(&self, event: E, ctx: &C) -> BroadcastOutcome<S> {
        let children = self.children();
        let total = children.len();
        let mut delivered = Vec::new();
        let mut failures = Vec::new();

        for child in children {
            match child.fire(event.clone(), ctx).await {
                Ok(report) => delivered.push((child.entity(), report.to)),
                Err(error) => failures.push(ChildFailure {
                    child: child.entity(),
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            warn!(
                event = event.name(),
                total,
                failed = failures.len(),
                "broadcast left children unchanged"
            );
        }

        BroadcastOutcome {
            delivered,
            failures,
        }
    }

    /// The children's live states, in attach order.
    pub async fn states(&self) -> Vec<(Uuid, S)> {
        let children = self.children();
        let mut states = Vec::with_capacity(children.len());
        for child in children {
            states.push((child.entity(), child.current_state().await));
        }
        states
    }

    /// Whether every child's live state satisfies `predicate`.
    /// Vacuously true with no children attached.
    pub async fn all_in(&self, predicate: impl Fn(&S) -> bool) -> bool {
        for child in self.children() {
            if !predicate(&child.current_state().await) {
                return false;
            }
        }
        true
    }

    /// How many children's live states satisfy `predicate`.
    pub async fn count_where(&self, predicate: impl Fn(&S) -> bool) -> usize {
        let mut count = 0;
        for child in self.children() {
            if predicate(&child.current_state().await) {
                count += 1;
            }
        }
        count
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<MachineInstance<S, E, C>>>> {
        match self.children.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<MachineInstance<S, E, C>>>> {
        match self.children.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<S: State + 'static, E: Event, C> Default for ChildLink<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Event;
    use crate::definition::{DefinitionBuilder, MachineDefinition, TransitionBuilder};
    use crate::store::InMemoryStateStore;
    use crate::state_enum;

    state_enum! {
        enum TxState {
            Draft,
            Pending,
            Settled,
        }
        terminal: [Settled]
    }

    #[derive(Clone, PartialEq, Debug)]
    enum TxEvent {
        CreatedViaApi,
        SettledViaApi,
    }

    impl Event for TxEvent {
        fn name(&self) -> &str {
            match self {
                Self::CreatedViaApi => "CreatedViaApi",
                Self::SettledViaApi => "SettledViaApi",
            }
        }
    }

    fn definition() -> Arc<MachineDefinition<TxState, TxEvent, ()>> {
        Arc::new(
            DefinitionBuilder::new()
                .states([TxState::Draft, TxState::Pending, TxState::Settled])
                .initial(TxState::Draft)
                .transition(
                    TransitionBuilder::new()
                        .from(TxState::Draft)
                        .on(TxEvent::CreatedViaApi)
                        .to(TxState::Pending),
                )
                .unwrap()
                .transition(
                    TransitionBuilder::new()
                        .from(TxState::Pending)
                        .on(TxEvent::SettledViaApi)
                        .to(TxState::Settled),
                )
                .unwrap()
                .build()
                .unwrap(),
        )
    }

    async fn child(
        store: &Arc<InMemoryStateStore<TxState>>,
    ) -> Arc<MachineInstance<TxState, TxEvent, ()>> {
        Arc::new(
            MachineInstance::bind(definition(), store.clone(), Uuid::new_v4())
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn attach_order_is_broadcast_order() {
        let store = Arc::new(InMemoryStateStore::new());
        let first = child(&store).await;
        let second = child(&store).await;

        let link = ChildLink::new();
        link.attach(first.clone());
        link.attach(second.clone());
        assert_eq!(link.len(), 2);

        let outcome = link.broadcast(TxEvent::CreatedViaApi, &()).await;

        assert!(outcome.is_clean());
        let order: Vec<_> = outcome.delivered.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![first.entity(), second.entity()]);
        assert_eq!(first.current_state().await, TxState::Pending);
        assert_eq!(second.current_state().await, TxState::Pending);
    }

    #[tokio::test]
    async fn failed_child_leaves_siblings_independent() {
        let store = Arc::new(InMemoryStateStore::new());
        let healthy = child(&store).await;
        // Already past Draft, so CreatedViaApi has nowhere to go.
        let advanced = Arc::new(
            MachineInstance::bind_at(definition(), store.clone(), Uuid::new_v4(), TxState::Pending)
                .await
                .unwrap(),
        );

        let link = ChildLink::new();
        link.attach(healthy.clone());
        link.attach(advanced.clone());

        let outcome = link.broadcast(TxEvent::CreatedViaApi, &()).await;

        assert!(outcome.is_partial_failure());
        assert_eq!(outcome.delivered.len(), 1);
        assert_eq!(outcome.delivered[0].0, healthy.entity());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].child, advanced.entity());
        assert!(matches!(
            outcome.failures[0].error,
            FireError::NoTransition { .. }
        ));
        // The sibling still transitioned.
        assert_eq!(healthy.current_state().await, TxState::Pending);
        assert_eq!(advanced.current_state().await, TxState::Pending);
    }

    #[tokio::test]
    async fn all_failed_broadcast_is_still_a_partial_failure() {
        let store = Arc::new(InMemoryStateStore::new());
        // Both already settled; CreatedViaApi has nowhere to go on either.
        let mut settled = Vec::new();
        for _ in 0..2 {
            settled.push(Arc::new(
                MachineInstance::bind_at(
                    definition(),
                    store.clone(),
                    Uuid::new_v4(),
                    TxState::Settled,
                )
                .await
                .unwrap(),
            ));
        }

        let link = ChildLink::new();
        for child in &settled {
            link.attach(child.clone());
        }

        let outcome = link.broadcast(TxEvent::CreatedViaApi, &()).await;

        assert!(!outcome.is_clean());
        assert!(outcome.is_partial_failure());
        assert!(outcome.delivered.is_empty());
        assert_eq!(outcome.failures.len(), 2);

        let error = outcome.into_result().unwrap_err();
        assert_eq!(error.delivered, 0);
        assert_eq!(error.total, 2);
    }

    #[tokio::test]
    async fn broadcast_to_no_children_is_clean() {
        let link: ChildLink<TxState, TxEvent, ()> = ChildLink::new();

        let outcome = link.broadcast(TxEvent::CreatedViaApi, &()).await;

        assert!(outcome.is_clean());
        assert!(!outcome.is_partial_failure());
        assert!(outcome.delivered.is_empty());
        assert!(link.is_empty());
    }

    #[tokio::test]
    async fn aggregates_are_vacuously_true_without_children() {
        let link: ChildLink<TxState, TxEvent, ()> = ChildLink::new();

        assert!(link.all_in(|s| s.is_terminal()).await);
        assert_eq!(link.count_where(|s| s.is_terminal()).await, 0);
    }

    #[tokio::test]
    async fn aggregates_read_live_child_states() {
        let store = Arc::new(InMemoryStateStore::new());
        let first = child(&store).await;
        let second = child(&store).await;

        let link = ChildLink::new();
        link.attach(first.clone());
        link.attach(second.clone());

        link.broadcast(TxEvent::CreatedViaApi, &()).await;
        assert!(!link.all_in(|s| *s == TxState::Settled).await);
        assert_eq!(link.count_where(|s| *s == TxState::Pending).await, 2);

        first.fire(TxEvent::SettledViaApi, &()).await.unwrap();
        assert_eq!(link.count_where(|s| *s == TxState::Settled).await, 1);
        assert!(!link.all_in(|s| *s == TxState::Settled).await);

        second.fire(TxEvent::SettledViaApi, &()).await.unwrap();
        // The tally is read fresh, so the second settlement is visible
        // immediately.
        assert!(link.all_in(|s| *s == TxState::Settled).await);
        let states = link.states().await;
        assert_eq!(states.len(), 2);
        assert!(states.iter().all(|(_, s)| *s == TxState::Settled));
    }

    #[tokio::test]
    async fn into_result_names_the_children_left_behind() {
        let store = Arc::new(InMemoryStateStore::new());
        let healthy = child(&store).await;
        let stuck = Arc::new(
            MachineInstance::bind_at(definition(), store.clone(), Uuid::new_v4(), TxState::Settled)
                .await
                .unwrap(),
        );

        let link = ChildLink::new();
        link.attach(healthy);
        link.attach(stuck.clone());

        let error = link
            .broadcast(TxEvent::CreatedViaApi, &())
            .await
            .into_result()
            .unwrap_err();

        assert_eq!(error.delivered, 1);
        assert_eq!(error.total, 2);
        assert_eq!(error.failures[0].child, stuck.entity());
        assert_eq!(error.to_string(), "Broadcast delivered to 1 of 2 children");
    }
}
