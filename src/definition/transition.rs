//! Transition tuples and their fluent builder.

use crate::core::{Action, Event, Guard, State};
use crate::definition::error::DefinitionError;

/// One edge of the machine graph: `(from, event, to)` plus the guard and
/// actions that give it transactional semantics.
///
/// Several transitions may share a `(from, event)` pair; at runtime they
/// are tried in declaration order and the first whose guard passes wins.
pub struct Transition<S: State, E: Event, C> {
    /// Source state.
    pub from: S,
    /// Event that selects this transition.
    pub event: E,
    /// Target state.
    pub to: S,
    /// Optional guard; a missing guard always passes.
    pub guard: Option<Guard<C>>,
    /// Actions run before commit, in order. The first failure aborts the
    /// transition with the state unchanged.
    pub before: Vec<Action<C>>,
    /// Actions run after commit, in order. Failures are reported but can
    /// no longer roll the commit back.
    pub after: Vec<Action<C>>,
}

impl<S: State, E: Event, C> Transition<S, E, C> {
    /// Pure candidate check: does this transition leave `state` on `event`?
    ///
    /// Guard evaluation is not part of matching; the executor evaluates
    /// guards over the caller's context after collecting candidates.
    pub fn matches(&self, state: &S, event: &E) -> bool {
        self.from == *state && self.event == *event
    }
}

impl<S: State, E: Event, C> Clone for Transition<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            event: self.event.clone(),
            to: self.to.clone(),
            guard: self.guard.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use turnstile::core::{Event, State};
/// use turnstile::definition::TransitionBuilder;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Phase { Draft, Pending }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Draft => "Draft",
///             Self::Pending => "Pending",
///         }
///     }
/// }
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Trigger { Submit }
///
/// impl Event for Trigger {
///     fn name(&self) -> &str { "Submit" }
/// }
///
/// let transition = TransitionBuilder::<_, _, ()>::new()
///     .from(Phase::Draft)
///     .on(Trigger::Submit)
///     .to(Phase::Pending)
///     .build()
///     .unwrap();
///
/// assert!(transition.matches(&Phase::Draft, &Trigger::Submit));
/// ```
pub struct TransitionBuilder<S: State, E: Event, C> {
    from: Option<S>,
    event: Option<E>,
    to: Option<S>,
    guard: Option<Guard<C>>,
    before: Vec<Action<C>>,
    after: Vec<Action<C>>,
}

impl<S: State, E: Event, C> TransitionBuilder<S, E, C> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            to: None,
            guard: None,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the triggering event (required).
    pub fn on(mut self, event: E) -> Self {
        self.event = Some(event);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Attach a guard (optional).
    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach a guard from a synchronous predicate (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Append a before-action. Before-actions run in the order appended.
    pub fn before(mut self, action: Action<C>) -> Self {
        self.before.push(action);
        self
    }

    /// Append an after-action. After-actions run in the order appended.
    pub fn after(mut self, action: Action<C>) -> Self {
        self.after.push(action);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, E, C>, DefinitionError> {
        let from = self.from.ok_or(DefinitionError::MissingFrom)?;
        let event = self.event.ok_or(DefinitionError::MissingEvent)?;
        let to = self.to.ok_or(DefinitionError::MissingTo)?;

        Ok(Transition {
            from,
            event,
            to,
            guard: self.guard,
            before: self.before,
            after: self.after,
        })
    }
}

impl<S: State, E: Event, C> Default for TransitionBuilder<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Draft,
        Depositing,
        Deposited,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Draft => "Draft",
                Self::Depositing => "Depositing",
                Self::Deposited => "Deposited",
            }
        }
    }

    #[derive(Clone, PartialEq, Debug)]
    enum TestEvent {
        DepositingViaApi,
        BankTransactionSucceeded,
    }

    impl Event for TestEvent {
        fn name(&self) -> &str {
            match self {
                Self::DepositingViaApi => "DepositingViaApi",
                Self::BankTransactionSucceeded => "BankTransactionSucceeded",
            }
        }
    }

    #[test]
    fn builder_requires_from_state() {
        let result = TransitionBuilder::<TestState, TestEvent, ()>::new()
            .on(TestEvent::DepositingViaApi)
            .to(TestState::Depositing)
            .build();

        assert!(matches!(result, Err(DefinitionError::MissingFrom)));
    }

    #[test]
    fn builder_requires_event() {
        let result = TransitionBuilder::<TestState, TestEvent, ()>::new()
            .from(TestState::Draft)
            .to(TestState::Depositing)
            .build();

        assert!(matches!(result, Err(DefinitionError::MissingEvent)));
    }

    #[test]
    fn builder_requires_to_state() {
        let result = TransitionBuilder::<TestState, TestEvent, ()>::new()
            .from(TestState::Draft)
            .on(TestEvent::DepositingViaApi)
            .build();

        assert!(matches!(result, Err(DefinitionError::MissingTo)));
    }

    #[test]
    fn fluent_api_builds_transition() {
        let transition = TransitionBuilder::<TestState, TestEvent, ()>::new()
            .from(TestState::Draft)
            .on(TestEvent::DepositingViaApi)
            .to(TestState::Depositing)
            .build()
            .unwrap();

        assert_eq!(transition.from, TestState::Draft);
        assert_eq!(transition.to, TestState::Depositing);
        assert!(transition.guard.is_none());
        assert!(transition.before.is_empty());
        assert!(transition.after.is_empty());
    }

    #[test]
    fn matches_checks_state_and_event() {
        let transition = TransitionBuilder::<TestState, TestEvent, ()>::new()
            .from(TestState::Depositing)
            .on(TestEvent::BankTransactionSucceeded)
            .to(TestState::Deposited)
            .build()
            .unwrap();

        assert!(transition.matches(&TestState::Depositing, &TestEvent::BankTransactionSucceeded));
        assert!(!transition.matches(&TestState::Draft, &TestEvent::BankTransactionSucceeded));
        assert!(!transition.matches(&TestState::Depositing, &TestEvent::DepositingViaApi));
    }

    #[test]
    fn actions_keep_declaration_order() {
        let transition = TransitionBuilder::<TestState, TestEvent, ()>::new()
            .from(TestState::Draft)
            .on(TestEvent::DepositingViaApi)
            .to(TestState::Depositing)
            .before(Action::new("reserve_funds", |_| Ok(())))
            .before(Action::new("debit_account", |_| Ok(())))
            .after(Action::new("notify_investor", |_| Ok(())))
            .build()
            .unwrap();

        let before: Vec<_> = transition.before.iter().map(|a| a.name()).collect();
        assert_eq!(before, vec!["reserve_funds", "debit_account"]);
        assert_eq!(transition.after[0].name(), "notify_investor");
    }

    #[test]
    fn when_attaches_guard() {
        let transition = TransitionBuilder::<TestState, TestEvent, u32>::new()
            .from(TestState::Draft)
            .on(TestEvent::DepositingViaApi)
            .to(TestState::Depositing)
            .when(|amount: &u32| *amount > 0)
            .build()
            .unwrap();

        assert!(transition.guard.is_some());
    }
}
