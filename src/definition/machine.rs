//! Immutable machine definitions and their builder.

use std::collections::HashSet;

use crate::core::{Event, State};
use crate::definition::error::DefinitionError;
use crate::definition::transition::{Transition, TransitionBuilder};

/// A validated, immutable state machine definition.
///
/// A definition owns the state set, the initial state, the event set and
/// the transition table. It holds no runtime state; bind it to an entity
/// to obtain a live instance. One definition is typically shared between
/// many instances behind an `Arc`.
pub struct MachineDefinition<S: State, E: Event, C> {
    states: Vec<S>,
    initial: S,
    events: Vec<E>,
    transitions: Vec<Transition<S, E, C>>,
}

impl<S: State, E: Event, C> MachineDefinition<S, E, C> {
    /// The initial state new instances start in.
    pub fn initial(&self) -> &S {
        &self.initial
    }

    /// All declared states, in declaration order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// All events, declared ones first, then events collected from
    /// transitions, deduplicated by name.
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// The full transition table, in declaration order.
    pub fn transitions(&self) -> &[Transition<S, E, C>] {
        &self.transitions
    }

    /// Whether `state` belongs to the declared state set.
    pub fn contains_state(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    /// Transitions leaving `state` on `event`, in declaration order.
    ///
    /// Declaration order is the resolution order: the executor walks the
    /// candidates front to back and commits the first one whose guard
    /// passes.
    pub fn candidates<'a, 'q>(
        &'a self,
        state: &'q S,
        event: &'q E,
    ) -> impl Iterator<Item = &'a Transition<S, E, C>> + 'q
    where
        'a: 'q,
    {
        self.transitions.iter().filter(move |t| t.matches(state, event))
    }
}

impl<S: State, E: Event, C> Clone for MachineDefinition<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            initial: self.initial.clone(),
            events: self.events.clone(),
            transitions: self.transitions.clone(),
        }
    }
}

/// Builder for constructing machine definitions with a fluent API.
pub struct DefinitionBuilder<S: State, E: Event, C> {
    states: Vec<S>,
    initials: Vec<S>,
    events: Vec<E>,
    transitions: Vec<Transition<S, E, C>>,
}

impl<S: State, E: Event, C> DefinitionBuilder<S, E, C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            initials: Vec::new(),
            events: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Declare a state.
    pub fn state(mut self, state: S) -> Self {
        self.states.push(state);
        self
    }

    /// Declare multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.states.extend(states);
        self
    }

    /// Mark the initial state (required). The state must also be declared
    /// via [`state`](Self::state).
    pub fn initial(mut self, state: S) -> Self {
        self.initials.push(state);
        self
    }

    /// Declare an event explicitly. Events referenced by transitions are
    /// collected automatically; explicit declaration is only needed for
    /// events with no transitions yet.
    pub fn event(mut self, event: E) -> Self {
        self.events.push(event);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(
        mut self,
        builder: TransitionBuilder<S, E, C>,
    ) -> Result<Self, DefinitionError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, E, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, E, C>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build the definition.
    /// Returns an error if required fields are missing or validation fails.
    pub fn build(self) -> Result<MachineDefinition<S, E, C>, DefinitionError> {
        let mut initials = self.initials.into_iter();
        let initial = initials.next().ok_or(DefinitionError::MissingInitial)?;
        if let Some(second) = initials.next() {
            return Err(DefinitionError::DuplicateInitial {
                first: initial.name().to_string(),
                second: second.name().to_string(),
            });
        }

        let mut state_names = HashSet::new();
        for state in &self.states {
            if !state_names.insert(state.name().to_string()) {
                return Err(DefinitionError::DuplicateState {
                    name: state.name().to_string(),
                });
            }
        }

        if !self.states.contains(&initial) {
            return Err(DefinitionError::UndeclaredInitial {
                state: initial.name().to_string(),
            });
        }

        for transition in &self.transitions {
            for endpoint in [&transition.from, &transition.to] {
                if !self.states.contains(endpoint) {
                    return Err(DefinitionError::UndeclaredState {
                        state: endpoint.name().to_string(),
                        event: transition.event.name().to_string(),
                    });
                }
            }
        }

        let mut events: Vec<E> = Vec::new();
        for event in self.events {
            if !events.iter().any(|e| e.name() == event.name()) {
                events.push(event);
            }
        }
        for transition in &self.transitions {
            if !events.iter().any(|e| e.name() == transition.event.name()) {
                events.push(transition.event.clone());
            }
        }

        for event in &events {
            if state_names.contains(event.name()) {
                return Err(DefinitionError::EventStateCollision {
                    name: event.name().to_string(),
                });
            }
        }

        Ok(MachineDefinition {
            states: self.states,
            initial,
            events,
            transitions: self.transitions,
        })
    }
}

impl<S: State, E: Event, C> Default for DefinitionBuilder<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}
