//! Transition resolution and action execution.
//!
//! Stateless pipeline shared by `fire` and `can_fire`: walk the candidate
//! transitions in declaration order, evaluate guards against the caller's
//! context, then run the selected transition's actions. Commit bookkeeping
//! stays with the instance.

use crate::core::{ActionFailure, Event, State};
use crate::definition::{MachineDefinition, Transition};
use crate::instance::error::FireError;

/// Select the transition to commit: the first candidate, in declaration
/// order, whose guard passes. A missing guard always passes.
pub(crate) async fn resolve<'a, S, E, C>(
    definition: &'a MachineDefinition<S, E, C>,
    state: &S,
    event: &E,
    ctx: &C,
) -> Result<&'a Transition<S, E, C>, FireError>
where
    S: State,
    E: Event,
{
    let mut candidates = 0usize;
    for transition in definition.candidates(state, event) {
        candidates += 1;
        match &transition.guard {
            None => return Ok(transition),
            Some(guard) if guard.check(ctx).await => return Ok(transition),
            Some(_) => {}
        }
    }

    if candidates == 0 {
        Err(FireError::NoTransition {
            state: state.name().to_string(),
            event: event.name().to_string(),
        })
    } else {
        Err(FireError::GuardRejected {
            state: state.name().to_string(),
            event: event.name().to_string(),
            candidates,
        })
    }
}

/// Run the before-actions in declaration order. The first failure aborts
/// the pipeline; remaining actions never run.
pub(crate) async fn run_before<S, E, C>(
    transition: &Transition<S, E, C>,
    ctx: &C,
) -> Result<(), FireError>
where
    S: State,
    E: Event,
{
    for action in &transition.before {
        action.run(ctx).await.map_err(FireError::BeforeAction)?;
    }
    Ok(())
}

/// Run the after-actions in declaration order. Failures are collected, not
/// raised: the commit already happened and cannot be rolled back.
pub(crate) async fn run_after<S, E, C>(transition: &Transition<S, E, C>, ctx: &C) -> Vec<ActionFailure>
where
    S: State,
    E: Event,
{
    let mut failures = Vec::new();
    for action in &transition.after {
        if let Err(failure) = action.run(ctx).await {
            failures.push(failure);
        }
    }
    failures
}
