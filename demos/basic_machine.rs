//! Basic Machine
//!
//! This example demonstrates defining a machine, binding an instance, and
//! firing events through it.
//!
//! Key concepts:
//! - Declaring states and events with the enum macros
//! - Building a definition with guarded transitions
//! - Firing events and reading the commit report
//! - Reconstructing the path from the transition log
//!
//! Run with: cargo run --example basic_machine

use std::sync::Arc;

use turnstile::{
    event_enum, state_enum, DefinitionBuilder, InMemoryStateStore, MachineInstance,
    TransitionBuilder,
};
use uuid::Uuid;

state_enum! {
    enum PaymentState {
        Draft,
        Pending,
        Settled,
    }
    terminal: [Settled]
}

event_enum! {
    enum PaymentEvent {
        SubmittedViaApi,
        SettledViaApi,
    }
}

struct Payment {
    amount: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Basic Machine Example ===\n");

    // Declare the shape of the lifecycle once, share it across instances.
    let definition = Arc::new(
        DefinitionBuilder::<PaymentState, PaymentEvent, Payment>::new()
            .states([
                PaymentState::Draft,
                PaymentState::Pending,
                PaymentState::Settled,
            ])
            .initial(PaymentState::Draft)
            .transition(
                TransitionBuilder::new()
                    .from(PaymentState::Draft)
                    .on(PaymentEvent::SubmittedViaApi)
                    .to(PaymentState::Pending)
                    .when(|payment: &Payment| payment.amount > 0),
            )?
            .transition(
                TransitionBuilder::new()
                    .from(PaymentState::Pending)
                    .on(PaymentEvent::SettledViaApi)
                    .to(PaymentState::Settled),
            )?
            .build()?,
    );

    let store = Arc::new(InMemoryStateStore::new());
    let payment = MachineInstance::bind(definition, store, Uuid::new_v4()).await?;
    println!("Bound instance {}", payment.entity());
    println!("Initial state: {:?}\n", payment.current_state().await);

    // A zero amount never passes the submission guard.
    let rejected = payment
        .fire(
            PaymentEvent::SubmittedViaApi,
            &Payment { amount: 0 },
        )
        .await;
    println!("Submitting with amount 0: {}", rejected.unwrap_err());

    // A real amount commits.
    let report = payment
        .fire(
            PaymentEvent::SubmittedViaApi,
            &Payment { amount: 2_500 },
        )
        .await?;
    println!(
        "Submitted: {:?} -> {:?} at version {}",
        report.from, report.to, report.version
    );

    payment
        .fire(
            PaymentEvent::SettledViaApi,
            &Payment { amount: 2_500 },
        )
        .await?;
    println!("Settled: terminal = {}\n", payment.is_terminal().await);

    let log = payment.log().await;
    println!("Path taken: {:?}", log.path());
    println!("Commits recorded: {}", log.len());

    println!("\n=== Example Complete ===");
    Ok(())
}
