//! Transfer Lifecycle
//!
//! A bank transaction supervising the transfers it funds. Shows:
//! - Linking child instances to a parent with `ChildLink`
//! - Downward broadcast from an after-action, with partial-failure reporting
//! - An async guard aggregating live child states
//!
//! Run with: cargo run --example transfer_lifecycle

use std::sync::Arc;

use futures::FutureExt;
use turnstile::{
    event_enum, state_enum, Action, ChildLink, DefinitionBuilder, Guard, InMemoryStateStore,
    MachineDefinition, MachineInstance, TransitionBuilder,
};
use uuid::Uuid;

state_enum! {
    enum TransferState {
        Draft,
        Depositing,
        Deposited,
    }
    terminal: [Deposited]
}

event_enum! {
    enum TransferEvent {
        BankTransactionCreated,
        BankTransactionSucceeded,
    }
}

state_enum! {
    enum BankTxState {
        Draft,
        Creating,
        Pending,
        Settled,
    }
    terminal: [Settled]
}

event_enum! {
    enum BankTxEvent {
        CreatedViaApi,
        SettledViaApi,
    }
}

type TransferLink = ChildLink<TransferState, TransferEvent, ()>;

struct BankCtx {
    transfers: Arc<TransferLink>,
}

fn transfer_definition() -> Arc<MachineDefinition<TransferState, TransferEvent, ()>> {
    Arc::new(
        DefinitionBuilder::new()
            .states([
                TransferState::Draft,
                TransferState::Depositing,
                TransferState::Deposited,
            ])
            .initial(TransferState::Draft)
            .transition(
                TransitionBuilder::new()
                    .from(TransferState::Draft)
                    .on(TransferEvent::BankTransactionCreated)
                    .to(TransferState::Depositing),
            )
            .unwrap()
            .transition(
                TransitionBuilder::new()
                    .from(TransferState::Depositing)
                    .on(TransferEvent::BankTransactionSucceeded)
                    .to(TransferState::Deposited),
            )
            .unwrap()
            .build()
            .unwrap(),
    )
}

fn bank_transaction_definition() -> Arc<MachineDefinition<BankTxState, BankTxEvent, BankCtx>> {
    Arc::new(
        DefinitionBuilder::new()
            .states([
                BankTxState::Draft,
                BankTxState::Creating,
                BankTxState::Pending,
                BankTxState::Settled,
            ])
            .initial(BankTxState::Draft)
            .transition(
                TransitionBuilder::new()
                    .from(BankTxState::Creating)
                    .on(BankTxEvent::CreatedViaApi)
                    .to(BankTxState::Pending)
                    .after(Action::new_async(
                        "notify_transfers_created",
                        |ctx: &BankCtx| {
                            let link = Arc::clone(&ctx.transfers);
                            async move {
                                link.broadcast(TransferEvent::BankTransactionCreated, &())
                                    .await
                                    .into_result()?;
                                Ok(())
                            }
                            .boxed()
                        },
                    )),
            )
            .unwrap()
            .transition(
                TransitionBuilder::new()
                    .from(BankTxState::Pending)
                    .on(BankTxEvent::SettledViaApi)
                    .to(BankTxState::Settled)
                    .guard(Guard::new_async(|ctx: &BankCtx| {
                        let link = Arc::clone(&ctx.transfers);
                        async move {
                            link.all_in(|s| *s == TransferState::Depositing).await
                        }
                        .boxed()
                    }))
                    .after(Action::new_async(
                        "notify_transfers_settled",
                        |ctx: &BankCtx| {
                            let link = Arc::clone(&ctx.transfers);
                            async move {
                                link.broadcast(TransferEvent::BankTransactionSucceeded, &())
                                    .await
                                    .into_result()?;
                                Ok(())
                            }
                            .boxed()
                        },
                    )),
            )
            .unwrap()
            .build()
            .unwrap(),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Transfer Lifecycle ===\n");

    let definition = transfer_definition();
    let transfer_store = Arc::new(InMemoryStateStore::new());
    let first = Arc::new(
        MachineInstance::bind(definition.clone(), transfer_store.clone(), Uuid::new_v4()).await?,
    );
    let second = Arc::new(
        MachineInstance::bind(definition.clone(), transfer_store.clone(), Uuid::new_v4()).await?,
    );

    let link = Arc::new(TransferLink::new());
    link.attach(first.clone());
    link.attach(second.clone());
    println!("Attached {} transfers to the bank transaction\n", link.len());

    let bank_store = Arc::new(InMemoryStateStore::new());
    let bank = MachineInstance::bind_at(
        bank_transaction_definition(),
        bank_store,
        Uuid::new_v4(),
        BankTxState::Creating,
    )
    .await?;
    let ctx = BankCtx {
        transfers: Arc::clone(&link),
    };

    println!("=== Creation Callback ===");
    let created = bank.fire(BankTxEvent::CreatedViaApi, &ctx).await?;
    println!(
        "Bank transaction: {:?} -> {:?} (broadcast clean: {})",
        created.from,
        created.to,
        created.fully_applied()
    );
    for (entity, state) in link.states().await {
        println!("  transfer {entity}: {state:?}");
    }

    println!("\n=== Late Arrival ===");
    // A transfer joins the batch after the creation callback already ran.
    let straggler =
        Arc::new(MachineInstance::bind(definition, transfer_store, Uuid::new_v4()).await?);
    link.attach(straggler.clone());
    let early = bank.fire(BankTxEvent::SettledViaApi, &ctx).await;
    println!("Settling with a transfer still in Draft: {}", early.unwrap_err());

    straggler
        .fire(TransferEvent::BankTransactionCreated, &())
        .await?;
    println!("Straggler caught up: {:?}", straggler.current_state().await);

    println!("\n=== Settlement Callback ===");
    let settled = bank.fire(BankTxEvent::SettledViaApi, &ctx).await?;
    println!(
        "Bank transaction: {:?} -> {:?} at version {}",
        settled.from, settled.to, settled.version
    );
    println!(
        "All transfers deposited: {}",
        link.all_in(|s| *s == TransferState::Deposited).await
    );
    println!("Bank transaction path: {:?}", bank.log().await.path());

    println!("\n=== Example Complete ===");
    Ok(())
}
