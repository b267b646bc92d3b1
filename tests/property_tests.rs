//! Property-based tests for definitions and bound instances.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated event sequences and guard thresholds.

use proptest::prelude::*;
use std::sync::Arc;
use turnstile::{
    event_enum, state_enum, DefinitionBuilder, InMemoryStateStore, InstanceSnapshot,
    MachineDefinition, MachineInstance, TransitionBuilder,
};
use uuid::Uuid;

state_enum! {
    enum TxState {
        Draft,
        Pending,
        Settled,
        Failed,
    }
    terminal: [Settled, Failed]
    error: [Failed]
}

event_enum! {
    enum TxEvent {
        CreatedViaApi,
        SettledViaApi,
        FailedViaApi,
    }
}

fn bank_transaction_definition() -> Arc<MachineDefinition<TxState, TxEvent, ()>> {
    Arc::new(
        DefinitionBuilder::new()
            .states([
                TxState::Draft,
                TxState::Pending,
                TxState::Settled,
                TxState::Failed,
            ])
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
            .transition(
                TransitionBuilder::new()
                    .from(TxState::Pending)
                    .on(TxEvent::FailedViaApi)
                    .to(TxState::Failed),
            )
            .unwrap()
            .build()
            .unwrap(),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Runtime should build")
}

prop_compose! {
    fn arbitrary_event()(variant in 0..3u8) -> TxEvent {
        match variant {
            0 => TxEvent::CreatedViaApi,
            1 => TxEvent::SettledViaApi,
            _ => TxEvent::FailedViaApi,
        }
    }
}

proptest! {
    #[test]
    fn random_walks_stay_in_the_declared_state_set(
        events in prop::collection::vec(arbitrary_event(), 0..12)
    ) {
        runtime().block_on(async {
            let definition = bank_transaction_definition();
            let store = Arc::new(InMemoryStateStore::new());
            let instance = MachineInstance::bind(definition.clone(), store, Uuid::new_v4())
                .await
                .unwrap();

            for event in events {
                let _ = instance.fire(event, &()).await;
                let state = instance.current_state().await;
                prop_assert!(definition.contains_state(&state));
            }
            Ok(())
        })?;
    }

    #[test]
    fn rejected_fires_leave_the_instance_untouched(
        events in prop::collection::vec(arbitrary_event(), 1..12)
    ) {
        runtime().block_on(async {
            let store = Arc::new(InMemoryStateStore::new());
            let instance =
                MachineInstance::bind(bank_transaction_definition(), store, Uuid::new_v4())
                    .await
                    .unwrap();

            for event in events {
                let state_before = instance.current_state().await;
                let version_before = instance.version().await;

                match instance.fire(event, &()).await {
                    Ok(report) => {
                        prop_assert_eq!(report.from, state_before);
                        prop_assert_eq!(report.version, version_before + 1);
                    }
                    Err(_) => {
                        prop_assert_eq!(instance.current_state().await, state_before);
                        prop_assert_eq!(instance.version().await, version_before);
                    }
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn version_matches_the_transition_log(
        events in prop::collection::vec(arbitrary_event(), 0..12)
    ) {
        runtime().block_on(async {
            let store = Arc::new(InMemoryStateStore::new());
            let instance =
                MachineInstance::bind(bank_transaction_definition(), store, Uuid::new_v4())
                    .await
                    .unwrap();

            for event in events {
                let _ = instance.fire(event, &()).await;
            }

            let log = instance.log().await;
            prop_assert_eq!(instance.version().await, log.len() as u64);

            // Records chain: each transition leaves the state the previous
            // one entered, starting from the bind state.
            let mut expected_from = TxState::Draft;
            for record in log.records() {
                prop_assert_eq!(&record.from, &expected_from);
                expected_from = record.to.clone();
            }
            prop_assert_eq!(instance.current_state().await, expected_from);
            Ok(())
        })?;
    }

    #[test]
    fn first_passing_guard_wins_for_any_amount(
        amount in 0..1_000u64,
        first_threshold in 0..1_000u64,
        second_threshold in 0..1_000u64,
    ) {
        runtime().block_on(async {
            let definition: Arc<MachineDefinition<TxState, TxEvent, u64>> = Arc::new(
                DefinitionBuilder::new()
                    .states([
                        TxState::Draft,
                        TxState::Pending,
                        TxState::Settled,
                        TxState::Failed,
                    ])
                    .initial(TxState::Draft)
                    .transition(
                        TransitionBuilder::new()
                            .from(TxState::Draft)
                            .on(TxEvent::CreatedViaApi)
                            .to(TxState::Pending)
                            .when(move |amount: &u64| *amount >= first_threshold),
                    )
                    .unwrap()
                    .transition(
                        TransitionBuilder::new()
                            .from(TxState::Draft)
                            .on(TxEvent::CreatedViaApi)
                            .to(TxState::Settled)
                            .when(move |amount: &u64| *amount >= second_threshold),
                    )
                    .unwrap()
                    .transition(
                        TransitionBuilder::new()
                            .from(TxState::Draft)
                            .on(TxEvent::CreatedViaApi)
                            .to(TxState::Failed),
                    )
                    .unwrap()
                    .build()
                    .unwrap(),
            );

            let store = Arc::new(InMemoryStateStore::new());
            let instance = MachineInstance::bind(definition, store, Uuid::new_v4())
                .await
                .unwrap();

            let expected = if amount >= first_threshold {
                TxState::Pending
            } else if amount >= second_threshold {
                TxState::Settled
            } else {
                TxState::Failed
            };

            let report = instance.fire(TxEvent::CreatedViaApi, &amount).await.unwrap();
            prop_assert_eq!(report.to, expected);
            Ok(())
        })?;
    }

    #[test]
    fn refiring_an_applied_event_is_rejected(
        events in prop::collection::vec(arbitrary_event(), 1..8)
    ) {
        runtime().block_on(async {
            let store = Arc::new(InMemoryStateStore::new());
            let instance =
                MachineInstance::bind(bank_transaction_definition(), store, Uuid::new_v4())
                    .await
                    .unwrap();

            for event in events {
                let applied = instance.fire(event.clone(), &()).await.is_ok();
                if applied {
                    // No state in this machine accepts the same event
                    // twice in a row, so the duplicate must be rejected.
                    prop_assert!(instance.fire(event, &()).await.is_err());
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn snapshot_roundtrip_preserves_the_walk(
        events in prop::collection::vec(arbitrary_event(), 0..12)
    ) {
        runtime().block_on(async {
            let store = Arc::new(InMemoryStateStore::new());
            let instance =
                MachineInstance::bind(bank_transaction_definition(), store.clone(), Uuid::new_v4())
                    .await
                    .unwrap();

            for event in events {
                let _ = instance.fire(event, &()).await;
            }

            let snapshot = instance.snapshot().await;
            let json = snapshot.to_json().unwrap();
            let parsed = InstanceSnapshot::<TxState>::from_json(&json).unwrap();

            let restored =
                MachineInstance::restore(bank_transaction_definition(), store, parsed).unwrap();
            prop_assert_eq!(restored.current_state().await, instance.current_state().await);
            prop_assert_eq!(restored.version().await, instance.version().await);
            prop_assert_eq!(restored.log().await.len(), instance.log().await.len());
            Ok(())
        })?;
    }
}
