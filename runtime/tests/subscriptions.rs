//! Integration tests for Store subscriptions and dispatch ordering
//!
//! Covers listener bookkeeping across many subscribe/unsubscribe cycles and
//! the guarantee that every dispatch is reduced exactly once.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use statehouse_core::reducer::Reducer;
use statehouse_core::thunk::Thunk;
use statehouse_runtime::Store;
use statehouse_testing::StateRecorder;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct LedgerState {
    balance: i64,
    entries: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum LedgerAction {
    Deposit(i64),
    Withdraw(i64),
    Audit,
}

#[derive(Clone)]
struct LedgerReducer;

impl Reducer for LedgerReducer {
    type State = LedgerState;
    type Action = LedgerAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) {
        match action {
            LedgerAction::Deposit(amount) => {
                state.balance += amount;
                state.entries += 1;
            },
            LedgerAction::Withdraw(amount) => {
                state.balance -= amount;
                state.entries += 1;
            },
            LedgerAction::Audit => {},
        }
    }
}

fn ledger() -> Store<LedgerState, LedgerAction, (), LedgerReducer> {
    Store::with_default_state(LedgerReducer, ())
}

fn counting_listener(
    store: &Store<LedgerState, LedgerAction, (), LedgerReducer>,
) -> (statehouse_runtime::Subscription, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let subscription = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (subscription, calls)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_recorder_sees_every_dispatch() {
    let store = ledger();
    let recorder = StateRecorder::attach(&store);

    store.dispatch_action(LedgerAction::Deposit(100));
    store.dispatch_action(LedgerAction::Audit);
    store.dispatch_action(LedgerAction::Withdraw(30));

    let balances: Vec<i64> = recorder.snapshots().iter().map(|s| s.balance).collect();
    assert_eq!(balances, vec![100, 100, 70]);
}

#[test]
fn test_unsubscribe_twice_keeps_neighbours() {
    let store = ledger();
    let (first, first_calls) = counting_listener(&store);
    let (middle, middle_calls) = counting_listener(&store);
    let (_last, last_calls) = counting_listener(&store);

    middle.unsubscribe();
    middle.unsubscribe();
    store.dispatch_action(LedgerAction::Audit);

    assert_eq!(store.subscriber_count(), 2);
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(middle_calls.load(Ordering::SeqCst), 0);
    assert_eq!(last_calls.load(Ordering::SeqCst), 1);

    first.unsubscribe();
    store.dispatch_action(LedgerAction::Audit);

    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(last_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_listener_unsubscribing_itself() {
    let store = ledger();
    let calls = Arc::new(AtomicUsize::new(0));
    let slot: Arc<std::sync::Mutex<Option<statehouse_runtime::Subscription>>> =
        Arc::new(std::sync::Mutex::new(None));

    let counter = Arc::clone(&calls);
    let own = Arc::clone(&slot);
    let subscription = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(subscription) = own.lock().unwrap().as_ref() {
            subscription.unsubscribe();
        }
    });
    *slot.lock().unwrap() = Some(subscription);

    store.dispatch_action(LedgerAction::Deposit(1));
    store.dispatch_action(LedgerAction::Deposit(1));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(store.state(|s| s.balance), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatches_are_all_reduced() {
    let store = ledger();
    let (_subscription, calls) = counting_listener(&store);

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store.dispatch_action(LedgerAction::Deposit(2));
            })
        })
        .collect();

    for handle in handles {
        if let Err(e) = handle.await {
            panic!("concurrent dispatch task panicked: {e}");
        }
    }

    assert_eq!(store.get_state(), LedgerState {
        balance: 100,
        entries: 50,
    });
    assert_eq!(calls.load(Ordering::SeqCst), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_thunks_settle() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("statehouse_runtime=trace")
        .with_test_writer()
        .try_init();

    let store = ledger();
    let recorder = StateRecorder::attach(&store);

    let handles: Vec<_> = (1..=10)
        .map(|amount| {
            store
                .dispatch_thunk(Thunk::new(move |api| {
                    api.dispatch(LedgerAction::Deposit(amount));
                    Box::pin(async move {
                        tokio::task::yield_now().await;
                        api.dispatch(LedgerAction::Withdraw(amount));
                    })
                }))
                .unwrap()
        })
        .collect();

    let results = futures::future::join_all(handles.into_iter().map(|h| h.wait())).await;
    assert!(results.iter().all(Result::is_ok));

    assert_eq!(store.get_state(), LedgerState {
        balance: 0,
        entries: 20,
    });
    assert_eq!(recorder.len(), 20);
}

fn action_strategy() -> impl Strategy<Value = LedgerAction> {
    prop_oneof![
        (0i64..1_000).prop_map(LedgerAction::Deposit),
        (0i64..1_000).prop_map(LedgerAction::Withdraw),
        Just(LedgerAction::Audit),
    ]
}

proptest! {
    #[test]
    fn prop_store_matches_direct_reduction(
        actions in proptest::collection::vec(action_strategy(), 0..64)
    ) {
        let store = ledger();
        let recorder = StateRecorder::attach(&store);

        let mut expected = LedgerState::default();
        for action in &actions {
            LedgerReducer.reduce(&mut expected, action);
            let returned = store.dispatch_action(action.clone());
            prop_assert_eq!(&returned, action);
        }

        prop_assert_eq!(store.get_state(), expected);
        prop_assert_eq!(recorder.len(), actions.len());
    }

    #[test]
    fn prop_audit_never_changes_state(
        actions in proptest::collection::vec(action_strategy(), 0..32)
    ) {
        let store = ledger();
        for action in actions {
            store.dispatch_action(action);
        }

        let before = store.get_state();
        store.dispatch_action(LedgerAction::Audit);
        prop_assert_eq!(store.get_state(), before);
    }
}
