//! Integration tests for the user fetch thunk with Store
//!
//! The network is replaced by a scripted [`UserApi`] that holds its answer
//! until the test releases it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use futures::future::BoxFuture;
use proptest::prelude::*;
use statehouse_core::reducer::Reducer;
use statehouse_core::thunk::Dispatchable;
use statehouse_runtime::StoreError;
use statehouse_testing::StateRecorder;
use std::sync::Arc;
use tokio::sync::Notify;
use user_fetch::{
    FetchError, HttpUserApi, User, UserApi, UsersAction, UsersConfig, UsersEnvironment,
    UsersReducer, UsersState, fetch_users, users_store,
};

// ============================================================================
// Test fixtures
// ============================================================================

/// Answers with a fixed result once released
struct ScriptedApi {
    result: Result<Vec<User>, FetchError>,
    release: Arc<Notify>,
}

impl ScriptedApi {
    fn answering(result: Result<Vec<User>, FetchError>) -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        (
            Self {
                result,
                release: Arc::clone(&release),
            },
            release,
        )
    }
}

impl UserApi for ScriptedApi {
    fn fetch_users(&self) -> BoxFuture<'_, Result<Vec<User>, FetchError>> {
        Box::pin(async move {
            self.release.notified().await;
            self.result.clone()
        })
    }
}

fn users(ids: &[u64]) -> Vec<User> {
    ids.iter()
        .map(|&id| User {
            id,
            name: format!("user-{id}"),
        })
        .collect()
}

// ============================================================================
// Thunk flow
// ============================================================================

#[tokio::test]
async fn test_loading_until_success() {
    let (api, release) = ScriptedApi::answering(Ok(users(&[1, 2, 3])));
    let store = users_store(UsersEnvironment::new(api));

    let task = store.dispatch_thunk(fetch_users()).unwrap();

    let state = store.get_state();
    assert!(state.loading);
    assert!(state.users.is_empty());

    release.notify_one();
    task.wait().await.unwrap();

    assert_eq!(
        store.get_state(),
        UsersState {
            loading: false,
            users: vec![1, 2, 3],
            error: String::new(),
        }
    );
}

#[tokio::test]
async fn test_failure_records_description() {
    let (api, release) = ScriptedApi::answering(Err(FetchError::Status { status: 404 }));
    let store = users_store(UsersEnvironment::new(api));

    let task = store.dispatch_thunk(fetch_users()).unwrap();
    assert!(store.get_state().loading);

    release.notify_one();
    task.wait().await.unwrap();

    assert_eq!(
        store.get_state(),
        UsersState {
            loading: false,
            users: Vec::new(),
            error: "Request failed with status code 404".to_string(),
        }
    );
}

#[tokio::test]
async fn test_listener_sees_request_then_result() {
    let (api, release) = ScriptedApi::answering(Ok(users(&[5])));
    let store = users_store(UsersEnvironment::new(api));
    let recorder = StateRecorder::attach(&store);

    let dispatched = store.dispatch(Dispatchable::Thunk(fetch_users())).unwrap();
    assert_eq!(recorder.len(), 1);

    release.notify_one();
    dispatched.into_task().unwrap().wait().await.unwrap();

    let loading: Vec<bool> = recorder.snapshots().iter().map(|s| s.loading).collect();
    assert_eq!(loading, vec![true, false]);
    assert_eq!(recorder.last().map(|s| s.users), Some(vec![5]));
}

#[tokio::test]
async fn test_failure_after_success_clears_users() {
    let (api, release) = ScriptedApi::answering(Err(FetchError::RequestFailed(
        "connection reset".to_string(),
    )));
    let store = users_store(UsersEnvironment::new(api));
    store.dispatch_action(UsersAction::fetch_users_success(vec![1, 2]));

    let task = store.dispatch_thunk(fetch_users()).unwrap();
    assert_eq!(store.get_state().users, vec![1, 2]);

    release.notify_one();
    task.wait().await.unwrap();

    let state = store.get_state();
    assert!(state.users.is_empty());
    assert_eq!(state.error, "Request failed: connection reset");
}

#[tokio::test]
async fn test_unreachable_endpoint_fails() {
    let config = UsersConfig {
        endpoint: "http://127.0.0.1:9/users".to_string(),
        timeout_secs: 2,
    };
    let store = users_store(UsersEnvironment::new(HttpUserApi::new(&config).unwrap()));

    let task = store.dispatch_thunk(fetch_users()).unwrap();
    task.wait().await.unwrap();

    let state = store.get_state();
    assert!(!state.loading);
    assert!(state.users.is_empty());
    assert!(!state.error.is_empty());
}

#[test]
fn test_thunk_outside_runtime_is_rejected() {
    let (api, _release) = ScriptedApi::answering(Ok(users(&[1])));
    let store = users_store(UsersEnvironment::new(api));

    let result = store.dispatch_thunk(fetch_users());

    assert!(matches!(result, Err(StoreError::NoRuntime(_))));
    assert_eq!(store.get_state(), UsersState::default());
}

// ============================================================================
// Property tests
// ============================================================================

fn users_action() -> impl Strategy<Value = UsersAction> {
    prop_oneof![
        Just(UsersAction::FetchUsersRequest),
        prop::collection::vec(any::<u64>(), 0..5).prop_map(UsersAction::FetchUsersSuccess),
        "[a-z ]{1,12}".prop_map(UsersAction::FetchUsersFailure),
        Just(UsersAction::Unknown),
    ]
}

proptest! {
    #[test]
    fn prop_settled_state_reflects_last_outcome(
        history in prop::collection::vec(users_action(), 0..20),
        outcome in users_action(),
    ) {
        let mut state = UsersState::default();
        for action in &history {
            UsersReducer.reduce(&mut state, action);
        }
        let before = state.clone();
        UsersReducer.reduce(&mut state, &outcome);

        match &outcome {
            UsersAction::FetchUsersSuccess(ids) => {
                prop_assert!(!state.loading);
                prop_assert_eq!(&state.users, ids);
                prop_assert!(state.error.is_empty());
            },
            UsersAction::FetchUsersFailure(error) => {
                prop_assert!(!state.loading);
                prop_assert!(state.users.is_empty());
                prop_assert_eq!(&state.error, error);
            },
            UsersAction::FetchUsersRequest => {
                prop_assert!(state.loading);
                prop_assert_eq!(&state.users, &before.users);
                prop_assert_eq!(&state.error, &before.error);
            },
            UsersAction::Unknown => {
                prop_assert_eq!(&state, &before);
            },
        }
    }
}
