//! # User Fetch Example
//!
//! Asynchronous dispatch with a thunk: load a list of users over HTTP and
//! track the request in the store.
//!
//! This example showcases:
//! - A thunk whose synchronous prefix marks the request as started
//! - A deferred part that awaits the network and dispatches exactly one of
//!   success or failure
//! - Injecting the HTTP client through the store environment
//!
//! ## State transitions
//!
//! | Action                | `loading` | `users`     | `error`      |
//! |-----------------------|-----------|-------------|--------------|
//! | `FETCH_USERS_REQUEST` | `true`    | kept        | kept         |
//! | `FETCH_USERS_SUCCESS` | `false`   | payload ids | `""`         |
//! | `FETCH_USERS_FAILURE` | `false`   | `[]`        | payload text |
//! | anything else         | kept      | kept        | kept         |

pub mod api;
pub mod config;

pub use api::{FetchError, HttpUserApi, User, UserApi};
pub use config::{ConfigError, UsersConfig};

use serde::{Deserialize, Serialize};
use statehouse_core::reducer::Reducer;
use statehouse_core::thunk::{Thunk, ThunkApi};
use statehouse_runtime::Store;

/// Users state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersState {
    /// A fetch is in flight
    pub loading: bool,
    /// Ids of the fetched users
    pub users: Vec<u64>,
    /// Description of the last failure, empty if none
    pub error: String,
}

/// Users actions
///
/// Serialized as `{"type": "...", "payload": ...}`; any unknown `type`
/// parses to [`UsersAction::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsersAction {
    /// A fetch started
    FetchUsersRequest,
    /// The fetch returned these user ids
    FetchUsersSuccess(Vec<u64>),
    /// The fetch failed with this description
    FetchUsersFailure(String),
    /// A discriminant the users reducer does not recognize
    #[serde(other)]
    Unknown,
}

impl UsersAction {
    /// `FETCH_USERS_REQUEST` action creator
    #[must_use]
    pub const fn fetch_users_request() -> Self {
        Self::FetchUsersRequest
    }

    /// `FETCH_USERS_SUCCESS` action creator
    #[must_use]
    pub const fn fetch_users_success(users: Vec<u64>) -> Self {
        Self::FetchUsersSuccess(users)
    }

    /// `FETCH_USERS_FAILURE` action creator
    #[must_use]
    pub fn fetch_users_failure(error: impl Into<String>) -> Self {
        Self::FetchUsersFailure(error.into())
    }

    /// Parse an action from its JSON record form
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON object with a string
    /// `type` field and a payload matching it.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

/// Reducer for [`UsersState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UsersReducer;

impl Reducer for UsersReducer {
    type State = UsersState;
    type Action = UsersAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) {
        match action {
            UsersAction::FetchUsersRequest => {
                state.loading = true;
            },
            UsersAction::FetchUsersSuccess(users) => {
                state.loading = false;
                state.users.clone_from(users);
                state.error.clear();
            },
            UsersAction::FetchUsersFailure(error) => {
                state.loading = false;
                state.users.clear();
                state.error.clone_from(error);
            },
            UsersAction::Unknown => {},
        }
    }
}

/// Store environment: where users come from
pub struct UsersEnvironment {
    api: Box<dyn UserApi>,
}

impl UsersEnvironment {
    /// Create an environment around a user source
    #[must_use]
    pub fn new(api: impl UserApi + 'static) -> Self {
        Self { api: Box::new(api) }
    }

    /// The user source
    #[must_use]
    pub fn api(&self) -> &dyn UserApi {
        self.api.as_ref()
    }
}

impl std::fmt::Debug for UsersEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsersEnvironment").finish_non_exhaustive()
    }
}

/// The users store type
pub type UsersStore = Store<UsersState, UsersAction, UsersEnvironment, UsersReducer>;

/// Thunk type accepted by [`UsersStore`]
pub type UsersThunk = Thunk<UsersState, UsersAction, UsersEnvironment>;

/// Create a store with an empty, idle state
#[must_use]
pub fn users_store(environment: UsersEnvironment) -> UsersStore {
    Store::with_default_state(UsersReducer, environment)
}

/// Fetch users thunk
///
/// Dispatches `FETCH_USERS_REQUEST` before the store's dispatch call returns,
/// then awaits the environment's [`UserApi`] and dispatches either
/// `FETCH_USERS_SUCCESS` with the user ids or `FETCH_USERS_FAILURE` with the
/// error description.
#[must_use]
pub fn fetch_users() -> UsersThunk {
    Thunk::new(|api: ThunkApi<UsersState, UsersAction, UsersEnvironment>| {
        api.dispatch(UsersAction::fetch_users_request());

        Box::pin(async move {
            match api.env().api().fetch_users().await {
                Ok(users) => {
                    let ids: Vec<u64> = users.iter().map(|user| user.id).collect();
                    tracing::info!(count = ids.len(), "Users fetched");
                    api.dispatch(UsersAction::fetch_users_success(ids));
                },
                Err(error) => {
                    tracing::warn!(error = %error, "Users fetch failed");
                    api.dispatch(UsersAction::fetch_users_failure(error.to_string()));
                },
            }
        })
    })
}
