//! # Statehouse Runtime
//!
//! Runtime implementation for the Statehouse store.
//!
//! This crate provides the [`Store`]: the single owner of application state.
//!
//! ## Core Components
//!
//! - **Store**: Holds state, runs dispatches through the reducer, notifies listeners
//! - **Subscription**: Handle returned by `subscribe`, used to unsubscribe
//! - **Thunk execution**: Runs deferred actions with the dispatch capability
//!
//! ## Example
//!
//! ```ignore
//! use statehouse_runtime::Store;
//!
//! let store = Store::with_default_state(root_reducer(), ());
//!
//! let subscription = store.subscribe_state(|state| println!("Updated State: {state:?}"));
//! store.dispatch_action(ShopAction::buy_cake());
//! subscription.unsubscribe();
//!
//! let cakes = store.state(|s| s.cake.number_of_cakes);
//! ```

use statehouse_core::{
    reducer::Reducer,
    thunk::{Dispatchable, Dispatcher, Thunk, ThunkApi},
};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Plain dispatch never fails. Errors only come from running thunks.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// A thunk was dispatched outside of a tokio runtime
        ///
        /// The thunk body is not run at all in this case.
        #[error("Thunk dispatched outside of a tokio runtime: {0}")]
        NoRuntime(#[from] tokio::runtime::TryCurrentError),

        /// The deferred part of a thunk did not complete
        ///
        /// This typically means the thunk's future panicked.
        #[error("Thunk task failed: {0}")]
        TaskFailed(#[from] tokio::task::JoinError),
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use statehouse_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_broadcast_capacity(64);
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the action broadcast channel (see `Store::subscribe_actions`)
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize) -> Self {
        Self { broadcast_capacity }
    }

    /// Set the action broadcast capacity
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
        }
    }
}

/// Handle to the deferred part of a dispatched thunk
///
/// Returned by [`Store::dispatch_thunk()`]. Dropping the handle does not
/// cancel the task.
///
/// # Example
///
/// ```ignore
/// let handle = store.dispatch_thunk(fetch_users())?;
/// handle.wait().await?;
/// // The success or failure action has been reduced
/// ```
#[derive(Debug)]
pub struct TaskHandle {
    join: tokio::task::JoinHandle<()>,
}

impl TaskHandle {
    /// Whether the deferred part has settled
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the deferred part to settle
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskFailed`] if the thunk's future panicked.
    pub async fn wait(self) -> Result<(), StoreError> {
        self.join.await.map_err(|error| {
            metrics::StoreMetrics::record_thunk_failed();
            tracing::warn!(error = %error, "Thunk task failed");
            StoreError::TaskFailed(error)
        })
    }
}

/// Outcome of [`Store::dispatch()`]
#[derive(Debug)]
pub enum Dispatched<A> {
    /// A plain action was reduced; the action is handed back for chaining
    Action(A),

    /// A thunk was started; its deferred part runs on the returned handle
    Task(TaskHandle),
}

impl<A> Dispatched<A> {
    /// The reduced action, if a plain action was dispatched
    #[must_use]
    pub fn into_action(self) -> Option<A> {
        match self {
            Self::Action(action) => Some(action),
            Self::Task(_) => None,
        }
    }

    /// The task handle, if a thunk was dispatched
    #[must_use]
    pub fn into_task(self) -> Option<TaskHandle> {
        match self {
            Self::Action(_) => None,
            Self::Task(handle) => Some(handle),
        }
    }
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Ordered listener registry shared between a store and its subscriptions.
#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Handle returned by [`Store::subscribe()`]
///
/// Dropping a subscription does not unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe).
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Remove this listener from its store
    ///
    /// Idempotent: later calls do nothing and never remove another listener.
    /// Returns `true` only for the call that actually removed the listener.
    pub fn unsubscribe(&self) -> bool {
        let Some(listeners) = self.listeners.upgrade() else {
            return false;
        };

        let mut guard = listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = guard.entries.len();
        guard.entries.retain(|(id, _)| *id != self.id);
        let removed = guard.entries.len() != before;

        if removed {
            metrics::StoreMetrics::record_listeners(guard.entries.len());
            tracing::trace!(listener = self.id, "Listener unsubscribed");
        }
        removed
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Store module - The runtime for reducers
///
/// Store runtime for coordinating reducer execution, listeners and thunks.
pub mod store {
    use super::{
        Arc, Dispatchable, Dispatched, Dispatcher, Listener, Listeners, Mutex, PoisonError,
        Reducer, RwLock, StoreConfig, StoreError, Subscription, TaskHandle, Thunk, ThunkApi,
    };
    use crate::metrics::StoreMetrics;
    use tokio::sync::broadcast;

    /// Shared store internals
    struct StoreInner<S, A, E, R> {
        state: RwLock<S>,
        reducer: R,
        environment: Arc<E>,
        listeners: Arc<Mutex<Listeners>>,
        /// Every reduced action, for observers that want actions rather than
        /// state snapshots.
        action_broadcast: broadcast::Sender<A>,
    }

    /// The Store - single owner of application state
    ///
    /// The Store manages:
    /// 1. State (behind a single-writer `RwLock`)
    /// 2. Reducer (transition logic)
    /// 3. Environment (passed to thunks)
    /// 4. Listeners (notified after every dispatch, in registration order)
    ///
    /// Cloning a store yields another handle to the same state.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(UsersState::default(), UsersReducer, environment);
    ///
    /// store.dispatch_action(UsersAction::FetchUsersRequest);
    /// assert!(store.state(|s| s.loading));
    /// ```
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        inner: Arc<StoreInner<S, A, E, R>>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A>,
        S: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
            f.debug_struct("Store")
                .field("state", &*state)
                .finish_non_exhaustive()
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a store whose initial state is `S::default()`
        #[must_use]
        pub fn with_default_state(reducer: R, environment: E) -> Self
        where
            S: Default,
        {
            Self::new(S::default(), reducer, environment)
        }

        /// Create a new store with a custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                inner: Arc::new(StoreInner {
                    state: RwLock::new(initial_state),
                    reducer,
                    environment: Arc::new(environment),
                    listeners: Arc::new(Mutex::new(Listeners::default())),
                    action_broadcast,
                }),
            }
        }

        /// Read current state via a closure
        ///
        /// The read lock is held only for the duration of the closure:
        ///
        /// ```ignore
        /// let cakes = store.state(|s| s.cake.number_of_cakes);
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T, {
            let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
            f(&state)
        }

        /// Snapshot of the current state
        #[must_use]
        pub fn get_state(&self) -> S {
            self.state(Clone::clone)
        }

        /// The environment handed to thunks
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.inner.environment
        }

        /// Reduce a plain action, then notify listeners
        ///
        /// The reducer runs under the write lock against a copy of the state,
        /// which replaces the current state only once the reducer returns. A
        /// panicking reducer leaves the state untouched. Listeners run after the lock is
        /// released, synchronously and in registration order; they may read
        /// state or dispatch again.
        ///
        /// Returns the dispatched action.
        #[tracing::instrument(skip(self, action), name = "store_dispatch")]
        pub fn dispatch_action(&self, action: A) -> A {
            {
                let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
                tracing::trace!("Acquired write lock on state");

                // A panicking reducer leaves the held state untouched
                let start = std::time::Instant::now();
                let mut next = state.clone();
                self.inner.reducer.reduce(&mut next, &action);
                *state = next;
                StoreMetrics::record_dispatch(start.elapsed());

                // Stream order is reduction order
                if self.inner.action_broadcast.receiver_count() > 0 {
                    let _ = self.inner.action_broadcast.send(action.clone());
                }
            }
            tracing::debug!("Action reduced");

            self.notify_listeners();
            action
        }

        /// Dispatch a thunk
        ///
        /// The thunk's synchronous prefix runs before this returns; its
        /// deferred part is spawned on the current tokio runtime.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::NoRuntime`] when called outside a tokio
        /// runtime. The thunk is not run in that case.
        #[tracing::instrument(skip(self, thunk), name = "store_dispatch_thunk")]
        pub fn dispatch_thunk(&self, thunk: Thunk<S, A, E>) -> Result<TaskHandle, StoreError> {
            let runtime = tokio::runtime::Handle::try_current()?;

            let dispatcher: Arc<dyn Dispatcher<S, A>> = Arc::new(self.clone());
            let api = ThunkApi::new(dispatcher, Arc::clone(&self.inner.environment));

            let deferred = thunk.run(api);
            StoreMetrics::record_thunk_spawned();
            tracing::debug!("Spawning deferred part of thunk");

            Ok(TaskHandle {
                join: runtime.spawn(deferred),
            })
        }

        /// Dispatch either a plain action or a thunk
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::NoRuntime`] for a thunk dispatched outside a
        /// tokio runtime. Plain actions never fail.
        pub fn dispatch(&self, dispatchable: Dispatchable<S, A, E>) -> Result<Dispatched<A>, StoreError> {
            match dispatchable {
                Dispatchable::Action(action) => Ok(Dispatched::Action(self.dispatch_action(action))),
                Dispatchable::Thunk(thunk) => self.dispatch_thunk(thunk).map(Dispatched::Task),
            }
        }

        /// Register a listener called after every dispatch
        ///
        /// Listeners take no arguments; capture a store handle to read state,
        /// or use [`subscribe_state`](Self::subscribe_state).
        pub fn subscribe<F>(&self, listener: F) -> Subscription
        where
            F: Fn() + Send + Sync + 'static,
        {
            let mut guard = self.inner.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = guard.next_id;
            guard.next_id += 1;
            guard.entries.push((id, Arc::new(listener)));
            StoreMetrics::record_listeners(guard.entries.len());
            tracing::trace!(listener = id, "Listener subscribed");

            Subscription {
                id,
                listeners: Arc::downgrade(&self.inner.listeners),
            }
        }

        /// Register a listener that receives a snapshot of the new state
        ///
        /// The listener does not keep the store alive.
        pub fn subscribe_state<F>(&self, listener: F) -> Subscription
        where
            F: Fn(&S) + Send + Sync + 'static,
        {
            let inner = Arc::downgrade(&self.inner);
            self.subscribe(move || {
                if let Some(inner) = inner.upgrade() {
                    let snapshot = inner.state.read().unwrap_or_else(PoisonError::into_inner).clone();
                    listener(&snapshot);
                }
            })
        }

        /// Number of active listeners
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .len()
        }

        /// Subscribe to every action reduced by this store
        ///
        /// # Notes
        ///
        /// - Only actions dispatched after subscribing are received
        /// - If the receiver lags, it skips old actions and receives
        ///   `RecvError::Lagged`
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.inner.action_broadcast.subscribe()
        }

        fn notify_listeners(&self) {
            // Snapshot so listeners can (un)subscribe while being notified
            let listeners: Vec<Listener> = {
                let guard = self.inner.listeners.lock().unwrap_or_else(PoisonError::into_inner);
                guard.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
            };

            for listener in &listeners {
                listener();
            }

            if !listeners.is_empty() {
                tracing::trace!(count = listeners.len(), "Listeners notified");
                StoreMetrics::record_notifications(listeners.len());
            }
        }
    }

    impl<S, A, E, R> Dispatcher<S, A> for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        fn dispatch(&self, action: A) {
            self.dispatch_action(action);
        }

        fn get_state(&self) -> S {
            Self::get_state(self)
        }
    }
}

pub use store::Store;
