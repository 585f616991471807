//! # Statehouse Testing
//!
//! Testing utilities and helpers for the Statehouse store.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then assertions for reducers
//! - [`StateRecorder`]: A listener that records every state a store publishes
//!
//! ## Example
//!
//! ```ignore
//! use statehouse_testing::StateRecorder;
//! use statehouse_runtime::Store;
//!
//! #[test]
//! fn test_cake_shop() {
//!     let store = Store::with_default_state(root_reducer(), ());
//!     let recorder = StateRecorder::attach(&store);
//!
//!     store.dispatch_action(ShopAction::buy_cake());
//!
//!     assert_eq!(recorder.len(), 1);
//!     assert_eq!(recorder.last().map(|s| s.cake.number_of_cakes), Some(9));
//! }
//! ```


pub use reducer_test::ReducerTest;

/// Listener helpers for store tests
pub mod recording {
    use statehouse_core::reducer::Reducer;
    use statehouse_runtime::{Store, Subscription};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Records a snapshot of the store state after every dispatch.
    ///
    /// # Example
    ///
    /// ```
    /// use statehouse_core::reducer::from_fn;
    /// use statehouse_runtime::Store;
    /// use statehouse_testing::StateRecorder;
    ///
    /// let store = Store::new(0_i32, from_fn(|n: &mut i32, by: &i32| *n += by), ());
    /// let recorder = StateRecorder::attach(&store);
    ///
    /// store.dispatch_action(2);
    /// store.dispatch_action(3);
    ///
    /// assert_eq!(recorder.snapshots(), vec![2, 5]);
    /// ```
    pub struct StateRecorder<S> {
        snapshots: Arc<Mutex<Vec<S>>>,
        subscription: Subscription,
    }

    impl<S> StateRecorder<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        /// Subscribe a recorder to a store
        #[must_use]
        pub fn attach<A, E, R>(store: &Store<S, A, E, R>) -> Self
        where
            R: Reducer<State = S, Action = A> + Send + Sync + 'static,
            A: Clone + Send + 'static,
            E: Send + Sync + 'static,
        {
            let snapshots = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&snapshots);
            let subscription = store.subscribe_state(move |state: &S| {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(state.clone());
            });

            Self {
                snapshots,
                subscription,
            }
        }

        /// All recorded states, oldest first
        #[must_use]
        pub fn snapshots(&self) -> Vec<S> {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Most recent recorded state
        #[must_use]
        pub fn last(&self) -> Option<S> {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last()
                .cloned()
        }

        /// Number of notifications received
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether no notification was received yet
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Stop recording; returns `false` if already detached
        pub fn detach(&self) -> bool {
            self.subscription.unsubscribe()
        }
    }
}

// Re-export commonly used items
pub use recording::StateRecorder;
