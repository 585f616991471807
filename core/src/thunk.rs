//! Deferred, side-effecting dispatch.
//!
//! A [`Thunk`] is dispatched to a store in place of a plain action. The store
//! calls it with a [`ThunkApi`], which carries the dispatch capability, read
//! access to state, and the store environment (the "extra argument").
//!
//! The thunk body runs in two phases:
//!
//! 1. A synchronous prefix, run inside the dispatch call. Actions dispatched
//!    here are reduced before dispatch returns.
//! 2. The returned future, spawned by the store. Actions dispatched from it
//!    are reduced as the future makes progress.
//!
//! ```
//! use statehouse_core::thunk::Thunk;
//!
//! #[derive(Debug)]
//! enum UsersAction {
//!     Request,
//!     Success(Vec<u64>),
//! }
//!
//! let fetch: Thunk<(), UsersAction, ()> = Thunk::new(|api| {
//!     api.dispatch(UsersAction::Request);
//!     Box::pin(async move {
//!         api.dispatch(UsersAction::Success(vec![1, 2, 3]));
//!     })
//! });
//! # drop(fetch);
//! ```

use futures::future::BoxFuture;
use std::sync::Arc;

/// Dispatch capability handed to thunks.
///
/// Implemented by the runtime store. Dispatching through this trait is
/// identical to dispatching a plain action on the store itself.
pub trait Dispatcher<S, A>: Send + Sync {
    /// Reduce an action and notify subscribers
    fn dispatch(&self, action: A);

    /// Snapshot of the current state
    fn get_state(&self) -> S;
}

/// What a thunk sees of its store.
pub struct ThunkApi<S, A, E> {
    dispatcher: Arc<dyn Dispatcher<S, A>>,
    environment: Arc<E>,
}

impl<S, A, E> ThunkApi<S, A, E> {
    /// Create an API handle from a dispatcher and an environment
    #[must_use]
    pub fn new(dispatcher: Arc<dyn Dispatcher<S, A>>, environment: Arc<E>) -> Self {
        Self {
            dispatcher,
            environment,
        }
    }

    /// Dispatch a plain action to the store
    pub fn dispatch(&self, action: A) {
        self.dispatcher.dispatch(action);
    }

    /// Snapshot of the store state at the time of the call
    #[must_use]
    pub fn get_state(&self) -> S {
        self.dispatcher.get_state()
    }

    /// The store environment
    #[must_use]
    pub fn env(&self) -> &E {
        &self.environment
    }

    /// Shared handle to the store environment
    #[must_use]
    pub fn env_arc(&self) -> Arc<E> {
        Arc::clone(&self.environment)
    }
}

impl<S, A, E> Clone for ThunkApi<S, A, E> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            environment: Arc::clone(&self.environment),
        }
    }
}

impl<S, A, E> std::fmt::Debug for ThunkApi<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThunkApi").finish_non_exhaustive()
    }
}

type ThunkBody<S, A, E> = Box<dyn FnOnce(ThunkApi<S, A, E>) -> BoxFuture<'static, ()> + Send>;

/// A deferred action.
///
/// Wraps a closure that receives a [`ThunkApi`] and returns the future to run
/// once the synchronous prefix is done.
pub struct Thunk<S, A, E> {
    body: ThunkBody<S, A, E>,
}

impl<S, A, E> Thunk<S, A, E> {
    /// Create a thunk from its body
    #[must_use]
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(ThunkApi<S, A, E>) -> BoxFuture<'static, ()> + Send + 'static,
    {
        Self {
            body: Box::new(body),
        }
    }

    /// Run the synchronous prefix and hand back the deferred part
    ///
    /// Called by the store; tests may call it directly with a recording
    /// dispatcher.
    #[must_use]
    pub fn run(self, api: ThunkApi<S, A, E>) -> BoxFuture<'static, ()> {
        (self.body)(api)
    }
}

// Manual Debug implementation since closures don't implement Debug
impl<S, A, E> std::fmt::Debug for Thunk<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thunk(<thunk>)")
    }
}

/// A value accepted by the store's dispatch entry point.
pub enum Dispatchable<S, A, E> {
    /// A plain action, reduced immediately
    Action(A),

    /// A deferred action, run with the dispatch capability
    Thunk(Thunk<S, A, E>),
}

impl<S, A, E> Dispatchable<S, A, E> {
    /// Wrap a plain action
    #[must_use]
    pub const fn action(action: A) -> Self {
        Self::Action(action)
    }

    /// Whether this is a deferred action
    #[must_use]
    pub const fn is_thunk(&self) -> bool {
        matches!(self, Self::Thunk(_))
    }
}

impl<S, A, E> From<Thunk<S, A, E>> for Dispatchable<S, A, E> {
    fn from(thunk: Thunk<S, A, E>) -> Self {
        Self::Thunk(thunk)
    }
}

impl<S, A, E> std::fmt::Debug for Dispatchable<S, A, E>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Dispatchable::Action").field(action).finish(),
            Self::Thunk(thunk) => f.debug_tuple("Dispatchable::Thunk").field(thunk).finish(),
        }
    }
}
