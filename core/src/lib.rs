//! # Statehouse Core
//!
//! Core traits and types for the Statehouse store.
//!
//! This crate provides the fundamental abstractions of the unidirectional
//! state-management pattern. It holds no runtime: the [`Store`] that owns
//! state and runs dispatches lives in `statehouse-runtime`.
//!
//! ## Core Concepts
//!
//! - **State**: Plain owned data for a feature
//! - **Action**: A closed enum describing an intended state transition
//! - **Reducer**: Pure function `(State, Action) → State`
//! - **Thunk**: A deferred computation that receives the dispatch capability
//!   and may dispatch further actions as a side effect completes
//!
//! ## Architecture Principles
//!
//! - State transitions only happen through dispatch
//! - Reducers are deterministic and free of I/O
//! - Side effects live in thunks, never in reducers
//!
//! ## Example
//!
//! ```
//! use statehouse_core::reducer::Reducer;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct CakeState {
//!     number_of_cakes: u32,
//! }
//!
//! enum CakeAction {
//!     BuyCake,
//!     Unknown,
//! }
//!
//! struct CakeReducer;
//!
//! impl Reducer for CakeReducer {
//!     type State = CakeState;
//!     type Action = CakeAction;
//!
//!     fn reduce(&self, state: &mut CakeState, action: &CakeAction) {
//!         match action {
//!             CakeAction::BuyCake => state.number_of_cakes -= 1,
//!             CakeAction::Unknown => {},
//!         }
//!     }
//! }
//!
//! let mut state = CakeState { number_of_cakes: 10 };
//! CakeReducer.reduce(&mut state, &CakeAction::BuyCake);
//! assert_eq!(state.number_of_cakes, 9);
//! ```
//!
//! [`Store`]: https://docs.rs/statehouse-runtime

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};

/// Reducer composition utilities (`combine_reducers`, `scope_reducer`)
pub mod composition;

/// Deferred, side-effecting dispatch (thunks)
pub mod thunk;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action) → State`.
///
/// They hold all transition logic and are deterministic and testable
/// without a store.
pub mod reducer {
    use std::marker::PhantomData;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer owns
    /// - `Action`: The action type this reducer processes
    ///
    /// A reducer receives every action dispatched to its store. Actions it
    /// does not recognize must leave the state untouched.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for IceCreamReducer {
    ///     type State = IceCreamState;
    ///     type Action = ShopAction;
    ///
    ///     fn reduce(&self, state: &mut IceCreamState, action: &ShopAction) {
    ///         match action {
    ///             ShopAction::BuyIceCream => state.number_of_ice_creams -= 1,
    ///             _ => {},
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Reduce an action into the next state
        ///
        /// The state is updated in place. Implementations must not perform
        /// I/O and must produce the same result for the same
        /// `(state, action)` pair.
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action being dispatched
        fn reduce(&self, state: &mut Self::State, action: &Self::Action);
    }

    impl<R> Reducer for Box<R>
    where
        R: Reducer + ?Sized,
    {
        type State = R::State;
        type Action = R::Action;

        fn reduce(&self, state: &mut Self::State, action: &Self::Action) {
            (**self).reduce(state, action);
        }
    }

    /// Build a reducer from a plain function or closure.
    ///
    /// ```
    /// use statehouse_core::reducer::{from_fn, Reducer};
    ///
    /// let doubler = from_fn(|state: &mut i32, _action: &()| *state *= 2);
    /// let mut state = 3;
    /// doubler.reduce(&mut state, &());
    /// assert_eq!(state, 6);
    /// ```
    #[must_use]
    pub const fn from_fn<S, A, F>(f: F) -> FnReducer<S, A, F>
    where
        F: Fn(&mut S, &A),
    {
        FnReducer {
            f,
            _phantom: PhantomData,
        }
    }

    /// A reducer backed by a function. Created by [`from_fn`].
    pub struct FnReducer<S, A, F> {
        f: F,
        _phantom: PhantomData<fn(&mut S, &A)>,
    }

    impl<S, A, F> Reducer for FnReducer<S, A, F>
    where
        F: Fn(&mut S, &A),
    {
        type State = S;
        type Action = A;

        fn reduce(&self, state: &mut S, action: &A) {
            (self.f)(state, action);
        }
    }

    impl<S, A, F: Clone> Clone for FnReducer<S, A, F> {
        fn clone(&self) -> Self {
            Self {
                f: self.f.clone(),
                _phantom: PhantomData,
            }
        }
    }
}

pub use reducer::Reducer;
pub use thunk::{Dispatchable, Dispatcher, Thunk, ThunkApi};
