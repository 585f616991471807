//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on one namespace of a larger state
//!
//! Used together they build a namespaced root reducer: each sub-reducer owns
//! one field of the root state and sees every dispatched action.
//!
//! # Examples
//!
//! ```
//! use statehouse_core::Reducer;
//! use statehouse_core::composition::{combine_reducers, scope_reducer};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct CakeState { number_of_cakes: u32 }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct IceCreamState { number_of_ice_creams: u32 }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct RootState { cake: CakeState, ice_cream: IceCreamState }
//!
//! enum ShopAction { BuyCake, BuyIceCream }
//!
//! struct CakeReducer;
//! struct IceCreamReducer;
//!
//! impl Reducer for CakeReducer {
//!     type State = CakeState;
//!     type Action = ShopAction;
//!
//!     fn reduce(&self, state: &mut CakeState, action: &ShopAction) {
//!         if let ShopAction::BuyCake = action {
//!             state.number_of_cakes -= 1;
//!         }
//!     }
//! }
//!
//! impl Reducer for IceCreamReducer {
//!     type State = IceCreamState;
//!     type Action = ShopAction;
//!
//!     fn reduce(&self, state: &mut IceCreamState, action: &ShopAction) {
//!         if let ShopAction::BuyIceCream = action {
//!             state.number_of_ice_creams -= 1;
//!         }
//!     }
//! }
//!
//! let root = combine_reducers(vec![
//!     Box::new(scope_reducer(CakeReducer, |s: &mut RootState| &mut s.cake)),
//!     Box::new(scope_reducer(IceCreamReducer, |s: &mut RootState| &mut s.ice_cream)),
//! ]);
//!
//! let mut state = RootState {
//!     cake: CakeState { number_of_cakes: 10 },
//!     ice_cream: IceCreamState { number_of_ice_creams: 20 },
//! };
//! root.reduce(&mut state, &ShopAction::BuyCake);
//! assert_eq!(state.cake.number_of_cakes, 9);
//! assert_eq!(state.ice_cream.number_of_ice_creams, 20);
//! ```

use crate::reducer::Reducer;

/// A boxed reducer that can be shared across threads.
pub type BoxedReducer<S, A> = Box<dyn Reducer<State = S, Action = A> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, in the order given, and every reducer
/// receives every action. Reducers that do not recognize an action leave
/// their part of the state untouched.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type
///
/// # Examples
///
/// ```
/// use statehouse_core::reducer::from_fn;
/// use statehouse_core::composition::combine_reducers;
/// use statehouse_core::Reducer;
///
/// #[derive(Default)]
/// struct AppState {
///     counter: i32,
///     logged: bool,
/// }
///
/// enum AppAction {
///     Increment,
///     Log,
/// }
///
/// let combined = combine_reducers(vec![
///     Box::new(from_fn(|state: &mut AppState, action: &AppAction| {
///         if matches!(action, AppAction::Increment) {
///             state.counter += 1;
///         }
///     })),
///     Box::new(from_fn(|state: &mut AppState, action: &AppAction| {
///         if matches!(action, AppAction::Log) {
///             state.logged = true;
///         }
///     })),
/// ]);
///
/// let mut state = AppState::default();
/// combined.reduce(&mut state, &AppAction::Increment);
/// assert_eq!(state.counter, 1);
/// assert!(!state.logged);
/// ```
#[must_use]
pub fn combine_reducers<S, A>(reducers: Vec<BoxedReducer<S, A>>) -> CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    reducers: Vec<BoxedReducer<S, A>>,
}

impl<S, A> CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    /// Number of reducers in the combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether the combination holds no reducers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A> Reducer for CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) {
        for reducer in &self.reducers {
            reducer.reduce(state, action);
        }
    }
}

/// Scopes a reducer to operate on one namespace of a larger state.
///
/// The `lens` selects the slice of the parent state owned by the reducer.
/// The reducer never sees the rest of the parent state.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `SubS`: The namespaced child state type
/// - `R`: The child reducer
///
/// # Examples
///
/// ```
/// use statehouse_core::reducer::from_fn;
/// use statehouse_core::composition::scope_reducer;
/// use statehouse_core::Reducer;
///
/// #[derive(Default)]
/// struct AppState {
///     counter: i32,
///     other_data: String,
/// }
///
/// let counter = from_fn(|count: &mut i32, delta: &i32| *count += delta);
/// let scoped = scope_reducer(counter, |app: &mut AppState| &mut app.counter);
///
/// let mut state = AppState::default();
/// scoped.reduce(&mut state, &5);
/// assert_eq!(state.counter, 5);
/// assert!(state.other_data.is_empty());
/// ```
pub const fn scope_reducer<S, SubS, R>(
    reducer: R,
    lens: fn(&mut S) -> &mut SubS,
) -> ScopedReducer<S, SubS, R>
where
    R: Reducer<State = SubS>,
{
    ScopedReducer { reducer, lens }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, R>
where
    R: Reducer<State = SubS>,
{
    reducer: R,
    lens: fn(&mut S) -> &mut SubS,
}

impl<S, SubS, R> Reducer for ScopedReducer<S, SubS, R>
where
    R: Reducer<State = SubS>,
{
    type State = S;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) {
        self.reducer.reduce((self.lens)(state), action);
    }
}
