//! # Cake Shop Example
//!
//! A cake and ice-cream counter demonstrating the Statehouse store.
//!
//! This example showcases:
//! - Two independent reducers, each owning one namespace of the state
//! - Reducer composition (`scope_reducer` + `combine_reducers`)
//! - Subscriptions and unsubscribing
//! - Actions with a `type` discriminant in their serialized form
//!
//! ## Architecture
//!
//! The shop is a **pure state machine** with NO side effects:
//! - Every action reaches both reducers
//! - Each reducer ignores actions that belong to the other namespace
//! - Unknown actions leave the whole state untouched
//!
//! ## Example
//!
//! ```
//! use cake_shop::{shop_store, ShopAction};
//!
//! let store = shop_store();
//!
//! store.dispatch_action(ShopAction::buy_cake());
//! store.dispatch_action(ShopAction::buy_ice_cream());
//!
//! let state = store.get_state();
//! assert_eq!(state.cake.number_of_cakes, 9);
//! assert_eq!(state.ice_cream.number_of_ice_creams, 19);
//! ```

use serde::{Deserialize, Serialize};
use statehouse_core::composition::{
    BoxedReducer, CombinedReducer, combine_reducers, scope_reducer,
};
use statehouse_core::reducer::Reducer;
use statehouse_runtime::Store;

/// Cakes on hand when the shop opens
pub const INITIAL_CAKES: i64 = 10;

/// Ice creams on hand when the shop opens
pub const INITIAL_ICE_CREAMS: i64 = 20;

/// Cake namespace of the shop state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CakeState {
    /// Cakes left
    pub number_of_cakes: i64,
}

impl Default for CakeState {
    fn default() -> Self {
        Self {
            number_of_cakes: INITIAL_CAKES,
        }
    }
}

/// Ice-cream namespace of the shop state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCreamState {
    /// Ice creams left
    pub number_of_ice_creams: i64,
}

impl Default for IceCreamState {
    fn default() -> Self {
        Self {
            number_of_ice_creams: INITIAL_ICE_CREAMS,
        }
    }
}

/// Root state: one field per namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopState {
    /// Owned by [`CakeReducer`]
    pub cake: CakeState,
    /// Owned by [`IceCreamReducer`]
    pub ice_cream: IceCreamState,
}

/// Shop actions
///
/// Serialized as a record with a `type` discriminant, e.g.
/// `{"type":"BUY_CAKE","info":"First redux action"}`. Any discriminant the
/// shop does not know parses to [`ShopAction::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShopAction {
    /// Sell one cake
    BuyCake {
        /// Free-form note carried along with the action
        #[serde(default, skip_serializing_if = "Option::is_none")]
        info: Option<String>,
    },
    /// Sell one ice cream
    BuyIceCream,
    /// A discriminant no shop reducer recognizes
    #[serde(other)]
    Unknown,
}

impl ShopAction {
    /// `BUY_CAKE` action creator
    #[must_use]
    pub fn buy_cake() -> Self {
        Self::BuyCake {
            info: Some("First redux action".to_string()),
        }
    }

    /// `BUY_ICE_CREAM` action creator
    #[must_use]
    pub const fn buy_ice_cream() -> Self {
        Self::BuyIceCream
    }

    /// Parse an action from its JSON record form
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON object with a string
    /// `type` field.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

/// Cake reducer
///
/// Owns [`CakeState`]; reacts to `BUY_CAKE` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CakeReducer;

impl Reducer for CakeReducer {
    type State = CakeState;
    type Action = ShopAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) {
        match action {
            ShopAction::BuyCake { .. } => {
                state.number_of_cakes -= 1;
            },
            ShopAction::BuyIceCream | ShopAction::Unknown => {},
        }
    }
}

/// Ice-cream reducer
///
/// Owns [`IceCreamState`]; reacts to `BUY_ICE_CREAM` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct IceCreamReducer;

impl Reducer for IceCreamReducer {
    type State = IceCreamState;
    type Action = ShopAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) {
        match action {
            ShopAction::BuyIceCream => {
                state.number_of_ice_creams -= 1;
            },
            ShopAction::BuyCake { .. } | ShopAction::Unknown => {},
        }
    }
}

/// The shop's root reducer type
pub type ShopReducer = CombinedReducer<ShopState, ShopAction>;

/// The shop store type
pub type ShopStore = Store<ShopState, ShopAction, (), ShopReducer>;

/// Build the root reducer: `cake` → [`CakeReducer`], `iceCream` → [`IceCreamReducer`]
#[must_use]
pub fn root_reducer() -> ShopReducer {
    let cake: BoxedReducer<ShopState, ShopAction> =
        Box::new(scope_reducer(CakeReducer, |s: &mut ShopState| &mut s.cake));
    let ice_cream: BoxedReducer<ShopState, ShopAction> =
        Box::new(scope_reducer(IceCreamReducer, |s: &mut ShopState| {
            &mut s.ice_cream
        }));

    combine_reducers(vec![cake, ice_cream])
}

/// Create a store holding the shop's initial state
#[must_use]
pub fn shop_store() -> ShopStore {
    Store::with_default_state(root_reducer(), ())
}

/// The shop's opening session: three cakes, then two ice creams
pub fn run_session(store: &ShopStore) {
    store.dispatch_action(ShopAction::buy_cake());
    store.dispatch_action(ShopAction::buy_cake());
    store.dispatch_action(ShopAction::buy_cake());
    store.dispatch_action(ShopAction::buy_ice_cream());
    store.dispatch_action(ShopAction::buy_ice_cream());
}

/// Render a state as a single JSON line for console output
#[must_use]
pub fn render_state<S: Serialize>(state: &S) -> String {
    serde_json::to_string(state).unwrap_or_else(|e| format!("<unrenderable state: {e}>"))
}
