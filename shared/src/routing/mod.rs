//! Routing/filter state and its URL-fragment codec.
//!
//! The console keeps all navigation state (active tab, selected
//! project, search, filters, time window, pagination) in one
//! [`RoutingState`] owned by a [`RoutingStore`]. The state is
//! reconstructable from a URL fragment so a shared deep link reproduces
//! the exact view, and every mutation re-serializes the fragment with
//! replace (not push) semantics.

pub mod hash;
pub mod state;
pub mod store;

pub use hash::{encode_fragment, parse_fragment, FragmentParams};
pub use state::{RoutingState, Tab, ParseTabError, DEFAULT_EVENT_LIMIT, DEFAULT_INTERVAL};
pub use store::RoutingStore;
