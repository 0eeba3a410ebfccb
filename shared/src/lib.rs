//! Mini Sentry Shared Library
//!
//! This crate contains the domain types and pure logic shared across
//! the Mini Sentry console: data models for the REST surface, the
//! search token lexer, timestamp normalization, and the routing/filter
//! state machine with its URL-fragment codec.
//!
//! # Modules
//!
//! - [`models`] - Data models for projects, events, groups, releases, and alert rules
//! - [`search`] - Lexical scanner for free-text search queries
//! - [`time`] - Timestamp normalization and time-window resolution
//! - [`routing`] - Routing/filter state store and URL-fragment codec
//! - [`storage`] - Persisted last-selected-project storage
//!
//! # Example
//!
//! ```
//! use shared::routing::{RoutingState, encode_fragment, parse_fragment};
//!
//! let state = RoutingState::default();
//! let fragment = encode_fragment(&state);
//! let params = parse_fragment(&fragment);
//! assert!(params.view.is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod models;
pub mod routing;
pub mod search;
pub mod storage;
pub mod time;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
