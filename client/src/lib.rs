//! Mini Sentry Client Library
//!
//! The HTTP side of the Mini Sentry console: a typed REST client for
//! the error-tracking backend, a concurrent project-data aggregator
//! that turns a routing state into one consistent snapshot, and the
//! capture SDK (panic hook plus manual capture/session APIs).
//!
//! # Modules
//!
//! - [`api`] - REST API client wrapper with uniform JSON/error handling
//! - [`aggregator`] - Concurrent fan-out producing [`aggregator::ProjectDataSnapshot`]
//! - [`sdk`] - Capture SDK with a global panic hook
//! - [`error`] - The [`error::ApiError`] taxonomy

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregator;
pub mod api;
pub mod error;
pub mod sdk;

pub use aggregator::{fetch_snapshot, ProjectDataSnapshot, SnapshotCell};
pub use api::{ApiClient, EventQuery};
pub use error::ApiError;
pub use sdk::{Sdk, SdkConfig};
