//! Data models for the Mini Sentry console.
//!
//! This module contains the core data structures exchanged with the
//! error-tracking backend: projects, events, issue groups, releases,
//! deployments, alert rules, and the SDK ingestion payloads.

pub mod alert;
pub mod event;
pub mod group;
pub mod ingest;
pub mod project;
pub mod release;

pub use alert::AlertRule;
pub use event::{Event, EventsPage, EventValidationError, Level, ParseLevelError};
pub use group::{Group, GroupStatus};
pub use ingest::{IngestEvent, IngestValidationError, SessionPayload, SessionStatus};
pub use project::Project;
pub use release::{Deployment, HealthPoint, Release, ReleaseHealth};
