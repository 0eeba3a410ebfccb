//! SDK ingestion payloads.
//!
//! These are the bodies the capture SDK posts to the token ingestion
//! endpoints (`/api/events/ingest/token/:token` and
//! `/api/sessions/ingest/token/:token`).

use crate::models::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// An event as submitted by the SDK.
///
/// # Example
///
/// ```
/// use shared::models::{IngestEvent, Level};
///
/// let event = IngestEvent::new(Level::Fatal, "panicked at 'oh no'")
///     .with_stack("src/main.rs:42")
///     .with_release("1.0.0");
/// assert!(event.validate_payload().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngestEvent {
    /// Severity level.
    #[serde(default)]
    pub level: Level,

    /// The error message.
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,

    /// Optional stack trace or source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    /// Release version the SDK was configured with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    /// Environment name the SDK was configured with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Application name the SDK was configured with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    /// When the event was captured.
    pub timestamp: DateTime<Utc>,
}

/// Errors that can occur during ingestion payload validation.
#[derive(Debug, Error)]
pub enum IngestValidationError {
    /// The message is empty.
    #[error("Ingest event message cannot be empty")]
    EmptyMessage,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl IngestEvent {
    /// Creates a new ingestion event with the current timestamp.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            stack: None,
            release: None,
            environment: None,
            app: None,
            timestamp: Utc::now(),
        }
    }

    /// Attaches a stack trace or source location.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Sets the release version.
    #[must_use]
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    /// Sets the environment name.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Sets the application name.
    #[must_use]
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Validates the payload.
    ///
    /// # Errors
    ///
    /// Returns an `IngestValidationError` if the message is empty.
    pub fn validate_payload(&self) -> Result<(), IngestValidationError> {
        if self.message.is_empty() {
            return Err(IngestValidationError::EmptyMessage);
        }
        self.validate()?;
        Ok(())
    }
}

/// Terminal status of an SDK session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The session ended normally.
    Ok,
    /// The session ended in a crash.
    Crashed,
}

/// A session report as submitted by the SDK.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    /// How the session ended.
    pub status: SessionStatus,

    /// Release version the SDK was configured with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    /// Environment name the SDK was configured with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Application name the SDK was configured with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}
