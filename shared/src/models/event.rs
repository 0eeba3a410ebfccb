//! Event data model.
//!
//! Defines the `Event` structure returned by the events endpoint and the
//! severity `Level` shared by events, groups, and alert rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Event severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Diagnostic detail.
    Debug,
    /// Informational messages.
    Info,
    /// Warning conditions.
    Warning,
    /// Error conditions.
    Error,
    /// Crash-level conditions.
    Fatal,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Error
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown level: '{0}'. Expected debug, info, warning, error, or fatal")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

/// A single captured error event.
///
/// # Example
///
/// ```
/// use shared::models::{Event, Level};
///
/// let event = Event::new(1, Level::Error, "TypeError: x is undefined");
/// assert!(event.validate_event().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Event {
    /// Backend-assigned identifier.
    pub id: u64,

    /// The project this event belongs to.
    pub project_id: u64,

    /// Severity level.
    #[serde(default)]
    pub level: Level,

    /// The error message or description.
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,

    /// Best-effort source location (function or file) that raised the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culprit: Option<String>,

    /// Release version active when the event was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,

    /// Environment name (e.g. "production").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Additional key-value attributes.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Errors that can occur during event validation.
#[derive(Debug, Error)]
pub enum EventValidationError {
    /// The event message is empty.
    #[error("Event message cannot be empty")]
    EmptyMessage,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Event {
    /// Creates a new event with the current timestamp.
    #[must_use]
    pub fn new(project_id: u64, level: Level, message: impl Into<String>) -> Self {
        Self {
            id: 0,
            project_id,
            level,
            message: message.into(),
            culprit: None,
            release: None,
            environment: None,
            timestamp: Utc::now(),
            attributes: HashMap::new(),
        }
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

    /// Adds a key-value attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }

    /// Validates the event.
    ///
    /// # Errors
    ///
    /// Returns an `EventValidationError` if the message is empty.
    pub fn validate_event(&self) -> Result<(), EventValidationError> {
        if self.message.is_empty() {
            return Err(EventValidationError::EmptyMessage);
        }
        self.validate()?;
        Ok(())
    }
}

/// Normalized page of events with the backend's total match count.
///
/// The events endpoint may answer with a bare array (legacy) or with a
/// `{results, count}` envelope; both are normalized into this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsPage {
    /// The events on this page.
    pub events: Vec<Event>,

    /// Total number of matching events, before pagination.
    pub total: usize,
}

impl EventsPage {
    /// Normalizes a raw events response body into a page.
    ///
    /// A bare array yields `total = events.len()`; an envelope carries
    /// its own `count`. Anything else yields an empty page.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            results: Vec<Event>,
            count: usize,
        }

        if value.is_array() {
            let events: Vec<Event> = serde_json::from_value(value).unwrap_or_default();
            let total = events.len();
            return Self { events, total };
        }

        match serde_json::from_value::<Envelope>(value) {
            Ok(envelope) => Self {
                events: envelope.results,
                total: envelope.count,
            },
            Err(_) => Self::default(),
        }
    }
}
