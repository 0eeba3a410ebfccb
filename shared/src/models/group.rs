//! Issue group data model.
//!
//! A group ("issue") is the backend's aggregation of similar events under
//! one fingerprint. The console only reads groups; grouping itself happens
//! server-side.

use crate::models::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Triage status of an issue group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    /// Open and counting new events.
    Unresolved,
    /// Marked fixed; regressions reopen it server-side.
    Resolved,
    /// Muted by a user.
    Ignored,
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::Resolved => write!(f, "resolved"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

impl Default for GroupStatus {
    fn default() -> Self {
        Self::Unresolved
    }
}

/// An aggregated issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Backend-assigned identifier.
    pub id: u64,

    /// The project this group belongs to.
    pub project_id: u64,

    /// Representative title, usually the message of the first event.
    pub title: String,

    /// Severity of the grouped events.
    #[serde(default)]
    pub level: Level,

    /// Number of events aggregated into this group.
    pub count: u64,

    /// Timestamp of the first event seen.
    pub first_seen: DateTime<Utc>,

    /// Timestamp of the most recent event seen.
    pub last_seen: DateTime<Utc>,

    /// Triage status.
    #[serde(default)]
    pub status: GroupStatus,
}
