//! Alert rule data model.
//!
//! Rules are evaluated server-side; the console lists them and toggles
//! snooze state.

use crate::models::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A threshold alert rule on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Backend-assigned identifier.
    pub id: u64,

    /// The project the rule watches.
    pub project_id: u64,

    /// Human-readable rule name.
    pub name: String,

    /// Minimum level of events the rule counts.
    #[serde(default)]
    pub level: Level,

    /// Number of matching events within the window that fires the alert.
    pub threshold: u64,

    /// Evaluation window in minutes.
    pub window_minutes: u32,

    /// While set and in the future, the rule does not fire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snoozed_until: Option<DateTime<Utc>>,
}

impl AlertRule {
    /// Returns true if the rule is currently snoozed relative to `now`.
    #[must_use]
    pub fn is_snoozed(&self, now: DateTime<Utc>) -> bool {
        self.snoozed_until.is_some_and(|until| until > now)
    }
}
