//! The routing/filter state record.

use crate::models::Level;
use crate::time::{CustomRange, RangeUnit, TimeSelection};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Default page size for the events list.
pub const DEFAULT_EVENT_LIMIT: usize = 50;

/// Default bucket interval for the health time series.
pub const DEFAULT_INTERVAL: &str = "1h";

/// The dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Consolidated project overview.
    Overview,
    /// Aggregated issue groups.
    Issues,
    /// Raw event stream; the only view that paginates.
    Events,
    /// Releases, health, and deployments.
    Releases,
    /// Alert rules.
    Alerts,
    /// Project settings.
    Settings,
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overview => write!(f, "overview"),
            Self::Issues => write!(f, "issues"),
            Self::Events => write!(f, "events"),
            Self::Releases => write!(f, "releases"),
            Self::Alerts => write!(f, "alerts"),
            Self::Settings => write!(f, "settings"),
        }
    }
}

impl Default for Tab {
    fn default() -> Self {
        Self::Overview
    }
}

/// Error returned when parsing an unknown tab name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown tab: '{0}'")]
pub struct ParseTabError(pub String);

impl FromStr for Tab {
    type Err = ParseTabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Self::Overview),
            "issues" => Ok(Self::Issues),
            "events" => Ok(Self::Events),
            "releases" => Ok(Self::Releases),
            "alerts" => Ok(Self::Alerts),
            "settings" => Ok(Self::Settings),
            other => Err(ParseTabError(other.to_string())),
        }
    }
}

/// The single source of truth for UI-navigation and filter state.
///
/// Owned exclusively by the routing store; everything else reads it by
/// reference and requests changes through the store's setters.
///
/// Exactly one of `time_selection`, `custom_range`, or `range` is
/// authoritative for the effective query window at any moment; setting
/// one clears the competing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingState {
    /// The active dashboard tab.
    pub active_tab: Tab,

    /// Slug of the selected project, if any.
    pub selected_project: Option<String>,

    /// Free-text search query.
    pub search: String,

    /// Level filter.
    pub filter_level: Option<Level>,

    /// Environment filter.
    pub filter_env: Option<String>,

    /// Release filter.
    pub filter_release: Option<String>,

    /// Explicit absolute time window; overrides `range`.
    pub time_selection: Option<TimeSelection>,

    /// User-typed relative window; mutually exclusive with
    /// `time_selection`.
    pub custom_range: Option<CustomRange>,

    /// Fallback relative window.
    pub range: CustomRange,

    /// Bucket interval for the health series, e.g. "1h".
    pub interval: String,

    /// Page size for the events list.
    pub event_limit: usize,

    /// Page offset for the events list.
    pub event_offset: usize,

    /// True when at least one recognized URL parameter was present at
    /// hydration. An empty fragment does not count as restoration.
    pub initialized_from_url: bool,
}

impl RoutingState {
    /// The fixed default relative window (24 hours).
    #[must_use]
    pub fn default_range() -> CustomRange {
        CustomRange {
            value: 24,
            unit: RangeUnit::Hours,
            label: "24h".to_string(),
        }
    }
}

impl Default for RoutingState {
    fn default() -> Self {
        Self {
            active_tab: Tab::default(),
            selected_project: None,
            search: String::new(),
            filter_level: None,
            filter_env: None,
            filter_release: None,
            time_selection: None,
            custom_range: None,
            range: Self::default_range(),
            interval: DEFAULT_INTERVAL.to_string(),
            event_limit: DEFAULT_EVENT_LIMIT,
            event_offset: 0,
            initialized_from_url: false,
        }
    }
}
