//! Release, release health, and deployment data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tagged release of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Backend-assigned identifier.
    pub id: u64,

    /// Version string, e.g. "1.4.2" or a commit sha.
    pub version: String,

    /// The project this release belongs to.
    pub project_id: u64,

    /// When the release was created.
    pub created_at: DateTime<Utc>,
}

/// Aggregated session health for one release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseHealth {
    /// The release version this summary covers.
    pub version: String,

    /// Fraction of sessions that ended without a crash, 0.0 to 1.0.
    /// Absent when no sessions were recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash_free_rate: Option<f64>,

    /// Total sessions recorded.
    pub sessions: u64,

    /// Sessions that ended in a crash.
    pub crashed: u64,
}

/// One bucket of the release-health time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPoint {
    /// Start of the bucket.
    pub bucket: DateTime<Utc>,

    /// Sessions started in this bucket.
    pub sessions: u64,

    /// Sessions crashed in this bucket.
    pub crashed: u64,
}

/// A recorded deployment of a release to an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Backend-assigned identifier.
    pub id: u64,

    /// Version of the deployed release.
    pub release_version: String,

    /// Target environment, e.g. "production".
    pub environment: String,

    /// When the deployment happened.
    pub deployed_at: DateTime<Utc>,
}
