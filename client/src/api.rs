//! REST API client wrapper.
//!
//! A thin layer over one `reqwest::Client` that enforces JSON
//! responses and uniform error construction: every non-2xx answer
//! becomes [`ApiError::Http`] carrying the status and the raw body
//! text, whatever its content type.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::models::{
    AlertRule, Deployment, Event, EventsPage, Group, HealthPoint, IngestEvent, Project, Release,
    ReleaseHealth, SessionPayload,
};
use shared::time::Window;

/// Query parameters for the events endpoint.
///
/// Pagination parameters are attached only when the caller asks; the
/// events tab is the only paginating view.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Filter by level name.
    pub level: Option<String>,

    /// Filter by environment.
    pub environment: Option<String>,

    /// Filter by release version.
    pub release: Option<String>,

    /// Free-text search query.
    pub q: Option<String>,

    /// Window start (inclusive).
    pub from: Option<DateTime<Utc>>,

    /// Window end (exclusive).
    pub to: Option<DateTime<Utc>>,

    /// Page size.
    pub limit: Option<usize>,

    /// Page offset.
    pub offset: Option<usize>,
}

impl EventQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level filter.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Sets the environment filter.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Sets the release filter.
    #[must_use]
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    /// Sets the free-text query.
    #[must_use]
    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Sets the time window.
    #[must_use]
    pub fn with_window(mut self, window: Window) -> Self {
        self.from = Some(window.from);
        self.to = Some(window.to);
        self
    }

    /// Sets the pagination parameters.
    #[must_use]
    pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    fn params(&self, project: &str) -> Vec<(String, String)> {
        let mut params = vec![("project".to_string(), project.to_string())];
        if let Some(level) = &self.level {
            params.push(("level".to_string(), level.clone()));
        }
        if let Some(environment) = &self.environment {
            params.push(("environment".to_string(), environment.clone()));
        }
        if let Some(release) = &self.release {
            params.push(("release".to_string(), release.clone()));
        }
        if let Some(q) = &self.q {
            params.push(("q".to_string(), q.clone()));
        }
        if let Some(from) = self.from {
            params.push(("from".to_string(), from.to_rfc3339()));
        }
        if let Some(to) = self.to {
            params.push(("to".to_string(), to.to_rfc3339()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }
}

/// The typed REST client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given backend base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// The backend base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Lists all projects.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` on transport failure, non-2xx response, or
    /// a body that is not the expected JSON shape. The same applies to
    /// every endpoint method below.
    pub async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json("/api/projects", &[]).await
    }

    /// Creates a project.
    pub async fn create_project(&self, slug: &str, name: &str) -> Result<Project, ApiError> {
        self.post_json(
            "/api/projects",
            &serde_json::json!({ "slug": slug, "name": name }),
        )
        .await
    }

    // ========================================================================
    // Groups and events
    // ========================================================================

    /// Lists issue groups for a project.
    pub async fn groups(&self, project: &str) -> Result<Vec<Group>, ApiError> {
        self.get_json("/api/groups", &[("project".to_string(), project.to_string())])
            .await
    }

    /// Queries events for a project, normalizing the two response
    /// shapes (bare array, `{results, count}` envelope) into one page.
    pub async fn events(&self, project: &str, query: &EventQuery) -> Result<EventsPage, ApiError> {
        let value: serde_json::Value = self.get_json("/api/events", &query.params(project)).await?;
        Ok(EventsPage::from_value(value))
    }

    /// Fetches a single event.
    pub async fn event(&self, id: u64) -> Result<Event, ApiError> {
        self.get_json(&format!("/api/events/{id}"), &[]).await
    }

    /// Submits a raw stack trace for symbolication.
    pub async fn symbolicate(
        &self,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.post_json("/api/symbolicate", body).await
    }

    // ========================================================================
    // Releases, health, deployments
    // ========================================================================

    /// Lists releases for a project.
    pub async fn releases(&self, project: &str) -> Result<Vec<Release>, ApiError> {
        self.get_json(
            "/api/releases",
            &[("project".to_string(), project.to_string())],
        )
        .await
    }

    /// Creates a release.
    pub async fn create_release(&self, project: &str, version: &str) -> Result<Release, ApiError> {
        self.post_json(
            "/api/releases",
            &serde_json::json!({ "project": project, "version": version }),
        )
        .await
    }

    /// Fetches the per-release health summary.
    pub async fn release_health(&self, project: &str) -> Result<Vec<ReleaseHealth>, ApiError> {
        self.get_json(
            "/api/releases/health",
            &[("project".to_string(), project.to_string())],
        )
        .await
    }

    /// Fetches the session-health time series for a window.
    pub async fn health_series(
        &self,
        project: &str,
        interval: &str,
        window: Window,
    ) -> Result<Vec<HealthPoint>, ApiError> {
        self.get_json(
            "/api/releases/health/series",
            &[
                ("project".to_string(), project.to_string()),
                ("interval".to_string(), interval.to_string()),
                ("from".to_string(), window.from.to_rfc3339()),
                ("to".to_string(), window.to.to_rfc3339()),
            ],
        )
        .await
    }

    /// Lists deployments for a project.
    pub async fn deployments(&self, project: &str) -> Result<Vec<Deployment>, ApiError> {
        self.get_json(
            "/api/deployments",
            &[("project".to_string(), project.to_string())],
        )
        .await
    }

    /// Records a deployment.
    pub async fn create_deployment(
        &self,
        project: &str,
        release_version: &str,
        environment: &str,
    ) -> Result<Deployment, ApiError> {
        self.post_json(
            "/api/deployments",
            &serde_json::json!({
                "project": project,
                "release_version": release_version,
                "environment": environment,
            }),
        )
        .await
    }

    // ========================================================================
    // Alert rules
    // ========================================================================

    /// Lists alert rules for a project.
    pub async fn alert_rules(&self, project: &str) -> Result<Vec<AlertRule>, ApiError> {
        self.get_json(
            "/api/alert-rules",
            &[("project".to_string(), project.to_string())],
        )
        .await
    }

    /// Creates an alert rule.
    pub async fn create_alert_rule(&self, rule: &AlertRule) -> Result<AlertRule, ApiError> {
        self.post_json("/api/alert-rules", rule).await
    }

    /// Snoozes a rule for the given number of minutes.
    pub async fn snooze_rule(&self, id: u64, minutes: u32) -> Result<AlertRule, ApiError> {
        self.post_json(
            &format!("/api/alert-rules/{id}/snooze"),
            &serde_json::json!({ "minutes": minutes }),
        )
        .await
    }

    /// Clears a rule's snooze.
    pub async fn unsnooze_rule(&self, id: u64) -> Result<AlertRule, ApiError> {
        self.post_json(
            &format!("/api/alert-rules/{id}/unsnooze"),
            &serde_json::json!({}),
        )
        .await
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Submits a captured event through a project ingestion token.
    pub async fn ingest_event(
        &self,
        token: &str,
        event: &IngestEvent,
    ) -> Result<serde_json::Value, ApiError> {
        self.post_json(&format!("/api/events/ingest/token/{token}"), event)
            .await
    }

    /// Submits a session report through a project ingestion token.
    pub async fn ingest_session(
        &self,
        token: &str,
        session: &SessionPayload,
    ) -> Result<serde_json::Value, ApiError> {
        self.post_json(&format!("/api/sessions/ingest/token/{token}"), session)
            .await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(&url).query(params).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(error = %e, "Response body was not the expected JSON shape");
            ApiError::Decode(e.to_string())
        })
    }
}
