//! Project data aggregator.
//!
//! Translates the current routing/filter state into the set of backend
//! queries needed to render the active view, runs them concurrently,
//! and exposes one consistent snapshot. Sub-request failures degrade to
//! empty data instead of aborting the join; there is no all-or-nothing
//! failure and no retry.

use crate::api::{ApiClient, EventQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::{AlertRule, Deployment, Event, Group, HealthPoint, Release, ReleaseHealth};
use shared::routing::{RoutingState, Tab};
use shared::time::resolve_window;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Read-only aggregate of everything a project view needs.
///
/// Fully replaced on every successful fetch cycle, never patched
/// incrementally. The previous snapshot is retained while the next
/// cycle is loading, so views never flash to empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectDataSnapshot {
    /// Issue groups.
    pub groups: Vec<Group>,

    /// Events on the current page.
    pub events: Vec<Event>,

    /// Total matching events before pagination.
    pub event_total: usize,

    /// Releases.
    pub releases: Vec<Release>,

    /// Alert rules.
    pub rules: Vec<AlertRule>,

    /// Per-release health summary.
    pub health: Vec<ReleaseHealth>,

    /// Deployments.
    pub deploys: Vec<Deployment>,

    /// Session-health time series.
    pub series: Vec<HealthPoint>,

    /// True while a fetch cycle is in flight.
    pub loading: bool,
}

/// Builds the events query for a state, attaching pagination only on
/// the tab that paginates.
fn event_query(state: &RoutingState, window: shared::time::Window) -> EventQuery {
    let mut query = EventQuery::new().with_window(window);

    if let Some(level) = state.filter_level {
        query = query.with_level(level.to_string());
    }
    if let Some(env) = &state.filter_env {
        query = query.with_environment(env.clone());
    }
    if let Some(release) = &state.filter_release {
        query = query.with_release(release.clone());
    }
    if !state.search.is_empty() {
        query = query.with_search(state.search.clone());
    }
    if state.active_tab == Tab::Events {
        query = query.with_page(state.event_limit, state.event_offset);
    }

    query
}

/// Runs one fetch cycle: fans out all reads concurrently and joins.
///
/// A no-op (empty snapshot, `loading = false`) when no project is
/// selected. Each sub-request is independently fault-tolerant; a
/// failure resolves to an empty list for that field only.
pub async fn fetch_snapshot(
    api: &ApiClient,
    state: &RoutingState,
    now: DateTime<Utc>,
) -> ProjectDataSnapshot {
    let Some(project) = state.selected_project.as_deref() else {
        return ProjectDataSnapshot::default();
    };

    let window = resolve_window(
        state.time_selection.as_ref(),
        state.custom_range.as_ref(),
        &state.range,
        now,
    );
    let query = event_query(state, window);

    let (groups, events, releases, rules, health, deploys, series) = tokio::join!(
        api.groups(project),
        api.events(project, &query),
        api.releases(project),
        api.alert_rules(project),
        api.release_health(project),
        api.deployments(project),
        api.health_series(project, &state.interval, window),
    );

    let page = events.unwrap_or_else(|e| {
        tracing::debug!(project, error = %e, "events fetch failed, degrading to empty");
        shared::models::EventsPage::default()
    });

    ProjectDataSnapshot {
        groups: or_empty(groups, project, "groups"),
        events: page.events,
        event_total: page.total,
        releases: or_empty(releases, project, "releases"),
        rules: or_empty(rules, project, "alert rules"),
        health: or_empty(health, project, "release health"),
        deploys: or_empty(deploys, project, "deployments"),
        series: or_empty(series, project, "health series"),
        loading: false,
    }
}

fn or_empty<T>(result: Result<Vec<T>, crate::ApiError>, project: &str, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::debug!(project, error = %e, "{what} fetch failed, degrading to empty");
        Vec::new()
    })
}

/// Shared handle to the latest snapshot plus a fetch generation.
///
/// Superseded fetches are not cancelled; instead a run publishes its
/// result only if no newer run started meanwhile, so an out-of-order
/// late response can never overwrite newer state.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    snapshot: Arc<Mutex<ProjectDataSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl SnapshotCell {
    /// Creates a cell holding an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the current snapshot.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder of the lock panicked.
    #[must_use]
    pub fn snapshot(&self) -> ProjectDataSnapshot {
        self.snapshot.lock().expect("snapshot lock poisoned").clone()
    }

    /// Runs a fetch cycle and publishes the result unless superseded.
    ///
    /// Marks the retained snapshot as loading for the duration, then
    /// either replaces it atomically or, when a newer refetch started
    /// while this one was in flight, discards the stale result.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder of the lock panicked.
    pub async fn refetch(&self, api: &ApiClient, state: &RoutingState, now: DateTime<Utc>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.mark_loading(generation);

        let next = fetch_snapshot(api, state, now).await;

        if self.generation.load(Ordering::SeqCst) == generation {
            let mut guard = self.snapshot.lock().expect("snapshot lock poisoned");
            *guard = next;
        } else {
            tracing::debug!(generation, "Discarding stale fetch result");
        }
    }

    /// Stamps `loading` only while `generation` is still the newest
    /// run. A superseded run must not mark the snapshot loading after
    /// a newer run has already published its result; the newer run
    /// (or the next one) owns the flag from that point on.
    fn mark_loading(&self, generation: u64) {
        let mut guard = self.snapshot.lock().expect("snapshot lock poisoned");
        if self.generation.load(Ordering::SeqCst) == generation {
            guard.loading = true;
        }
    }
}
