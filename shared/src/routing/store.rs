//! The routing/filter state store.
//!
//! Single owner of the [`RoutingState`]. All mutations go through the
//! setters here, which enforce the window-exclusivity and
//! pagination-reset invariants and re-serialize the URL fragment after
//! every change.
//!
//! Hydration (the one-shot initial fragment parse) is a distinct phase
//! with its own suppression flag: a deep link with `offset=40` must be
//! honored on load, so the "reset offset on filter change" rule does
//! not run while hydrating, and the first project resolution after
//! hydration keeps the hydrated time window instead of resetting it.

use crate::models::Project;
use crate::routing::hash::{encode_fragment, parse_fragment};
use crate::routing::state::{RoutingState, Tab, DEFAULT_EVENT_LIMIT, DEFAULT_INTERVAL};
use crate::storage::SlugStore;
use crate::time::{CustomRange, TimeSelection};

/// Owns the routing state, the persisted project slug, and the
/// last-written URL fragment.
///
/// The fragment slot models `history.replaceState`: each sync replaces
/// the previous value without creating history entries, and skips the
/// write entirely when nothing changed.
#[derive(Debug)]
pub struct RoutingStore<S: SlugStore> {
    state: RoutingState,
    slugs: S,
    /// Project slug seen in the fragment, held until projects arrive.
    url_project: Option<String>,
    /// True while `hydrate` is applying the initial fragment.
    hydrating: bool,
    /// True until the first project resolution after construction or
    /// hydration has run.
    initial_resolve_pending: bool,
    last_fragment: Option<String>,
    fragment_writes: usize,
}

impl<S: SlugStore> RoutingStore<S> {
    /// Creates a store with default state.
    #[must_use]
    pub fn new(slugs: S) -> Self {
        Self {
            state: RoutingState::default(),
            slugs,
            url_project: None,
            hydrating: false,
            initial_resolve_pending: true,
            last_fragment: None,
            fragment_writes: 0,
        }
    }

    /// The current state, read-only.
    #[must_use]
    pub fn state(&self) -> &RoutingState {
        &self.state
    }

    /// The current deep-link fragment for the state.
    #[must_use]
    pub fn fragment(&self) -> String {
        encode_fragment(&self.state)
    }

    /// The most recently written fragment, if any.
    #[must_use]
    pub fn last_written(&self) -> Option<&str> {
        self.last_fragment.as_deref()
    }

    /// How many distinct fragment writes have happened. Identical
    /// re-serializations are not counted.
    #[must_use]
    pub fn fragment_writes(&self) -> usize {
        self.fragment_writes
    }

    // ========================================================================
    // Hydration
    // ========================================================================

    /// Applies the initial URL fragment, once.
    ///
    /// `initialized_from_url` becomes true only if at least one
    /// recognized parameter appeared. Explicit `limit`/`offset` are
    /// honored; invalid values fall back to 50/0. A `project` slug is
    /// held aside until [`resolve_project`](Self::resolve_project) runs
    /// with the known project list.
    pub fn hydrate(&mut self, fragment: &str) {
        let params = parse_fragment(fragment);
        self.hydrating = true;

        if let Some(tab) = params.view {
            self.set_tab(tab);
        }
        if let Some(q) = params.q {
            self.set_search(q);
        }
        if params.level.is_some() {
            self.set_filter_level(params.level);
        }
        if params.env.is_some() {
            self.set_filter_env(params.env);
        }
        if params.release.is_some() {
            self.set_filter_release(params.release);
        }
        if params.time_selection.is_some() {
            self.set_time_selection(params.time_selection);
        }
        self.state.event_limit = params.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
        self.state.event_offset = params.offset.unwrap_or(0);
        self.state.initialized_from_url = params.recognized;
        self.url_project = params.project;

        self.hydrating = false;
        self.initial_resolve_pending = true;
        self.sync();
    }

    /// Picks the selected project once projects are available.
    ///
    /// Precedence: the fragment's `project` slug if it names a known
    /// project, else the persisted last-selected slug if known, else
    /// the first project in the list, else none.
    ///
    /// The first resolution after hydration is part of the hydration
    /// phase: it keeps a hydrated time window and offset. Later calls
    /// behave like a user selection.
    pub fn resolve_project(&mut self, projects: &[Project]) {
        let known = |slug: &String| projects.iter().any(|p| &p.slug == slug);

        let chosen = self
            .url_project
            .take()
            .filter(known)
            .or_else(|| self.slugs.load().filter(known))
            .or_else(|| projects.first().map(|p| p.slug.clone()));

        let Some(slug) = chosen else {
            self.state.selected_project = None;
            self.sync();
            return;
        };

        let initial = self.initial_resolve_pending;
        self.initial_resolve_pending = false;
        self.apply_selection(slug, initial);
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Selects a project by slug (user action).
    ///
    /// Resets the relative range to the default window and interval,
    /// clears any absolute or custom window, and resets pagination.
    pub fn select_project(&mut self, slug: impl Into<String>) {
        self.initial_resolve_pending = false;
        self.apply_selection(slug.into(), false);
    }

    /// Switches the active tab.
    pub fn set_tab(&mut self, tab: Tab) {
        self.state.active_tab = tab;
        self.sync();
    }

    /// Replaces the search query.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.state.search = search.into();
        self.reset_offset();
        self.sync();
    }

    /// Sets or clears the level filter.
    pub fn set_filter_level(&mut self, level: Option<crate::models::Level>) {
        self.state.filter_level = level;
        self.reset_offset();
        self.sync();
    }

    /// Sets or clears the environment filter.
    pub fn set_filter_env(&mut self, env: Option<String>) {
        self.state.filter_env = env;
        self.reset_offset();
        self.sync();
    }

    /// Sets or clears the release filter.
    pub fn set_filter_release(&mut self, release: Option<String>) {
        self.state.filter_release = release;
        self.reset_offset();
        self.sync();
    }

    /// Sets or clears the absolute time window. Setting one clears any
    /// custom range.
    pub fn set_time_selection(&mut self, selection: Option<TimeSelection>) {
        if selection.is_some() {
            self.state.custom_range = None;
        }
        self.state.time_selection = selection;
        self.reset_offset();
        self.sync();
    }

    /// Sets or clears the custom relative window. Setting one clears
    /// any absolute window.
    pub fn set_custom_range(&mut self, range: Option<CustomRange>) {
        if range.is_some() {
            self.state.time_selection = None;
        }
        self.state.custom_range = range;
        self.reset_offset();
        self.sync();
    }

    /// Sets the fallback relative range; clears both window overrides.
    pub fn set_range(&mut self, range: CustomRange) {
        self.state.range = range;
        self.state.time_selection = None;
        self.state.custom_range = None;
        self.reset_offset();
        self.sync();
    }

    /// Sets the health-series bucket interval.
    pub fn set_interval(&mut self, interval: impl Into<String>) {
        self.state.interval = interval.into();
        self.sync();
    }

    /// Sets the events page size.
    pub fn set_limit(&mut self, limit: usize) {
        self.state.event_limit = limit;
        self.sync();
    }

    /// Sets the events page offset.
    pub fn set_offset(&mut self, offset: usize) {
        self.state.event_offset = offset;
        self.sync();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn apply_selection(&mut self, slug: String, during_hydration: bool) {
        self.state.selected_project = Some(slug.clone());

        if !during_hydration {
            self.state.range = RoutingState::default_range();
            self.state.interval = DEFAULT_INTERVAL.to_string();
            self.state.time_selection = None;
            self.state.custom_range = None;
            self.state.event_offset = 0;
        }

        if let Err(e) = self.slugs.save(&slug) {
            tracing::warn!(slug = %slug, error = %e, "Failed to persist project selection");
        }
        self.sync();
    }

    /// Pagination must not silently reference an out-of-range page
    /// after the underlying result set changes. Suppressed while
    /// hydrating so an explicit `offset` deep link survives.
    fn reset_offset(&mut self) {
        if !self.hydrating {
            self.state.event_offset = 0;
        }
    }

    fn sync(&mut self) {
        if self.hydrating {
            return;
        }
        let fragment = encode_fragment(&self.state);
        if self.last_fragment.as_deref() != Some(fragment.as_str()) {
            self.last_fragment = Some(fragment);
            self.fragment_writes += 1;
        }
    }
}
