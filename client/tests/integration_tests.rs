//! Integration tests for the Mini Sentry client.
//!
//! These tests stand up an in-process stub backend with axum and
//! exercise the real API client, aggregator, and SDK over a socket.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use client::{ApiClient, ApiError, EventQuery, SnapshotCell};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behavior switches and request recordings for one stub instance.
#[derive(Default)]
struct Stub {
    /// When true, GET /api/events answers 500.
    fail_events: bool,
    /// When true, GET /api/events answers the `{results, count}`
    /// envelope instead of a bare array.
    envelope: bool,
    /// Per-project delay, to order concurrent fetches deterministically.
    slow_project: Option<String>,
    /// Query params of every /api/events request, in arrival order.
    events_queries: Mutex<Vec<HashMap<String, String>>>,
    /// Bodies posted to the ingestion endpoints.
    ingested: Mutex<Vec<Value>>,
    /// Total requests served.
    requests: AtomicUsize,
}

type StubState = Arc<Stub>;

fn sample_event(id: u64) -> Value {
    json!({
        "id": id,
        "project_id": 1,
        "level": "error",
        "message": "TypeError: x is undefined",
        "timestamp": "2024-01-15T10:30:45Z"
    })
}

fn sample_group(title: &str) -> Value {
    json!({
        "id": 1,
        "project_id": 1,
        "title": title,
        "level": "error",
        "count": 12,
        "first_seen": "2024-01-01T00:00:00Z",
        "last_seen": "2024-01-15T10:30:45Z",
        "status": "unresolved"
    })
}

async fn maybe_delay(stub: &Stub, params: &HashMap<String, String>) {
    if let (Some(slow), Some(project)) = (&stub.slow_project, params.get("project")) {
        if slow == project {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
    }
}

async fn projects_handler(State(stub): State<StubState>) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {"id": 1, "slug": "my-app", "name": "My App"},
        {"id": 2, "slug": "slow-app", "name": "Slow App"}
    ]))
}

async fn create_project_handler(
    State(stub): State<StubState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "id": 3,
        "slug": body["slug"],
        "name": body["name"]
    }))
}

async fn event_detail_handler(State(stub): State<StubState>, Path(id): Path<u64>) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    Json(sample_event(id))
}

async fn symbolicate_handler(
    State(stub): State<StubState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "frames": [{"function": "main", "file": "src/main.rs", "line": 42}],
        "received": body["stack"]
    }))
}

async fn create_rule_handler(
    State(stub): State<StubState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    let mut rule = body;
    rule["id"] = json!(11);
    Json(rule)
}

async fn groups_handler(
    State(stub): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    maybe_delay(&stub, &params).await;
    let title = format!(
        "issues of {}",
        params.get("project").cloned().unwrap_or_default()
    );
    Json(json!([sample_group(&title)]))
}

async fn events_handler(
    State(stub): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    maybe_delay(&stub, &params).await;
    stub.events_queries.lock().unwrap().push(params);

    if stub.fail_events {
        return (StatusCode::INTERNAL_SERVER_ERROR, "events store unavailable").into_response();
    }
    if stub.envelope {
        return Json(json!({"results": [sample_event(1)], "count": 42})).into_response();
    }
    Json(json!([sample_event(1), sample_event(2)])).into_response()
}

async fn empty_list_handler(State(stub): State<StubState>) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    Json(json!([]))
}

async fn create_release_handler(
    State(stub): State<StubState>,
    Json(body): Json<Value>,
) -> Response {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    let version = body["version"].as_str().unwrap_or_default();
    if version.is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "version must not be empty").into_response();
    }
    Json(json!({
        "id": 9,
        "version": version,
        "project_id": 1,
        "created_at": "2024-03-01T12:00:00Z"
    }))
    .into_response()
}

async fn snooze_handler(State(stub): State<StubState>, Path(id): Path<u64>) -> Json<Value> {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "id": id,
        "project_id": 1,
        "name": "error spike",
        "level": "error",
        "threshold": 10,
        "window_minutes": 5,
        "snoozed_until": "2099-01-01T00:00:00Z"
    }))
}

async fn ingest_handler(
    State(stub): State<StubState>,
    Path(token): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    stub.requests.fetch_add(1, Ordering::SeqCst);
    if token == "bad-token" {
        return (StatusCode::UNAUTHORIZED, "unknown token").into_response();
    }
    stub.ingested.lock().unwrap().push(body);
    Json(json!({"accepted": true})).into_response()
}

/// Binds the stub router on an ephemeral port and serves it.
async fn serve(stub: StubState) -> String {
    let app = Router::new()
        .route("/api/projects", get(projects_handler).post(create_project_handler))
        .route("/api/groups", get(groups_handler))
        .route("/api/events", get(events_handler))
        .route("/api/events/{id}", get(event_detail_handler))
        .route("/api/symbolicate", post(symbolicate_handler))
        .route("/api/releases", get(empty_list_handler).post(create_release_handler))
        .route("/api/releases/health", get(empty_list_handler))
        .route("/api/releases/health/series", get(empty_list_handler))
        .route("/api/alert-rules", get(empty_list_handler).post(create_rule_handler))
        .route("/api/alert-rules/{id}/snooze", post(snooze_handler))
        .route("/api/deployments", get(empty_list_handler))
        .route("/api/events/ingest/token/{token}", post(ingest_handler))
        .route("/api/sessions/ingest/token/{token}", post(ingest_handler))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}")
}

async fn stub_client(stub: Stub) -> (ApiClient, StubState) {
    let stub = Arc::new(stub);
    let base_url = serve(Arc::clone(&stub)).await;
    (ApiClient::new(base_url), stub)
}

// ============================================================================
// API CLIENT TESTS
// ============================================================================

mod api {
    use super::*;
    use shared::models::{AlertRule, Level};

    #[tokio::test]
    async fn lists_projects() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let projects = client.projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].slug, "my-app");
    }

    #[tokio::test]
    async fn creates_project() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let project = client.create_project("checkout", "Checkout").await.unwrap();
        assert_eq!(project.id, 3);
        assert_eq!(project.slug, "checkout");
        assert_eq!(project.name, "Checkout");
    }

    #[tokio::test]
    async fn fetches_single_event() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let event = client.event(17).await.unwrap();
        assert_eq!(event.id, 17);
        assert_eq!(event.message, "TypeError: x is undefined");
    }

    #[tokio::test]
    async fn symbolicates_raw_stack() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let result = client
            .symbolicate(&json!({"stack": "at main (bundle.js:1:100)"}))
            .await
            .unwrap();
        assert_eq!(result["frames"][0]["function"], "main");
        assert_eq!(result["received"], "at main (bundle.js:1:100)");
    }

    #[tokio::test]
    async fn creates_alert_rule() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let rule = AlertRule {
            id: 0,
            project_id: 1,
            name: "error spike".to_string(),
            level: Level::Error,
            threshold: 10,
            window_minutes: 5,
            snoozed_until: None,
        };
        let created = client.create_alert_rule(&rule).await.unwrap();
        assert_eq!(created.id, 11);
        assert_eq!(created.name, "error spike");
        assert!(created.snoozed_until.is_none());
    }

    #[tokio::test]
    async fn normalizes_bare_array_events() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let page = client.events("my-app", &EventQuery::new()).await.unwrap();
        assert_eq!(page.events.len(), 2);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn normalizes_envelope_events() {
        let (client, _stub) = stub_client(Stub {
            envelope: true,
            ..Stub::default()
        })
        .await;
        let page = client.events("my-app", &EventQuery::new()).await.unwrap();
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.total, 42);
    }

    #[tokio::test]
    async fn creates_release() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let release = client.create_release("my-app", "1.4.2").await.unwrap();
        assert_eq!(release.version, "1.4.2");
    }

    #[tokio::test]
    async fn non_2xx_surfaces_status_and_body() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let err = client.create_release("my-app", "").await.unwrap_err();
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("version must not be empty"));
            }
            other => panic!("Expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn snoozes_rule() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let rule = client.snooze_rule(7, 60).await.unwrap();
        assert_eq!(rule.id, 7);
        assert!(rule.snoozed_until.is_some());
    }
}

// ============================================================================
// AGGREGATOR TESTS
// ============================================================================

mod aggregator {
    use super::*;
    use chrono::Utc;
    use client::fetch_snapshot;
    use shared::routing::{RoutingState, Tab};

    fn state_for(project: &str, tab: Tab) -> RoutingState {
        RoutingState {
            selected_project: Some(project.to_string()),
            active_tab: tab,
            ..RoutingState::default()
        }
    }

    #[tokio::test]
    async fn no_project_issues_no_requests() {
        let (client, stub) = stub_client(Stub::default()).await;
        let snapshot = fetch_snapshot(&client, &RoutingState::default(), Utc::now()).await;
        assert!(snapshot.groups.is_empty());
        assert!(!snapshot.loading);
        assert_eq!(stub.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn full_fetch_populates_snapshot() {
        let (client, _stub) = stub_client(Stub::default()).await;
        let snapshot =
            fetch_snapshot(&client, &state_for("my-app", Tab::Overview), Utc::now()).await;
        assert_eq!(snapshot.groups.len(), 1);
        assert_eq!(snapshot.events.len(), 2);
        assert_eq!(snapshot.event_total, 2);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn events_failure_degrades_to_empty() {
        let (client, _stub) = stub_client(Stub {
            fail_events: true,
            ..Stub::default()
        })
        .await;
        let snapshot =
            fetch_snapshot(&client, &state_for("my-app", Tab::Overview), Utc::now()).await;
        assert!(snapshot.events.is_empty());
        assert_eq!(snapshot.event_total, 0);
        assert_eq!(snapshot.groups.len(), 1, "other sub-requests must survive");
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn pagination_sent_only_on_events_tab() {
        let (client, stub) = stub_client(Stub::default()).await;

        fetch_snapshot(&client, &state_for("my-app", Tab::Issues), Utc::now()).await;
        fetch_snapshot(&client, &state_for("my-app", Tab::Events), Utc::now()).await;

        let queries = stub.events_queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(!queries[0].contains_key("limit"));
        assert!(!queries[0].contains_key("offset"));
        assert_eq!(queries[1].get("limit").map(String::as_str), Some("50"));
        assert_eq!(queries[1].get("offset").map(String::as_str), Some("0"));
    }

    #[tokio::test]
    async fn filters_and_window_reach_the_wire() {
        let (client, stub) = stub_client(Stub::default()).await;
        let mut state = state_for("my-app", Tab::Events);
        state.filter_level = Some(shared::models::Level::Error);
        state.filter_env = Some("prod".to_string());
        state.search = "timeout".to_string();

        fetch_snapshot(&client, &state, Utc::now()).await;

        let queries = stub.events_queries.lock().unwrap();
        let query = &queries[0];
        assert_eq!(query.get("level").map(String::as_str), Some("error"));
        assert_eq!(query.get("environment").map(String::as_str), Some("prod"));
        assert_eq!(query.get("q").map(String::as_str), Some("timeout"));
        assert!(query.contains_key("from"));
        assert!(query.contains_key("to"));
    }

    #[tokio::test]
    async fn stale_fetch_never_overwrites_newer_snapshot() {
        let (client, _stub) = stub_client(Stub {
            slow_project: Some("slow-app".to_string()),
            ..Stub::default()
        })
        .await;

        let cell = SnapshotCell::new();
        let slow = {
            let cell = cell.clone();
            let client = client.clone();
            tokio::spawn(async move {
                cell.refetch(&client, &state_for("slow-app", Tab::Overview), Utc::now())
                    .await;
            })
        };

        // Give the slow fetch a head start, then supersede it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        cell.refetch(&client, &state_for("my-app", Tab::Overview), Utc::now())
            .await;
        slow.await.unwrap();

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.groups[0].title, "issues of my-app");
        assert!(!snapshot.loading);
    }
}

// ============================================================================
// SDK TESTS
// ============================================================================

mod sdk {
    use super::*;
    use client::{Sdk, SdkConfig};
    use shared::models::{Level, SessionStatus};

    #[tokio::test]
    async fn capture_message_reaches_ingest_endpoint() {
        let (client, stub) = stub_client(Stub::default()).await;
        let sdk = Sdk::init(
            SdkConfig::new("tok-123", client.base_url())
                .with_release("1.0.0")
                .with_environment("prod")
                .with_app("console"),
        );

        sdk.capture_message("something broke", Level::Warning);
        sdk.close().await;

        let ingested = stub.ingested.lock().unwrap();
        assert_eq!(ingested.len(), 1);
        assert_eq!(ingested[0]["message"], "something broke");
        assert_eq!(ingested[0]["level"], "warning");
        assert_eq!(ingested[0]["release"], "1.0.0");
        assert_eq!(ingested[0]["app"], "console");
    }

    #[tokio::test]
    async fn capture_exception_includes_source_chain() {
        let (client, stub) = stub_client(Stub::default()).await;
        let sdk = Sdk::init(SdkConfig::new("tok-123", client.base_url()));

        let source = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = std::io::Error::new(std::io::ErrorKind::Other, source);
        sdk.capture_exception(&error);
        sdk.close().await;

        let ingested = stub.ingested.lock().unwrap();
        assert_eq!(ingested.len(), 1);
        assert_eq!(ingested[0]["level"], "error");
        assert!(ingested[0]["stack"]
            .as_str()
            .unwrap()
            .contains("disk on fire"));
    }

    #[tokio::test]
    async fn send_session_reports_status() {
        let (client, stub) = stub_client(Stub::default()).await;
        let sdk = Sdk::init(SdkConfig::new("tok-123", client.base_url()).with_release("1.0.0"));

        sdk.send_session(SessionStatus::Crashed);
        sdk.close().await;

        let ingested = stub.ingested.lock().unwrap();
        assert_eq!(ingested.len(), 1);
        assert_eq!(ingested[0]["status"], "crashed");
        assert_eq!(ingested[0]["release"], "1.0.0");
    }

    #[tokio::test]
    async fn panic_hook_captures_fatal_event_with_location() {
        let (client, stub) = stub_client(Stub::default()).await;
        let sdk = Sdk::init(SdkConfig::new("tok-123", client.base_url()));
        sdk.install_panic_hook();

        let worker = std::thread::spawn(|| panic!("worker exploded"));
        assert!(worker.join().is_err());

        sdk.close().await;

        let ingested = stub.ingested.lock().unwrap();
        assert_eq!(ingested.len(), 1);
        assert_eq!(ingested[0]["level"], "fatal");
        assert!(ingested[0]["message"]
            .as_str()
            .unwrap()
            .contains("worker exploded"));
        assert!(ingested[0]["stack"]
            .as_str()
            .unwrap()
            .contains("integration_tests.rs"));
    }

    #[tokio::test]
    async fn bad_token_is_swallowed_not_propagated() {
        let (client, stub) = stub_client(Stub::default()).await;
        let sdk = Sdk::init(SdkConfig::new("bad-token", client.base_url()));

        // Delivery fails server-side; the capture call itself must not.
        sdk.capture_message("dropped", Level::Info);
        sdk.close().await;

        assert!(stub.ingested.lock().unwrap().is_empty());
    }
}
