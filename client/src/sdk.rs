//! Capture SDK.
//!
//! The Rust analog of the browser SDK: manual `capture_exception` /
//! `capture_message` / `send_session` calls plus a global panic hook,
//! all forwarding to the token ingestion endpoints. Capture calls never
//! block and never fail the caller; payloads travel over a channel to a
//! background forwarder task and delivery errors are only logged.

use crate::api::ApiClient;
use shared::models::{IngestEvent, Level, SessionPayload, SessionStatus};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// SDK configuration. Explicit and passed in; there is no ambient
/// global configuration.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Project ingestion token.
    pub token: String,

    /// Backend base URL.
    pub base_url: String,

    /// Release version stamped onto every payload.
    pub release: Option<String>,

    /// Environment name stamped onto every payload.
    pub environment: Option<String>,

    /// Application name stamped onto every payload.
    pub app: Option<String>,
}

impl SdkConfig {
    /// Creates a config with only the required fields.
    #[must_use]
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            release: None,
            environment: None,
            app: None,
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

    /// Sets the application name.
    #[must_use]
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }
}

enum Item {
    Event(IngestEvent),
    Session(SessionPayload),
    Shutdown,
}

/// A cheap-to-clone handle to the capture pipeline.
#[derive(Clone)]
pub struct Sdk {
    config: Arc<SdkConfig>,
    tx: mpsc::UnboundedSender<Item>,
    forwarder: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Sdk {
    /// Starts the SDK: spawns the background forwarder and returns the
    /// capture handle.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn init(config: SdkConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let api = ApiClient::new(config.base_url.clone());
        let token = config.token.clone();
        let forwarder = tokio::spawn(forward(api, token, rx));

        Self {
            config: Arc::new(config),
            tx,
            forwarder: Arc::new(Mutex::new(Some(forwarder))),
        }
    }

    /// Captures an error with its source chain as the stack.
    pub fn capture_exception(&self, error: &dyn std::error::Error) {
        let mut stack = String::new();
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str(&format!("caused by: {cause}\n"));
            source = cause.source();
        }

        let mut event = self.stamp(IngestEvent::new(Level::Error, error.to_string()));
        if !stack.is_empty() {
            event = event.with_stack(stack.trim_end());
        }
        self.enqueue(Item::Event(event));
    }

    /// Captures a plain message at the given level.
    pub fn capture_message(&self, message: impl Into<String>, level: Level) {
        let event = self.stamp(IngestEvent::new(level, message));
        self.enqueue(Item::Event(event));
    }

    /// Reports a session outcome.
    pub fn send_session(&self, status: SessionStatus) {
        let config = &self.config;
        self.enqueue(Item::Session(SessionPayload {
            status,
            release: config.release.clone(),
            environment: config.environment.clone(),
            app: config.app.clone(),
        }));
    }

    /// Installs a global panic hook that captures panics as fatal
    /// events, chaining the previously installed hook.
    ///
    /// The hook holds its own sender; it keeps working for the life of
    /// the process or until [`close`](Self::close) stops the forwarder.
    pub fn install_panic_hook(&self) {
        let tx = self.tx.clone();
        let config = Arc::clone(&self.config);
        let previous = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            let message = panic_message(info);
            let mut event = IngestEvent::new(Level::Fatal, message);
            event.release = config.release.clone();
            event.environment = config.environment.clone();
            event.app = config.app.clone();
            if let Some(location) = info.location() {
                event = event.with_stack(location.to_string());
            }
            let _ = tx.send(Item::Event(event));

            previous(info);
        }));
    }

    /// Flushes queued payloads and stops the forwarder.
    ///
    /// Payloads enqueued before the call are delivered; captures after
    /// it are dropped (and logged at debug).
    pub async fn close(&self) {
        let _ = self.tx.send(Item::Shutdown);
        let handle = self
            .forwarder
            .lock()
            .map_or(None, |mut guard| guard.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "SDK forwarder task failed");
            }
        }
    }

    fn stamp(&self, mut event: IngestEvent) -> IngestEvent {
        event.release = self.config.release.clone();
        event.environment = self.config.environment.clone();
        event.app = self.config.app.clone();
        event
    }

    fn enqueue(&self, item: Item) {
        if self.tx.send(item).is_err() {
            tracing::debug!("Capture dropped: SDK already closed");
        }
    }
}

impl std::fmt::Debug for Sdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk")
            .field("token", &self.config.token)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        format!("panicked at '{s}'")
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        format!("panicked at '{s}'")
    } else {
        "panicked".to_string()
    }
}

async fn forward(api: ApiClient, token: String, mut rx: mpsc::UnboundedReceiver<Item>) {
    while let Some(item) = rx.recv().await {
        match item {
            Item::Event(event) => {
                if let Err(e) = api.ingest_event(&token, &event).await {
                    tracing::warn!(error = %e, "Failed to deliver captured event");
                }
            }
            Item::Session(session) => {
                if let Err(e) = api.ingest_session(&token, &session).await {
                    tracing::warn!(error = %e, "Failed to deliver session report");
                }
            }
            Item::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SdkConfig::new("tok", "http://localhost:8000")
            .with_release("1.0.0")
            .with_environment("prod")
            .with_app("console");
        assert_eq!(config.release.as_deref(), Some("1.0.0"));
        assert_eq!(config.environment.as_deref(), Some("prod"));
        assert_eq!(config.app.as_deref(), Some("console"));
    }

    #[tokio::test]
    async fn test_capture_after_close_does_not_panic() {
        let sdk = Sdk::init(SdkConfig::new("tok", "http://127.0.0.1:1"));
        sdk.close().await;
        sdk.capture_message("late", Level::Info);
    }

    #[tokio::test]
    async fn test_stamp_applies_config() {
        let sdk = Sdk::init(
            SdkConfig::new("tok", "http://127.0.0.1:1")
                .with_release("2.0.0")
                .with_environment("staging"),
        );
        let event = sdk.stamp(IngestEvent::new(Level::Error, "boom"));
        assert_eq!(event.release.as_deref(), Some("2.0.0"));
        assert_eq!(event.environment.as_deref(), Some("staging"));
        sdk.close().await;
    }
}
