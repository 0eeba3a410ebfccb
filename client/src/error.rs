//! Client error taxonomy.
//!
//! Network and API failures carry the HTTP status and raw body text so
//! callers can surface them verbatim. Parse fallbacks (malformed URL
//! params, loose dates) never reach this type; those degrade silently
//! in `shared`.

use thiserror::Error;

/// Errors raised by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("API error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body, JSON or plain text.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request never completed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// The HTTP status, when the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}
