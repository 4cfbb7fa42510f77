//! Client error types.

use thiserror::Error;

/// Boxed source of a mid-stream read failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The dispatch route answered with a non-success status before streaming.
    #[error("{detail}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// `detail` text from the server, or a fallback message.
        detail: String,
    },

    /// Reading the event stream failed after it started.
    #[error("stream read failed: {0}")]
    Transport(#[source] BoxError),

    /// An event carried a `data` payload that is not valid JSON.
    #[error("malformed event payload `{payload}`: {source}")]
    Decode {
        /// The raw `data` value as received.
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    /// History retrieval answered with a non-success status.
    #[error("{detail}")]
    HistoryFetch {
        /// HTTP status code.
        status: u16,
        /// `detail` text from the server, or a fallback message.
        detail: String,
    },

    /// Stopping a run answered with a non-success status.
    #[error("{detail}")]
    Stop {
        /// HTTP status code.
        status: u16,
        /// `detail` text from the server, or a fallback message.
        detail: String,
    },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status attached to this error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. }
            | Error::HistoryFetch { status, .. }
            | Error::Stop { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided detail text for status errors.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Request { detail, .. }
            | Error::HistoryFetch { detail, .. }
            | Error::Stop { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the agent service.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Pull the detail text out of a raw error body.
    ///
    /// String details are returned verbatim; structured ones (validation
    /// error lists) are rendered as compact JSON.
    pub(crate) fn detail_from_body(body: &str) -> Option<String> {
        let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}
