//! # Client Error Types
//!
//! Typed failures surfaced by the request pipeline. Orchestrator outcomes such
//! as a task timeout are not errors; see [`crate::orchestrator::TaskOutcome`].

use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Error types for request execution and client setup
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credential could be resolved. Raised before any network activity.
    #[error("No API credential available. Set SEODATA_API_TOKEN or configure a token.")]
    AuthMissing,

    /// The provider answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    HttpError {
        status: u16,
        url: String,
        body: String,
    },

    /// Transport-level failure (DNS, connect, TLS, timeout).
    #[error("Network error calling {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ClientError {
    /// Create an HTTP status error carrying the raw response body
    pub fn http(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Wrap a transport failure with the URL that was attempted
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::NetworkError {
            url: url.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Stable machine-readable code used in structured error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthMissing => "auth_missing",
            Self::HttpError { .. } => "http_error",
            Self::NetworkError { .. } => "network_error",
            Self::ConfigError(_) => "config_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::SerializationError(_) => "serialization_error",
        }
    }

    /// The URL that was attempted, when the failure happened on the wire.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::HttpError { url, .. } | Self::NetworkError { url, .. } => Some(url),
            _ => None,
        }
    }

    /// HTTP status for provider-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Render as the JSON object returned to tool callers.
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if let Self::HttpError { status, url, body } = self {
            value["status"] = serde_json::json!(status);
            value["url"] = serde_json::json!(url);
            // Keep structured bodies structured so callers can read provider messages.
            value["body"] = serde_json::from_str(body)
                .unwrap_or_else(|_| serde_json::Value::String(body.clone()));
        } else if let Self::NetworkError { url, .. } = self {
            value["url"] = serde_json::json!(url);
        }
        value
    }
}
