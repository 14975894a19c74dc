//! Error types for the Admin API client.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur talking to the Admin API or the token endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("api error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// Obtaining an access token failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Credentials could not be located or parsed.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// Credentials file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Signing the service-account assertion failed.
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Core library error.
    #[error(transparent)]
    Core(#[from] ga4_admin_core::CoreError),
}

impl ApiError {
    /// HTTP status of an `Api` error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an `Api` error from a status and the raw response body.
    ///
    /// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`;
    /// anything else is kept verbatim as the message.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self::Api {
                status,
                message: envelope.error.message,
                details: envelope.error.status,
            },
            Err(_) => Self::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.to_string()
                },
                details: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}
