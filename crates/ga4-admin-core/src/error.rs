//! Error types for ga4-admin-core.

use thiserror::Error;

/// Result type alias for ga4-admin-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in ga4-admin-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A date string did not start with `YYYY-MM-DD`.
    #[error("invalid date '{0}': expected an ISO 8601 value starting with YYYY-MM-DD")]
    InvalidDate(String),

    /// A date slot could be filled neither from the patch nor from the existing record.
    #[error("missing {0}: the annotation has no existing date to fall back on")]
    MissingDate(&'static str),

    /// Input failed validation before reaching the remote service.
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
