//! Error types for Boostr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while discovering or boosting items
#[derive(Debug, Error)]
pub enum BoostError {
    /// The remote side rejected a boost because the item is not due yet
    #[error("item cannot be boosted yet (too early)")]
    TooEarly,

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success status code
    #[error("received HTTP status {0}")]
    Status(u16),

    /// Login handshake failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Page or payload could not be understood
    #[error("parse error: {0}")]
    Parse(String),

    /// No XSRF cookie came back with the resume page
    #[error("missing XSRF token")]
    MissingSessionToken,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoostError {
    /// Whether this is the benign "not due yet" rejection
    pub fn is_too_early(&self) -> bool {
        matches!(self, BoostError::TooEarly)
    }
}

/// Result type alias for Boostr operations
pub type Result<T> = std::result::Result<T, BoostError>;
