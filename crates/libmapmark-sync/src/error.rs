//! Sync error types

use libmapmark_core::MapError;
use thiserror::Error;

/// Errors that can occur during a sync round trip.
///
/// Every variant is terminal for its request: there is no partial success
/// and nothing is retried.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The configured base URL cannot be used
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport failure (connect, send, receive)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// No server configured for this session
    #[error("Offline: no server configured")]
    Offline,
}

impl SyncError {
    /// Whether the server answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Status { status: 404, .. })
    }
}

impl From<SyncError> for MapError {
    fn from(e: SyncError) -> Self {
        MapError::Sync(e.to_string())
    }
}
