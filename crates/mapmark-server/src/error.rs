//! Server error types

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use libmapmark_core::MapError;
use thiserror::Error;
use tracing::error;

/// Request failures, rendered as plain-text bodies
#[derive(Debug, Error)]
pub enum ServerError {
    /// Marker body is not a JSON object of the expected shape
    #[error("Invalid JSON")]
    InvalidJson,

    /// Batch body is not a JSON array of snapshots
    #[error("Invalid JSON array")]
    InvalidJsonArray,

    /// Delete against an empty log
    #[error("No snapshots found")]
    NoSnapshots,

    /// Delete of an id absent from the latest snapshot
    #[error("Marker not found")]
    MarkerNotFound,

    /// Unknown path or method
    #[error("Not Found")]
    RouteNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidJson | ServerError::InvalidJsonArray => StatusCode::BAD_REQUEST,
            ServerError::NoSnapshots | ServerError::MarkerNotFound | ServerError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MapError> for ServerError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::EmptyLog => ServerError::NoSnapshots,
            MapError::NotFound(_) => ServerError::MarkerNotFound,
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain")],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error_conversion() {
        assert!(matches!(
            ServerError::from(MapError::EmptyLog),
            ServerError::NoSnapshots
        ));
        assert!(matches!(
            ServerError::from(MapError::marker_not_found("m")),
            ServerError::MarkerNotFound
        ));
        assert_eq!(
            ServerError::from(MapError::Internal("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_match_wire_text() {
        assert_eq!(ServerError::InvalidJson.to_string(), "Invalid JSON");
        assert_eq!(ServerError::NoSnapshots.to_string(), "No snapshots found");
        assert_eq!(ServerError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
    }
}
