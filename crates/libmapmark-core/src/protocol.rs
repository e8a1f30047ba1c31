//! Wire protocol shared by the sync client and server
//!
//! Paths are relative to the API base (`http://host:port/api`).

use serde::{Deserialize, Serialize};

/// Header carrying the optional user label
pub const USER_HEADER: &str = "X-User";

/// `GET` full history
pub const SNAPSHOTS_PATH: &str = "/map/snapshots";

/// `POST` one marker; `DELETE` with `/{id}` appended
pub const MARKERS_PATH: &str = "/map/markers";

/// `POST` a snapshot array for verbatim append
pub const BATCH_PATH: &str = "/map/snapshots/batch";

/// Prefix under which the server mounts the API
pub const API_PREFIX: &str = "/api";

/// Body of a successful marker delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub marker_id: String,
}

/// Body of a successful batch upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub message: String,
}

impl BatchResponse {
    pub fn uploaded(count: usize) -> Self {
        Self {
            message: format!("Uploaded {} snapshots", count),
        }
    }
}
