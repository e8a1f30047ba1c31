pub mod add;
pub mod delete;
pub mod history;
pub mod list;
pub mod pull;
pub mod push;

use libmapmark_core::{MapError, Marker};
use libmapmark_sync::SyncNotice;
use serde::Serialize;

/// Marker as shown in command output
#[derive(Serialize)]
pub struct MarkerInfo {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub note: String,
    pub color: String,
    pub create_time: String,
    pub created_by: String,
}

impl From<&Marker> for MarkerInfo {
    fn from(m: &Marker) -> Self {
        Self {
            id: m.id.clone(),
            x: m.x,
            y: m.y,
            note: m.note.clone(),
            color: m.color.clone(),
            create_time: m.create_time.to_rfc3339(),
            created_by: m.created_by.clone(),
        }
    }
}

/// One line of human output for a marker
pub fn format_marker(m: &Marker) -> String {
    format!("{}  ({:.3}, {:.3})  {}  {}", m.id, m.x, m.y, m.color, m.note)
}

/// Turn the first failed round trip into an error, for commands whose only
/// purpose is the round trip
pub fn fail_on_sync_error(notices: &[SyncNotice]) -> Result<(), MapError> {
    match notices.iter().find(|n| matches!(n, SyncNotice::SyncFailed { .. })) {
        Some(notice) => Err(MapError::Sync(notice.message())),
        None => Ok(()),
    }
}

/// Messages of failed round trips, for JSON output
pub fn failure_messages(notices: &[SyncNotice]) -> Vec<String> {
    notices
        .iter()
        .filter(|n| n.is_failure())
        .map(|n| n.message())
        .collect()
}
