use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ids::{generate_snapshot_id, SnapshotId};
use crate::types::lenient;
use crate::types::marker::Marker;

/// A fully materialized marker set at one point in history.
///
/// Snapshots are immutable: the log only ever grows by appending whole new
/// snapshots, so there are no setters. `markers` is the complete live set,
/// not a diff against the previous snapshot.
///
/// Decoding follows the same lenient rules as [`Marker`]; a `markers` entry
/// that is not an object becomes a default marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    #[serde(deserialize_with = "lenient::string")]
    snapshot_id: SnapshotId,
    #[serde(with = "crate::types::timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "lenient::list")]
    markers: Vec<Marker>,
    #[serde(deserialize_with = "lenient::string")]
    description: String,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            snapshot_id: String::new(),
            timestamp: Utc::now(),
            markers: Vec::new(),
            description: String::new(),
        }
    }
}

impl Snapshot {
    /// Create a snapshot stamped with the current time and a fresh id
    pub fn new(markers: Vec<Marker>, description: impl Into<String>) -> Self {
        Self::from_parts(generate_snapshot_id(), Utc::now(), markers, description)
    }

    /// Assemble a snapshot from explicit parts
    pub fn from_parts(
        snapshot_id: impl Into<SnapshotId>,
        timestamp: DateTime<Utc>,
        markers: Vec<Marker>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            timestamp,
            markers,
            description: description.into(),
        }
    }

    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Look up a marker in this snapshot by id
    pub fn find(&self, marker_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == marker_id)
    }

    pub fn contains(&self, marker_id: &str) -> bool {
        self.find(marker_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let snap = Snapshot::new(vec![Marker::new(0.1, 0.2, "a", "#000000", "")], "Added marker: a");
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json["snapshotId"].is_string());
        assert!(json["timestamp"].is_string());
        assert_eq!(json["markers"].as_array().unwrap().len(), 1);
        assert_eq!(json["description"], "Added marker: a");
    }

    #[test]
    fn test_json_roundtrip_is_exact() {
        let snap = Snapshot::new(
            vec![
                Marker::new(0.1, 0.2, "a", "#000000", "x"),
                Marker::new(0.3, 0.4, "b", "#ffffff", "y"),
            ],
            "two",
        );
        let text = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_lenient_decode() {
        let snap: Snapshot = serde_json::from_str(
            r#"{"snapshotId": null, "markers": [{"x": 0.5, "id": "a"}, 7], "description": 3}"#,
        )
        .unwrap();
        assert_eq!(snap.snapshot_id(), "");
        assert_eq!(snap.description(), "");
        assert_eq!(snap.marker_count(), 2);
        assert_eq!(snap.markers()[0].x, 0.5);
        assert_eq!(snap.markers()[1].id, "");

        let snap: Snapshot = serde_json::from_str(r#"{"markers": 5}"#).unwrap();
        assert_eq!(snap.marker_count(), 0);
    }

    #[test]
    fn test_find() {
        let m = Marker::new(0.5, 0.5, "here", "#000000", "");
        let snap = Snapshot::new(vec![m.clone()], "d");
        assert_eq!(snap.find(&m.id), Some(&m));
        assert!(!snap.contains("marker-0-0"));
    }
}
