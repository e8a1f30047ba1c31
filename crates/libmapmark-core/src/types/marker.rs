use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::ids::{generate_marker_id, MarkerId};
use crate::types::lenient;

/// Color used when none is supplied
pub const DEFAULT_COLOR: &str = "#ff0000";

/// Number of note characters quoted in change descriptions
pub const NOTE_PREVIEW_CHARS: usize = 20;

/// A positioned, colored, annotated point on the reference image.
///
/// Markers are values: once created they are only ever copied into new
/// snapshots, never edited in place. Coordinates are normalized to
/// `[0, 1] x [0, 1]` so they survive changes of map resolution.
///
/// Decoding is lenient: a missing field, or one of the wrong JSON type,
/// takes its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Marker {
    #[serde(deserialize_with = "lenient::string")]
    pub id: MarkerId,
    #[serde(deserialize_with = "lenient::number")]
    pub x: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub y: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub note: String,
    #[serde(deserialize_with = "color")]
    pub color: String,
    #[serde(with = "crate::types::timestamp")]
    pub create_time: DateTime<Utc>,
    #[serde(deserialize_with = "lenient::string")]
    pub created_by: String,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            id: String::new(),
            x: 0.0,
            y: 0.0,
            note: String::new(),
            color: DEFAULT_COLOR.to_string(),
            create_time: Utc::now(),
            created_by: String::new(),
        }
    }
}

impl Marker {
    /// Create a marker with a fresh id at the given normalized position.
    ///
    /// Coordinates outside the unit square are clamped onto its edge.
    pub fn new(
        x: f64,
        y: f64,
        note: impl Into<String>,
        color: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_marker_id(),
            x: clamp_unit(x),
            y: clamp_unit(y),
            note: note.into(),
            color: color.into(),
            create_time: Utc::now(),
            created_by: created_by.into(),
        }
    }

    /// Assign a generated id if this marker has none. Returns true if an id was assigned.
    pub fn ensure_id(&mut self) -> bool {
        if self.id.trim().is_empty() {
            self.id = generate_marker_id();
            true
        } else {
            false
        }
    }

    /// First characters of the note, as quoted in change descriptions
    pub fn note_preview(&self) -> String {
        self.note.chars().take(NOTE_PREVIEW_CHARS).collect()
    }
}

fn color<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::string_or(Value::deserialize(deserializer)?, DEFAULT_COLOR))
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_position() {
        let m = Marker::new(1.5, -0.25, "gate", "#00ff00", "alice");
        assert_eq!((m.x, m.y), (1.0, 0.0));
        assert!(m.id.starts_with("marker-"));
    }

    #[test]
    fn test_json_field_names() {
        let m = Marker::new(0.25, 0.75, "library", "#112233", "bob");
        let json = serde_json::to_value(&m).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["id", "x", "y", "note", "color", "createTime", "createdBy"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 7);
        assert_eq!(json["color"], "#112233");
        assert_eq!(json["createdBy"], "bob");
    }

    #[test]
    fn test_lenient_decode_fills_defaults() {
        let m: Marker = serde_json::from_str(r#"{"x": 0.5, "note": "cafe"}"#).unwrap();
        assert_eq!(m.id, "");
        assert_eq!(m.x, 0.5);
        assert_eq!(m.y, 0.0);
        assert_eq!(m.color, DEFAULT_COLOR);
        assert_eq!(m.created_by, "");
    }

    #[test]
    fn test_lenient_decode_tolerates_wrong_types() {
        let before = Utc::now();
        let m: Marker = serde_json::from_str(
            r#"{"id": 12, "x": null, "y": "0.5", "note": "ok", "color": false, "createTime": "yesterday"}"#,
        )
        .unwrap();
        assert_eq!(m.id, "");
        assert_eq!((m.x, m.y), (0.0, 0.0));
        assert_eq!(m.note, "ok");
        assert_eq!(m.color, DEFAULT_COLOR);
        assert!(m.create_time >= before);
    }

    #[test]
    fn test_decode_offsetless_create_time() {
        let m: Marker =
            serde_json::from_str(r#"{"id": "marker-1-1", "createTime": "2024-05-01T08:30:00"}"#)
                .unwrap();
        assert_eq!(m.create_time.to_rfc3339(), "2024-05-01T08:30:00+00:00");
    }

    #[test]
    fn test_ensure_id() {
        let mut m = Marker::default();
        assert!(m.ensure_id());
        assert!(m.id.starts_with("marker-"));
        let id = m.id.clone();
        assert!(!m.ensure_id());
        assert_eq!(m.id, id);
    }

    #[test]
    fn test_note_preview_counts_chars() {
        let mut m = Marker::default();
        m.note = "图书馆门口的自行车停放区域需要重新规划一下".to_string();
        assert_eq!(m.note_preview().chars().count(), NOTE_PREVIEW_CHARS);
        m.note = "short".to_string();
        assert_eq!(m.note_preview(), "short");
    }
}
