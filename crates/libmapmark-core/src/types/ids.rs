use chrono::Utc;
use rand::Rng;

/// Opaque marker identifier (`marker-<unix-ms>-<suffix>`)
pub type MarkerId = String;

/// Opaque snapshot identifier, for display only
pub type SnapshotId = String;

/// Prefix shared by every generated marker id
pub const MARKER_ID_PREFIX: &str = "marker-";

/// Exclusive upper bound of the random suffix
const MARKER_SUFFIX_BOUND: u32 = 10_000;

/// Generate a marker id from the current time plus a random suffix.
///
/// Uniqueness is best-effort: two markers created in the same millisecond
/// collide with probability 1/10000.
pub fn generate_marker_id() -> MarkerId {
    let suffix = rand::thread_rng().gen_range(0..MARKER_SUFFIX_BOUND);
    format!("{}{}-{}", MARKER_ID_PREFIX, Utc::now().timestamp_millis(), suffix)
}

/// Generate a random snapshot id
pub fn generate_snapshot_id() -> SnapshotId {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_id_shape() {
        let id = generate_marker_id();
        assert!(id.starts_with(MARKER_ID_PREFIX));
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[2].parse::<u32>().unwrap() < MARKER_SUFFIX_BOUND);
    }

    #[test]
    fn test_snapshot_ids_are_random() {
        assert_ne!(generate_snapshot_id(), generate_snapshot_id());
    }
}
