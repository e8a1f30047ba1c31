use thiserror::Error;

/// Main error type for mapmark operations
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("snapshot index {index} out of range (history has {len} snapshots)")]
    OutOfRange { index: usize, len: usize },

    #[error("history is empty")]
    EmptyLog,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("sync error: {0}")]
    Sync(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MapError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            MapError::InvalidArgs(_) => "invalid_args",
            MapError::NotFound(_) => "not_found",
            MapError::OutOfRange { .. } => "out_of_range",
            MapError::EmptyLog => "empty_log",
            MapError::Io(_) => "io_error",
            MapError::Json(_) => "invalid_data",
            MapError::TomlParse(_) => "invalid_args",
            MapError::Sync(_) => "sync_error",
            MapError::Internal(_) => "internal_error",
        }
    }

    /// Get the exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            MapError::InvalidArgs(_) | MapError::TomlParse(_) => 2,
            MapError::NotFound(_) | MapError::OutOfRange { .. } | MapError::EmptyLog => 3,
            MapError::Io(_) | MapError::Json(_) => 5,
            MapError::Sync(_) => 6,
            _ => 1,
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            MapError::NotFound(msg) if msg.contains("marker") || msg.starts_with("Marker") => {
                vec!["Run 'mapmark list' to see the markers at the tip"]
            }
            MapError::OutOfRange { .. } => vec!["Run 'mapmark history' to see valid snapshot indices"],
            MapError::EmptyLog => vec![
                "Run 'mapmark pull' to fetch the shared history",
                "Or add a marker with 'mapmark add'",
            ],
            MapError::Json(_) => vec![
                "The data file may be corrupt; run 'mapmark pull' to replace it from the server",
            ],
            MapError::Sync(_) => vec![
                "Check that mapmark-server is running and --server points at its /api base",
                "Or use 'mapmark --offline <command>' to work locally",
            ],
            _ => vec![],
        }
    }

    /// Create a NotFound error for a marker id
    pub fn marker_not_found(marker_id: &str) -> Self {
        MapError::NotFound(format!("Marker '{}' not found", marker_id))
    }

    /// Create an OutOfRange error for a snapshot index
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        MapError::OutOfRange { index, len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_codes() {
        let err = MapError::marker_not_found("marker-1-2");
        assert_eq!(err.error_code(), "not_found");
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("marker-1-2"));
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn test_out_of_range_message() {
        let err = MapError::index_out_of_range(7, 3);
        assert_eq!(err.to_string(), "snapshot index 7 out of range (history has 3 snapshots)");
        assert_eq!(err.error_code(), "out_of_range");
    }
}
