//! Snapshot persistence
//!
//! A store maps the full ordered snapshot sequence to and from durable
//! storage. `save` always rewrites everything; there is no incremental append.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::error::MapError;
use crate::types::lenient;
use crate::types::snapshot::Snapshot;

/// Durable home of a snapshot history
pub trait SnapshotStore: Send + Sync {
    /// Load the full history. A store with no prior data yields an empty vec.
    fn load(&self) -> Result<Vec<Snapshot>, MapError>;

    /// Replace the stored history with `snapshots`
    fn save(&self, snapshots: &[Snapshot]) -> Result<(), MapError>;
}

/// How `JsonFileStore` writes the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and rewrite in place. A crash mid-write can leave a torn file.
    #[default]
    Overwrite,
    /// Write a sibling temp file, then rename it over the data file
    AtomicRename,
}

/// Store backed by a single JSON document whose top level is the snapshot array
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    mode: WriteMode,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_mode(path, WriteMode::default())
    }

    pub fn with_mode(path: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Snapshot>, MapError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "data file not found, starting with empty history");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let snapshots: Vec<Snapshot> = lenient::records(serde_json::from_str(&content)?)?;
        info!(path = %self.path.display(), count = snapshots.len(), "loaded snapshots");
        Ok(snapshots)
    }

    fn save(&self, snapshots: &[Snapshot]) -> Result<(), MapError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(snapshots)?;

        match self.mode {
            WriteMode::Overwrite => std::fs::write(&self.path, content)?,
            WriteMode::AtomicRename => {
                let tmp = self.temp_path();
                std::fs::write(&tmp, content)?;
                std::fs::rename(&tmp, &self.path)?;
            }
        }

        debug!(path = %self.path.display(), count = snapshots.len(), "saved snapshots");
        Ok(())
    }
}

/// In-memory store, for tests and ephemeral logs. Clones share contents.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(snapshots: Vec<Snapshot>) -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(snapshots)),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Vec<Snapshot>, MapError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|_| MapError::Internal("memory store poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, snapshots: &[Snapshot]) -> Result<(), MapError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|_| MapError::Internal("memory store poisoned".to_string()))?;
        *guard = snapshots.to_vec();
        Ok(())
    }
}
