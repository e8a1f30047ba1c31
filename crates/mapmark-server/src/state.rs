//! Shared server state: one version log for every connection

use std::sync::{Arc, Mutex, MutexGuard};

use libmapmark_core::{
    JsonFileStore, Marker, ServerConfig, Snapshot, SnapshotStore, VersionLog, WriteMode,
};
use tracing::{debug, error, info, warn};

use crate::error::ServerError;

/// Cloneable handle to the server's log and store.
///
/// The mutex covers the in-memory mutation only. Each request clones the
/// history it produced and saves it on the blocking pool after the lock is
/// released, so two racing writers can still overwrite each other on disk
/// (whichever save finishes last wins).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Shared>,
}

struct Shared {
    log: Mutex<VersionLog>,
    store: Box<dyn SnapshotStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("log", &*self.lock())
            .finish()
    }
}

impl AppState {
    /// Load the history from `store`. Unreadable data is logged and the
    /// server starts with an empty log.
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        let history = match store.load() {
            Ok(history) => {
                info!(count = history.len(), "loaded snapshot history");
                history
            }
            Err(e) => {
                warn!(error = %e, "could not load snapshot history, starting empty");
                Vec::new()
            }
        };

        Self {
            inner: Arc::new(Shared {
                log: Mutex::new(VersionLog::from_snapshots(history)),
                store,
            }),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let mode = if config.atomic_writes {
            WriteMode::AtomicRename
        } else {
            WriteMode::Overwrite
        };
        Self::new(Box::new(JsonFileStore::with_mode(&config.data_file, mode)))
    }

    /// Full history, oldest first
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.lock().snapshots().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Add `marker` to the latest set. An empty id is filled in; the stored
    /// form is returned.
    pub async fn add_marker(&self, mut marker: Marker, actor: &str) -> Result<Marker, ServerError> {
        if marker.ensure_id() {
            debug!(marker_id = %marker.id, "assigned id to posted marker");
        }

        let history = {
            let mut log = self.lock();
            log.add_marker(marker.clone(), actor)?;
            log.snapshots().to_vec()
        };
        self.persist(history).await;
        Ok(marker)
    }

    /// Remove `marker_id` from the latest set
    pub async fn delete_marker(&self, marker_id: &str, actor: &str) -> Result<(), ServerError> {
        let history = {
            let mut log = self.lock();
            log.delete_marker(marker_id, actor)?;
            log.snapshots().to_vec()
        };
        self.persist(history).await;
        Ok(())
    }

    /// Append `snapshots` verbatim, in request order
    pub async fn append_batch(&self, snapshots: Vec<Snapshot>) -> usize {
        let (count, history) = {
            let mut log = self.lock();
            let count = log.append_verbatim(snapshots);
            (count, log.snapshots().to_vec())
        };
        self.persist(history).await;
        count
    }

    fn lock(&self) -> MutexGuard<'_, VersionLog> {
        // A panic mid-mutation leaves the log consistent: commit appends last
        self.inner.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Save `history` off the async workers. Failure is logged only; the
    /// in-memory log keeps the mutation.
    async fn persist(&self, history: Vec<Snapshot>) {
        let inner = Arc::clone(&self.inner);
        let count = history.len();
        match tokio::task::spawn_blocking(move || inner.store.save(&history)).await {
            Ok(Ok(())) => debug!(count, "saved snapshot history"),
            Ok(Err(e)) => error!(error = %e, "failed to save snapshot history"),
            Err(e) => error!(error = %e, "save task failed"),
        }
    }
}
