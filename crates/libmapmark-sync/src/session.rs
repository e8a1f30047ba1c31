//! A local history mirrored to a shared server
//!
//! `SyncSession` owns the `VersionLog`, the local store and the client. Local
//! mutations commit and persist immediately; the matching network call runs
//! on a spawned task and reports back through a channel. Completions are only
//! applied to the log by the session owner (`poll_completions`, `next_notice`,
//! `wait_idle`), so network tasks never touch the log directly.

use libmapmark_core::{
    ClientConfig, JsonFileStore, MapError, Marker, Snapshot, SnapshotStore, VersionLog,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::SyncClient;
use crate::error::SyncError;

/// Result of one network round trip
#[derive(Debug)]
pub enum Completion {
    Fetched(Result<Vec<Snapshot>, SyncError>),
    MarkerAdded(Result<Marker, SyncError>),
    MarkerDeleted(Result<String, SyncError>),
    BatchUploaded(Result<String, SyncError>),
}

/// What the session owner should tell the user
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    /// Remote history replaced the local one
    Pulled { count: usize },
    /// Server stored a marker
    MarkerAdded { marker_id: String },
    /// Server deleted a marker
    MarkerDeleted { marker_id: String },
    /// Server accepted a batch
    BatchUploaded { message: String },
    /// A round trip failed; local state is unchanged by it
    SyncFailed { operation: &'static str, message: String },
    /// The local store could not be written; memory still holds the change
    PersistFailed { message: String },
}

impl SyncNotice {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SyncNotice::SyncFailed { .. } | SyncNotice::PersistFailed { .. }
        )
    }

    /// Short human-readable message
    pub fn message(&self) -> String {
        match self {
            SyncNotice::Pulled { count } => format!("Pulled {} snapshots from server", count),
            SyncNotice::MarkerAdded { marker_id } => format!("Server stored marker {}", marker_id),
            SyncNotice::MarkerDeleted { marker_id } => {
                format!("Server deleted marker {}", marker_id)
            }
            SyncNotice::BatchUploaded { message } => message.clone(),
            SyncNotice::SyncFailed { operation, message } => {
                format!("{} failed: {}", operation, message)
            }
            SyncNotice::PersistFailed { message } => {
                format!("Could not save local history: {}", message)
            }
        }
    }
}

/// Local version log + store + optional remote
pub struct SyncSession {
    log: VersionLog,
    store: Option<Box<dyn SnapshotStore>>,
    client: Option<SyncClient>,
    actor: String,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    pending: Vec<SyncNotice>,
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("log", &self.log)
            .field("client", &self.client)
            .field("actor", &self.actor)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl SyncSession {
    /// Assemble a session from parts. The log is loaded from `store` if given.
    pub fn new(
        store: Option<Box<dyn SnapshotStore>>,
        client: Option<SyncClient>,
        actor: impl Into<String>,
    ) -> Result<Self, MapError> {
        let history = match &store {
            Some(store) => store.load()?,
            None => Vec::new(),
        };
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            log: VersionLog::from_snapshots(history),
            store,
            client,
            actor: actor.into(),
            tx,
            rx,
            in_flight: 0,
            pending: Vec::new(),
        })
    }

    /// Open the local data file named in `config`; `offline` skips the server
    pub fn open(config: &ClientConfig, offline: bool) -> Result<Self, MapError> {
        let store: Box<dyn SnapshotStore> = Box::new(JsonFileStore::new(&config.data_file));
        let client = if offline {
            None
        } else {
            Some(SyncClient::from_config(config)?)
        };
        Self::new(Some(store), client, config.actor())
    }

    pub fn log(&self) -> &VersionLog {
        &self.log
    }

    /// Mutable access for view changes (`restore`, listeners)
    pub fn log_mut(&mut self) -> &mut VersionLog {
        &mut self.log
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    /// Number of round trips not yet applied
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Create a marker, commit it locally, persist, and mirror it to the server
    pub fn add_marker(
        &mut self,
        x: f64,
        y: f64,
        note: &str,
        color: &str,
    ) -> Result<Marker, MapError> {
        let marker = Marker::new(x, y, note, color, self.actor.as_str());
        self.log.add_marker(marker.clone(), &self.actor)?;
        self.persist();

        if let Some(client) = self.client.clone() {
            let pushed = marker.clone();
            self.spawn(async move { Completion::MarkerAdded(client.push_marker_add(&pushed).await) });
        }
        Ok(marker)
    }

    /// Delete a marker locally, persist, and mirror the delete to the server
    pub fn delete_marker(&mut self, marker_id: &str) -> Result<(), MapError> {
        self.log.delete_marker(marker_id, &self.actor)?;
        self.persist();

        if let Some(client) = self.client.clone() {
            let id = marker_id.to_string();
            self.spawn(async move { Completion::MarkerDeleted(client.push_marker_delete(&id).await) });
        }
        Ok(())
    }

    /// Start fetching the remote history. It replaces the local one when applied.
    pub fn request_fetch(&mut self) -> Result<(), MapError> {
        let client = self.client.clone().ok_or(SyncError::Offline)?;
        self.spawn(async move { Completion::Fetched(client.fetch_all().await) });
        Ok(())
    }

    /// Start uploading the full local history as a batch
    pub fn request_push_all(&mut self) -> Result<(), MapError> {
        let client = self.client.clone().ok_or(SyncError::Offline)?;
        let snapshots = self.log.snapshots().to_vec();
        self.spawn(async move { Completion::BatchUploaded(client.push_batch(&snapshots).await) });
        Ok(())
    }

    /// Apply every completion that has already arrived, without waiting
    pub fn poll_completions(&mut self) -> Vec<SyncNotice> {
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(completion);
        }
        std::mem::take(&mut self.pending)
    }

    /// Wait for the next completion, apply it, and return what it produced.
    /// Returns `None` when nothing is in flight and no notice is queued.
    pub async fn next_notices(&mut self) -> Option<Vec<SyncNotice>> {
        if self.pending.is_empty() {
            if self.in_flight == 0 {
                return None;
            }
            let completion = self.rx.recv().await?;
            self.in_flight -= 1;
            self.apply(completion);
        }
        Some(std::mem::take(&mut self.pending))
    }

    /// Wait for every round trip in flight and return all notices, in order
    pub async fn wait_idle(&mut self) -> Vec<SyncNotice> {
        let mut notices = Vec::new();
        while let Some(batch) = self.next_notices().await {
            notices.extend(batch);
        }
        notices
    }

    /// Apply one completion to the log
    pub fn apply(&mut self, completion: Completion) {
        let notice = match completion {
            Completion::Fetched(Ok(snapshots)) => {
                let count = snapshots.len();
                self.log.load_from_external_log(snapshots);
                self.persist();
                info!(count, "pulled remote history");
                SyncNotice::Pulled { count }
            }
            Completion::MarkerAdded(Ok(marker)) => {
                debug!(marker_id = %marker.id, "server stored marker");
                SyncNotice::MarkerAdded {
                    marker_id: marker.id,
                }
            }
            Completion::MarkerDeleted(Ok(marker_id)) => {
                debug!(marker_id = %marker_id, "server deleted marker");
                SyncNotice::MarkerDeleted { marker_id }
            }
            Completion::BatchUploaded(Ok(message)) => {
                debug!(%message, "server accepted batch");
                SyncNotice::BatchUploaded { message }
            }
            Completion::Fetched(Err(e)) => failed("fetch", e),
            Completion::MarkerAdded(Err(e)) => failed("add marker", e),
            Completion::MarkerDeleted(Err(e)) => failed("delete marker", e),
            Completion::BatchUploaded(Err(e)) => failed("upload", e),
        };
        self.pending.push(notice);
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            // Receiver only goes away with the session
            let _ = tx.send(task.await);
        });
    }

    /// Best-effort write of the whole history. Failure is queued as a notice;
    /// the in-memory log is never rolled back.
    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(self.log.snapshots()) {
            warn!(error = %e, "failed to persist local history");
            self.pending.push(SyncNotice::PersistFailed {
                message: e.to_string(),
            });
        }
    }
}

fn failed(operation: &'static str, e: SyncError) -> SyncNotice {
    warn!(operation, error = %e, "sync round trip failed");
    SyncNotice::SyncFailed {
        operation,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libmapmark_core::MemoryStore;

    /// Store whose writes always fail, as on a full disk
    struct FullDiskStore;

    impl SnapshotStore for FullDiskStore {
        fn load(&self) -> Result<Vec<Snapshot>, MapError> {
            Ok(Vec::new())
        }

        fn save(&self, _snapshots: &[Snapshot]) -> Result<(), MapError> {
            Err(MapError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no space left on device",
            )))
        }
    }

    fn offline_session() -> SyncSession {
        SyncSession::new(Some(Box::new(MemoryStore::new())), None, "tester").unwrap()
    }

    #[test]
    fn test_offline_mutations_commit_and_persist() {
        let mut session = offline_session();
        let m = session.add_marker(0.2, 0.3, "well", "#0000ff").unwrap();
        assert_eq!(m.created_by, "tester");
        assert_eq!(session.log().len(), 1);
        assert_eq!(
            session.log().tip().unwrap().description(),
            "Added marker: well (by tester)"
        );

        session.delete_marker(&m.id).unwrap();
        assert_eq!(session.log().len(), 2);
        assert_eq!(session.in_flight(), 0);
        assert!(session.poll_completions().is_empty());
    }

    #[test]
    fn test_offline_fetch_is_refused() {
        let mut session = offline_session();
        let err = session.request_fetch().unwrap_err();
        assert!(matches!(err, MapError::Sync(_)));
        assert!(session.request_push_all().is_err());
    }

    #[test]
    fn test_delete_unknown_reports_not_found() {
        let mut session = offline_session();
        session.add_marker(0.5, 0.5, "a", "#000000").unwrap();
        let err = session.delete_marker("marker-0-0").unwrap_err();
        assert!(matches!(err, MapError::NotFound(_)));
        assert_eq!(session.log().len(), 1);
    }

    #[test]
    fn test_apply_fetch_replaces_history() {
        let mut session = offline_session();
        session.add_marker(0.5, 0.5, "local", "#000000").unwrap();

        let remote = vec![
            Snapshot::new(vec![], "one"),
            Snapshot::new(vec![Marker::new(0.1, 0.1, "r", "#111111", "")], "two"),
        ];
        session.apply(Completion::Fetched(Ok(remote.clone())));

        assert_eq!(session.log().snapshots(), &remote[..]);
        assert_eq!(session.poll_completions(), vec![SyncNotice::Pulled { count: 2 }]);
    }

    #[test]
    fn test_apply_failure_leaves_log() {
        let mut session = offline_session();
        session.add_marker(0.5, 0.5, "local", "#000000").unwrap();
        session.apply(Completion::Fetched(Err(SyncError::Status {
            status: 500,
            message: "boom".to_string(),
        })));

        assert_eq!(session.log().len(), 1);
        let notices = session.poll_completions();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_failure());
        assert_eq!(notices[0].message(), "fetch failed: Server returned 500: boom");
    }

    #[test]
    fn test_failed_persist_keeps_commit() {
        let mut session = SyncSession::new(Some(Box::new(FullDiskStore)), None, "").unwrap();
        let m = session.add_marker(0.4, 0.6, "kept", "#000000").unwrap();

        assert_eq!(session.log().len(), 1);
        assert!(session.log().find(&m.id).is_some());
        let notices = session.poll_completions();
        assert_eq!(notices.len(), 1);
        assert!(matches!(notices[0], SyncNotice::PersistFailed { .. }));
        assert!(notices[0].is_failure());

        session.delete_marker(&m.id).unwrap();
        assert_eq!(session.log().len(), 2);
        assert_eq!(session.log().live_count(), 0);
        assert_eq!(
            session.poll_completions(),
            vec![SyncNotice::PersistFailed {
                message: "IO error: no space left on device".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_wait_idle_with_nothing_in_flight() {
        let mut session = offline_session();
        assert!(session.wait_idle().await.is_empty());
    }
}
