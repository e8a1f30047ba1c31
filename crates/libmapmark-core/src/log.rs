//! The version log: linear snapshot history plus a view cursor
//!
//! History is append-only. The cursor selects which snapshot is on display;
//! moving it never touches history. Every mutation first forwards the cursor
//! to the tip (auto-forward), so edits always build on the newest snapshot and
//! history never branches.

use tracing::{debug, info};

use crate::error::MapError;
use crate::types::marker::Marker;
use crate::types::snapshot::Snapshot;

/// Working marker set, in snapshot order.
///
/// Ids are not assumed unique: snapshots supplied from outside may carry
/// markers that share an id or have none, and every one of them is kept.
pub type MarkerSet = Vec<Marker>;

/// Where the cursor sits relative to the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogState {
    /// No snapshots yet
    Empty,
    /// Cursor is on the newest snapshot; mutations apply here
    AtTip,
    /// Cursor is on an older snapshot; a mutation forwards to the tip first
    Browsing,
}

/// Change notifications for the display layer.
///
/// Listeners should ignore variants they do not care about.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// A snapshot was appended at `index`
    SnapshotCreated { index: usize, snapshot_id: String },
    /// The cursor moved to `index`
    CursorMoved { index: usize, snapshot_id: String },
    /// The live marker set changed
    MarkersChanged { markers: Vec<Marker> },
    /// History was replaced wholesale (sync pull) or extended by a batch
    HistoryReplaced { len: usize },
}

impl LogEvent {
    /// Get the event type as a string (for filtering)
    pub fn event_type(&self) -> &'static str {
        match self {
            LogEvent::SnapshotCreated { .. } => "SnapshotCreated",
            LogEvent::CursorMoved { .. } => "CursorMoved",
            LogEvent::MarkersChanged { .. } => "MarkersChanged",
            LogEvent::HistoryReplaced { .. } => "HistoryReplaced",
        }
    }
}

type Listener = Box<dyn FnMut(&LogEvent) + Send>;

/// Local snapshot history with a view cursor.
///
/// A `VersionLog` is an ordinary owned value: pass it where it is needed and
/// wrap it in a lock if it must be shared.
#[derive(Default)]
pub struct VersionLog {
    history: Vec<Snapshot>,
    cursor: Option<usize>,
    live: MarkerSet,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for VersionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionLog")
            .field("len", &self.history.len())
            .field("cursor", &self.cursor)
            .field("live", &self.live.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl VersionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from a previously persisted history, positioned at its tip
    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Self {
        let mut log = Self::new();
        log.load_from_external_log(snapshots);
        log
    }

    /// Register a change listener
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&LogEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> LogState {
        match self.cursor {
            None => LogState::Empty,
            Some(i) if i + 1 == self.history.len() => LogState::AtTip,
            Some(_) => LogState::Browsing,
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Full history, oldest first
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn snapshot_at(&self, index: usize) -> Option<&Snapshot> {
        self.history.get(index)
    }

    /// Newest snapshot
    pub fn tip(&self) -> Option<&Snapshot> {
        self.history.last()
    }

    /// Index of the snapshot on display
    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|i| self.history.get(i))
    }

    /// Markers of the snapshot on display, in snapshot order
    pub fn live_markers(&self) -> impl Iterator<Item = &Marker> {
        self.live.iter()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Find a marker in the live set, falling back to the snapshot on display
    pub fn find(&self, marker_id: &str) -> Option<&Marker> {
        self.live
            .iter()
            .find(|m| m.id == marker_id)
            .or_else(|| self.current_snapshot().and_then(|s| s.find(marker_id)))
    }

    /// Apply `mutate` to the tip's marker set and append the result.
    ///
    /// If the log is browsing, the cursor is forwarded to the tip before
    /// `mutate` runs. If `mutate` fails nothing is appended.
    pub fn commit<F>(&mut self, mutate: F, description: impl Into<String>) -> Result<&Snapshot, MapError>
    where
        F: FnOnce(&mut MarkerSet) -> Result<(), MapError>,
    {
        if self.state() == LogState::Browsing {
            debug!(cursor = ?self.cursor, tip = self.history.len() - 1, "forwarding to tip before mutation");
            self.restore_latest();
        }

        let mut next = self.live.clone();
        mutate(&mut next)?;

        let snapshot = Snapshot::new(next.clone(), description);
        let snapshot_id = snapshot.snapshot_id().to_string();
        self.history.push(snapshot);
        let index = self.history.len() - 1;
        self.cursor = Some(index);
        self.live = next;

        self.emit(LogEvent::SnapshotCreated {
            index,
            snapshot_id: snapshot_id.clone(),
        });
        self.emit(LogEvent::CursorMoved { index, snapshot_id });
        self.emit_markers();

        Ok(&self.history[index])
    }

    /// Add a marker at the tip. Never refuses while browsing; it forwards instead.
    ///
    /// A marker whose id is already present replaces the first marker with
    /// that id in place; otherwise it is appended.
    pub fn add_marker(&mut self, mut marker: Marker, actor: &str) -> Result<&Snapshot, MapError> {
        marker.ensure_id();
        let description = describe("Added marker", &marker.note_preview(), actor);
        let marker_id = marker.id.clone();

        let snapshot = self.commit(
            move |set| {
                match set.iter_mut().find(|m| m.id == marker.id) {
                    Some(existing) => *existing = marker,
                    None => set.push(marker),
                }
                Ok(())
            },
            description,
        )?;
        info!(marker_id = %marker_id, total = snapshot.marker_count(), "marker added");
        Ok(snapshot)
    }

    /// Delete a marker at the tip. Only the first marker with that id is
    /// removed.
    ///
    /// Fails with `EmptyLog` on an empty log and `NotFound` if the id is absent
    /// from the live set or from the tip; history and cursor are untouched on
    /// failure.
    pub fn delete_marker(&mut self, marker_id: &str, actor: &str) -> Result<&Snapshot, MapError> {
        if self.is_empty() {
            debug!(marker_id, "cannot delete marker: history is empty");
            return Err(MapError::EmptyLog);
        }
        let in_live = self.live.iter().any(|m| m.id == marker_id);
        let tip_marker = match self.tip().and_then(|s| s.find(marker_id)) {
            Some(m) if in_live => m,
            _ => {
                debug!(marker_id, "cannot delete marker: not found");
                return Err(MapError::marker_not_found(marker_id));
            }
        };
        let description = describe("Deleted marker", &tip_marker.note_preview(), actor);

        let snapshot = self.commit(
            |set| {
                let pos = set
                    .iter()
                    .position(|m| m.id == marker_id)
                    .ok_or_else(|| MapError::marker_not_found(marker_id))?;
                set.remove(pos);
                Ok(())
            },
            description,
        )?;
        info!(marker_id, total = snapshot.marker_count(), "marker deleted");
        Ok(snapshot)
    }

    /// Move the cursor to `index`. A pure view change.
    pub fn restore(&mut self, index: usize) -> Result<(), MapError> {
        let Some(snapshot) = self.history.get(index) else {
            debug!(index, len = self.history.len(), "invalid snapshot index");
            return Err(MapError::index_out_of_range(index, self.history.len()));
        };

        let snapshot_id = snapshot.snapshot_id().to_string();
        self.live = snapshot.markers().to_vec();
        self.cursor = Some(index);
        debug!(index, snapshot_id = %snapshot_id, "restored snapshot");

        self.emit(LogEvent::CursorMoved { index, snapshot_id });
        self.emit_markers();
        Ok(())
    }

    /// Move the cursor to the tip. No-op on an empty log.
    pub fn restore_latest(&mut self) {
        if let Some(last) = self.history.len().checked_sub(1) {
            // In range by construction
            let _ = self.restore(last);
        }
    }

    /// Replace the whole history with an externally supplied sequence, then
    /// move to its tip. The supplied order is trusted as-is.
    pub fn load_from_external_log(&mut self, snapshots: Vec<Snapshot>) {
        info!(count = snapshots.len(), "loading external history");
        self.history = snapshots;
        self.cursor = None;
        self.live.clear();
        self.emit(LogEvent::HistoryReplaced {
            len: self.history.len(),
        });

        if self.history.is_empty() {
            self.emit_markers();
        } else {
            self.restore_latest();
        }
    }

    /// Append externally supplied snapshots verbatim (batch merge), then move
    /// to the new tip. No deduplication or ordering checks are made.
    pub fn append_verbatim(&mut self, snapshots: Vec<Snapshot>) -> usize {
        let count = snapshots.len();
        self.history.extend(snapshots);
        info!(count, len = self.history.len(), "appended snapshots verbatim");
        self.emit(LogEvent::HistoryReplaced {
            len: self.history.len(),
        });
        self.restore_latest();
        count
    }

    fn emit_markers(&mut self) {
        let markers = self.live.clone();
        self.emit(LogEvent::MarkersChanged { markers });
    }

    fn emit(&mut self, event: LogEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

/// Build a change description such as `Added marker: gate (by alice)`
pub fn describe(action: &str, note_preview: &str, actor: &str) -> String {
    let mut description = format!("{}: {}", action, note_preview);
    if !actor.is_empty() {
        description.push_str(&format!(" (by {})", actor));
    }
    description
}
