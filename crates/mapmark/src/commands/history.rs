//! History command implementation

use libmapmark_core::MapError;
use serde::Serialize;
use crate::cli::Cli;
use crate::context::open_local;
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct HistoryOutput {
    snapshots: Vec<SnapshotInfo>,
}

#[derive(Serialize)]
struct SnapshotInfo {
    index: usize,
    snapshot_id: String,
    timestamp: String,
    description: String,
    marker_count: usize,
}

pub async fn run(cli: &Cli) -> Result<(), MapError> {
    let session = open_local(cli)?;
    let log = session.log();

    let snapshots: Vec<SnapshotInfo> = log
        .snapshots()
        .iter()
        .enumerate()
        .map(|(index, s)| SnapshotInfo {
            index,
            snapshot_id: s.snapshot_id().to_string(),
            timestamp: s.timestamp().to_rfc3339(),
            description: s.description().to_string(),
            marker_count: s.marker_count(),
        })
        .collect();

    if snapshots.is_empty() {
        print_human(cli, "No snapshots");
    }
    for (info, snapshot) in snapshots.iter().zip(log.snapshots()) {
        let marker = if Some(info.index) == log.current_index() { "*" } else { " " };
        print_human(
            cli,
            &format!(
                "{}{:>4}  {}  {:>3} markers  {}",
                marker,
                info.index,
                snapshot.timestamp().format("%Y-%m-%d %H:%M:%S"),
                info.marker_count,
                info.description
            ),
        );
    }

    output_success(cli, HistoryOutput { snapshots });
    Ok(())
}
