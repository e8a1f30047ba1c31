//! List command implementation

use libmapmark_core::{LogState, MapError};
use serde::Serialize;
use crate::cli::Cli;
use crate::commands::{format_marker, MarkerInfo};
use crate::context::open_local;
use crate::output::output_success;

#[derive(Serialize)]
struct ListOutput {
    snapshot_index: Option<usize>,
    snapshot_count: usize,
    browsing: bool,
    description: Option<String>,
    markers: Vec<MarkerInfo>,
}

pub async fn run(cli: &Cli, at: Option<usize>) -> Result<(), MapError> {
    let mut session = open_local(cli)?;
    if let Some(index) = at {
        session.log_mut().restore(index)?;
    }

    let log = session.log();
    let description = log.current_snapshot().map(|s| s.description().to_string());
    let browsing = log.state() == LogState::Browsing;

    if !cli.json && !cli.quiet {
        match (log.current_index(), &description) {
            (Some(index), Some(desc)) => {
                let mark = if browsing { " (browsing)" } else { "" };
                println!("Snapshot {} of {}{}: {}", index, log.len(), mark, desc);
            }
            _ => println!("No snapshots"),
        }
        for marker in log.live_markers() {
            println!("  {}", format_marker(marker));
        }
        if log.live_count() == 0 && !log.is_empty() {
            println!("  (no markers)");
        }
    }

    output_success(
        cli,
        ListOutput {
            snapshot_index: log.current_index(),
            snapshot_count: log.len(),
            browsing,
            description,
            markers: log.live_markers().map(MarkerInfo::from).collect(),
        },
    );
    Ok(())
}
