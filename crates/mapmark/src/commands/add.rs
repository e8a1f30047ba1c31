//! Add command implementation

use libmapmark_core::MapError;
use serde::Serialize;

use crate::cli::Cli;
use crate::commands::{failure_messages, MarkerInfo};
use crate::context::open_session;
use crate::output::{output_success, print_human, report_notices};

#[derive(Serialize)]
struct AddOutput {
    marker: MarkerInfo,
    snapshot_index: usize,
    description: String,
    synced: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

pub async fn run(cli: &Cli, x: f64, y: f64, note: &str, color: &str) -> Result<(), MapError> {
    for (axis, value) in [("x", x), ("y", y)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(MapError::InvalidArgs(format!(
                "{} must be in [0, 1], got {}",
                axis, value
            )));
        }
    }

    let mut session = open_session(cli)?;
    let marker = session.add_marker(x, y, note, color)?;

    let notices = session.wait_idle().await;
    report_notices(cli, &notices);
    let warnings = failure_messages(&notices);

    let log = session.log();
    let description = log
        .tip()
        .map(|s| s.description().to_string())
        .unwrap_or_default();

    print_human(cli, &format!("Added marker {}", marker.id));

    output_success(
        cli,
        AddOutput {
            marker: MarkerInfo::from(&marker),
            snapshot_index: log.len().saturating_sub(1),
            description,
            synced: session.is_online() && warnings.is_empty(),
            warnings,
        },
    );
    Ok(())
}
