//! Delete command implementation

use libmapmark_core::MapError;
use serde::Serialize;
use crate::cli::Cli;
use crate::commands::failure_messages;
use crate::context::open_session;
use crate::output::{output_success, print_human, report_notices};

#[derive(Serialize)]
struct DeleteOutput {
    marker_id: String,
    snapshot_index: usize,
    synced: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

pub async fn run(cli: &Cli, id: &str) -> Result<(), MapError> {
    let mut session = open_session(cli)?;
    session.delete_marker(id)?;

    let notices = session.wait_idle().await;
    report_notices(cli, &notices);
    let warnings = failure_messages(&notices);

    print_human(cli, &format!("Deleted marker {}", id));

    output_success(
        cli,
        DeleteOutput {
            marker_id: id.to_string(),
            snapshot_index: session.log().len().saturating_sub(1),
            synced: session.is_online() && warnings.is_empty(),
            warnings,
        },
    );
    Ok(())
}
