//! Pull command implementation

use libmapmark_core::MapError;
use serde::Serialize;
use crate::cli::Cli;
use crate::commands::fail_on_sync_error;
use crate::context::open_session;
use crate::output::{output_success, print_human, report_notices};

#[derive(Serialize)]
struct PullOutput {
    snapshots: usize,
    markers: usize,
}

pub async fn run(cli: &Cli) -> Result<(), MapError> {
    let mut session = open_session(cli)?;
    session.request_fetch()?;

    let notices = session.wait_idle().await;
    fail_on_sync_error(&notices)?;
    report_notices(cli, &notices);

    let log = session.log();
    print_human(
        cli,
        &format!(
            "Pulled {} snapshots ({} markers at tip)",
            log.len(),
            log.live_count()
        ),
    );

    output_success(
        cli,
        PullOutput {
            snapshots: log.len(),
            markers: log.live_count(),
        },
    );
    Ok(())
}
