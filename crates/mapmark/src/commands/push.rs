//! Push command implementation

use libmapmark_core::MapError;
use libmapmark_sync::SyncNotice;
use serde::Serialize;
use crate::cli::Cli;
use crate::commands::fail_on_sync_error;
use crate::context::open_session;
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct PushOutput {
    snapshots: usize,
    message: String,
}

pub async fn run(cli: &Cli) -> Result<(), MapError> {
    let mut session = open_session(cli)?;
    let count = session.log().len();
    session.request_push_all()?;

    let notices = session.wait_idle().await;
    fail_on_sync_error(&notices)?;

    let message = notices
        .into_iter()
        .find_map(|n| match n {
            SyncNotice::BatchUploaded { message } => Some(message),
            _ => None,
        })
        .unwrap_or_default();
    print_human(cli, &message);

    output_success(
        cli,
        PushOutput {
            snapshots: count,
            message,
        },
    );
    Ok(())
}
