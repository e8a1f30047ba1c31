//! Resolve configuration and open the session for a command

use std::path::PathBuf;

use libmapmark_core::config::load_config;
use libmapmark_core::{ClientConfig, MapError};
use libmapmark_sync::SyncSession;
use tracing::debug;

use crate::cli::Cli;

/// Config file read when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "mapmark.toml";

/// Config file values, overridden by flags and environment
pub fn resolve_config(cli: &Cli) -> Result<ClientConfig, MapError> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config: ClientConfig = load_config(&path)?;

    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(user) = &cli.user {
        config.user = Some(user.clone());
    }
    if let Some(data_file) = &cli.data_file {
        config.data_file = data_file.clone();
    }

    debug!(config = ?config, "resolved client config");
    Ok(config)
}

/// Open a session that mirrors to the server unless `--offline`
pub fn open_session(cli: &Cli) -> Result<SyncSession, MapError> {
    let config = resolve_config(cli)?;
    SyncSession::open(&config, cli.offline)
}

/// Open a session for read-only commands, which never touch the server
pub fn open_local(cli: &Cli) -> Result<SyncSession, MapError> {
    let config = resolve_config(cli)?;
    SyncSession::open(&config, true)
}
