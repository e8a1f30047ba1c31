use clap::{Parser, Subcommand};
use libmapmark_core::types::marker::DEFAULT_COLOR;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mapmark", about = "Versioned map markers with a shared history", version)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Work on the local history only (no server round trips)
    #[arg(long, global = true)]
    pub offline: bool,

    /// Server API base, e.g. http://localhost:8888/api
    #[arg(long, global = true, env = "MAPMARK_SERVER")]
    pub server: Option<String>,

    /// User label recorded in change descriptions
    #[arg(long, global = true, env = "MAPMARK_USER")]
    pub user: Option<String>,

    /// Override the local history file
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Config file (default: mapmark.toml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a marker at a normalized position
    Add {
        /// Horizontal position in [0, 1]
        x: f64,

        /// Vertical position in [0, 1]
        y: f64,

        /// Marker note
        #[arg(long, short, default_value = "")]
        note: String,

        /// Marker color as a hex string
        #[arg(long, short, default_value = DEFAULT_COLOR)]
        color: String,
    },

    /// Delete a marker from the latest snapshot
    Delete {
        /// Marker ID
        id: String,
    },

    /// Show the markers of a snapshot (default: latest)
    List {
        /// Snapshot index to browse
        #[arg(long)]
        at: Option<usize>,
    },

    /// Show the snapshot history
    History,

    /// Replace the local history with the server's
    Pull,

    /// Upload the whole local history to the server
    Push,
}
