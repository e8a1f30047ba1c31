//! Core library for mapmark
//!
//! This crate provides:
//! - Marker and Snapshot value types with their JSON wire shape
//! - VersionLog, the append-only history with a browse cursor
//! - Snapshot stores (JSON file, in-memory)
//! - Client and server configuration
//! - Wire protocol paths and response bodies

pub mod config;
pub mod error;
pub mod log;
pub mod protocol;
pub mod store;
pub mod types;

pub use config::{ClientConfig, ServerConfig};
pub use error::MapError;
pub use log::{LogEvent, LogState, MarkerSet, VersionLog};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore, WriteMode};
pub use types::marker::Marker;
pub use types::snapshot::Snapshot;
