//! Sync layer for mapmark
//!
//! This crate provides:
//! - `SyncClient`, one HTTP request per call against the history server
//! - `SyncSession`, a local version log that mirrors its mutations to the
//!   server and applies remote results on the owner's task
//! - `SyncError` for transport, status and decoding failures

pub mod client;
pub mod error;
pub mod session;

pub use client::SyncClient;
pub use error::SyncError;
pub use session::{Completion, SyncNotice, SyncSession};
