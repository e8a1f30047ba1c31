use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Default remote API base
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8888/api";

/// Default server port
pub const DEFAULT_PORT: u16 = 8888;

/// Default server data file
pub const DEFAULT_SERVER_DATA_FILE: &str = "map_data.json";

/// Default client data file
pub const DEFAULT_CLIENT_DATA_FILE: &str = "mapmark_local.json";

/// Client configuration, usually `mapmark.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the remote API, including the `/api` prefix
    pub server_url: String,
    /// Optional user label, sent as `X-User` and recorded in descriptions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Local history file
    pub data_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            user: None,
            data_file: PathBuf::from(DEFAULT_CLIENT_DATA_FILE),
        }
    }
}

impl ClientConfig {
    /// User label, or the empty string when none is configured
    pub fn actor(&self) -> &str {
        self.user.as_deref().unwrap_or("")
    }
}

/// Server configuration, usually `mapmark-server.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Shared history file
    pub data_file: PathBuf,
    /// Write the data file via temp file + rename
    pub atomic_writes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_SERVER_DATA_FILE),
            atomic_writes: false,
        }
    }
}

/// Load a TOML config file. A missing file yields the defaults.
pub fn load_config<T>(path: &Path) -> Result<T, MapError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}
