//! mapmark-server - shared snapshot history for mapmark clients

use std::path::PathBuf;

use clap::Parser;
use libmapmark_core::config::load_config;
use libmapmark_core::{MapError, ServerConfig};
use mapmark_server::{serve, AppState};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Config file read when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "mapmark-server.toml";

#[derive(Parser)]
#[command(name = "mapmark-server", about = "Shared map marker history server", version)]
struct Cli {
    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind (default 0.0.0.0)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (default 8888)
    #[arg(long, short)]
    port: Option<u16>,

    /// History file (default map_data.json)
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Save via temp file + rename instead of rewriting in place
    #[arg(long)]
    atomic_writes: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn resolve_config(&self) -> Result<ServerConfig, MapError> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config: ServerConfig = load_config(&path)?;

        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data_file) = &self.data_file {
            config.data_file = data_file.clone();
        }
        if self.atomic_writes {
            config.atomic_writes = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    info!(data_file = %config.data_file.display(), atomic_writes = config.atomic_writes, "mapmark-server starting");
    let state = AppState::from_config(&config);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on http://{}/api", addr);

    if let Err(e) = serve(listener, state, setup_signal_handlers()).await {
        error!("Server error: {}", e);
    }

    info!("mapmark-server stopped");
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers() -> impl std::future::Future<Output = ()> {
    async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
        info!("Received shutdown signal");
    }
}
