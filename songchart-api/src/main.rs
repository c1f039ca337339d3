//! songchart-api - REST service for the song chart catalog
//!
//! Serves `/api/v1/songs` backed by a single JSON catalog file. The catalog
//! is loaded once at startup; a catalog file that exists but cannot be
//! parsed stops the service before it binds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use songchart_common::config::{locate_config_file, CliOverrides, ServerConfig, TomlConfig};
use songchart_common::{SongRepository, SongStore};
use songchart_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songchart-api
#[derive(Parser, Debug)]
#[command(name = "songchart-api")]
#[command(about = "REST service for the song chart catalog")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(short, long, env = "SONGCHART_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SONGCHART_PORT")]
    port: Option<u16>,

    /// Catalog JSON file
    #[arg(short, long, env = "SONGCHART_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long, env = "SONGCHART_MAX_BODY_BYTES")]
    max_body_bytes: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SONGCHART_LOG_LEVEL")]
    log_level: Option<String>,

    /// TOML config file (default: <config dir>/songchart/config.toml)
    #[arg(short, long, env = "SONGCHART_CONFIG")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind_address: self.bind.clone(),
            port: self.port,
            data_file: self.data_file.clone(),
            max_body_bytes: self.max_body_bytes,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing exists so the log level can come from it
    let config_path = locate_config_file(args.config.as_deref());
    let toml = match &config_path {
        Some(path) => TomlConfig::from_file(path)?,
        None => TomlConfig::default(),
    };
    let config = ServerConfig::resolve(args.overrides(), toml);

    init_tracing(&config.log_level);

    info!(
        "Starting songchart-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let store = SongStore::new(config.data_file.clone());
    info!("Catalog file: {}", store.path().display());
    store
        .ensure_parent_dir()
        .context("Failed to create data directory")?;

    let repository = match SongRepository::open(store) {
        Ok(repository) => Arc::new(repository),
        Err(e) => {
            error!("Failed to load catalog: {}", e);
            return Err(e).context("Failed to load songs");
        }
    };

    let state = AppState::new(repository).with_max_body_bytes(config.max_body_bytes);
    let app = build_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("songchart-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins; otherwise `level` applies to this service's crates
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "songchart_api={level},songchart_common={level},tower_http={level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
