//! mcg-api - Mochi Card Generator service
//!
//! Accepts free-text notes over HTTP, turns them into validated
//! question/answer flashcards via a generative backend, and proxies deck and
//! card creation to the Mochi flashcard service.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use mcg_common::config::{ConfigOverrides, LoggingConfig, ServiceConfig};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcg_api::{build_router, AppState};

/// Command-line arguments for mcg-api
#[derive(Parser, Debug)]
#[command(name = "mcg-api")]
#[command(about = "Flashcard generation service with Mochi integration")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MCG_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "MCG_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MCG_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MCG_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServiceConfig::load(ConfigOverrides {
        config_path: args.config,
        host: args.host,
        port: args.port,
        log_level: args.log_level,
    })
    .context("Failed to load configuration")?;

    // Guard must live until shutdown so buffered file logs are flushed
    let _log_guard = init_tracing(&config.logging)?;

    info!(
        "Starting Mochi Card Generator (mcg-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Absent credentials are reported on first use, not here
    if config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY not configured; generation requests will fail");
    }
    if config.mochi.api_key.is_none() {
        warn!("MOCHI_API_KEY not configured; Mochi requests will fail");
    }

    let state = AppState::from_config(&config).context("Failed to initialize service")?;
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("mcg-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing: stderr always, plus a log file when configured
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &logging.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            info!("Logging to file {}", path.display());
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
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
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
