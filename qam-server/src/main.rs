//! qam-server - Q&A maintenance backend
//!
//! Serves the operator API for the chat knowledge base: content export and
//! bulk import, classifier training and testing, speech customization
//! management and the feedback log.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use qam_common::config::{LoggingConfig, TomlConfig};
use qam_server::services::feedback::ensure_feedback_log;
use qam_server::{build_router, AppState, Backends, ServerOptions};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for qam-server
#[derive(Parser, Debug)]
#[command(name = "qam-server")]
#[command(about = "Q&A knowledge base maintenance service")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "QAM_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "QAM_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "QAM_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, env = "QAM_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loading logs through a temporary console subscriber; the real
    // one depends on the loaded logging section
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        TomlConfig::load(args.config.as_deref())
    })
    .context("Failed to load configuration")?;
    args.apply(&mut config);

    init_tracing(&config.logging)?;

    info!(
        "Starting qam-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config.validate().context("Invalid configuration")?;

    let backends = Backends::from_config(&config).context("Failed to create service clients")?;
    info!(
        content = %config.cloudant.content_database,
        feedback = %config.cloudant.feedback_database,
        "Document store clients ready"
    );

    // The feedback log is written by chat clients; a failure here only
    // affects /feedback
    match ensure_feedback_log(backends.feedback.as_ref()).await {
        Ok(()) => info!("✓ Feedback log ready"),
        Err(e) => warn!("Feedback log setup failed: {} {}", e, e.payload()),
    }

    let state = AppState::new(backends, ServerOptions::from_config(&config));
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("qam-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Console logging plus an optional log file
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;

    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
