//! Twelve-factor example service entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use twelve_factor::api::{create_router, static_router, AppState};
use twelve_factor::config::{CharmConfig, ServerConfig};
use twelve_factor::metrics;
use twelve_factor::status::{CheckOutcome, Integration, StatusChecker};
use twelve_factor::utils::{redact_url, shutdown_signal};

/// Twelve-factor example service.
#[derive(Parser, Debug)]
#[command(name = "twelve-factor")]
#[command(about = "Example HTTP service configured entirely from the environment")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API and the metrics exporter (default).
    Run {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Metrics exporter port (overrides METRICS_PORT).
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Print the configuration loaded from the environment.
    CheckConfig,

    /// Run one integration status check and exit.
    CheckStatus {
        /// Integration to check (postgresql, mysql, s3, mongodb, redis).
        integration: Integration,
    },

    /// Serve a directory of static files.
    ServeStatic {
        /// Directory to serve (overrides STATIC_DIR).
        #[arg(long)]
        dir: Option<PathBuf>,

        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load server settings before logging so RUST_LOG from .env applies
    let server_config = ServerConfig::load()?;

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("twelve_factor=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&server_config.rust_log))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::CheckStatus { integration }) => cmd_check_status(integration).await,
        Some(Command::ServeStatic { dir, port }) => {
            let mut config = server_config;
            if let Some(dir) = dir {
                config.static_dir = dir;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_serve_static(config).await
        }
        Some(Command::Run { port, metrics_port }) => {
            let mut config = server_config;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(metrics_port) = metrics_port {
                config.metrics_port = metrics_port;
            }
            cmd_run(config).await
        }
        None => cmd_run(server_config).await,
    }
}

/// Print what the loader made of the environment.
fn cmd_check_config() -> anyhow::Result<()> {
    let config = CharmConfig::from_process_env();

    println!("======================================================================");
    println!("CONFIGURATION CHECK");
    println!("======================================================================");
    println!("Integrations:");
    match &config.integrations.postgresql_url {
        Some(url) => println!("  postgresql: {}", redact_url(url)),
        None => println!("  postgresql: not configured"),
    }
    for integration in [
        Integration::Mysql,
        Integration::S3,
        Integration::Mongodb,
        Integration::Redis,
    ] {
        println!("  {}: no check implemented", integration);
    }
    println!("----------------------------------------------------------------------");
    println!("Generic configs ({}):", config.configs.len());
    for entry in &config.configs {
        println!("  {}", entry.name);
    }
    println!("======================================================================");

    Ok(())
}

/// Run a single status check from the command line.
async fn cmd_check_status(integration: Integration) -> anyhow::Result<()> {
    let checker = StatusChecker::new(Arc::new(CharmConfig::from_process_env()));

    let outcome = checker.check(integration).await;

    match &outcome {
        CheckOutcome::Success { detail } => {
            println!("{}: SUCCESS", integration);
            if let Some(detail) = detail {
                println!("  {}", detail);
            }
        }
        CheckOutcome::Failure { reason } => {
            println!("{}: FAILURE", integration);
            println!("  Error: {}", reason);
        }
        CheckOutcome::Unimplemented => println!("{}: NOT IMPLEMENTED", integration),
    }

    if outcome.is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} status check did not pass", integration))
    }
}

/// Serve the API until a shutdown signal arrives.
async fn cmd_run(server_config: ServerConfig) -> anyhow::Result<()> {
    if let Err(e) = server_config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    // The recorder must be installed before any counter handle is taken
    let metrics_addr = SocketAddr::from(([0, 0, 0, 0], server_config.metrics_port));
    metrics::install_exporter(metrics_addr)?;
    metrics::init_metrics();

    info!("Loading configuration from environment...");
    let config = CharmConfig::from_process_env();
    info!(
        "Loaded {} generic configs, postgresql {}",
        config.configs.len(),
        if config.integrations.postgresql_url.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );

    let app_state = AppState::new(config, metrics::request_counter());
    let router = create_router(app_state);

    serve(router, server_config.port, server_config.shutdown_timeout()).await
}

/// Serve the static front end until a shutdown signal arrives.
async fn cmd_serve_static(server_config: ServerConfig) -> anyhow::Result<()> {
    if server_config.port == 0 {
        return Err(anyhow::anyhow!("PORT must not be 0"));
    }
    if !server_config.static_dir.is_dir() {
        warn!(
            "Static directory {} does not exist",
            server_config.static_dir.display()
        );
    }

    info!("Serving static files from {}", server_config.static_dir.display());
    let router = static_router(&server_config.static_dir);

    serve(router, server_config.port, server_config.shutdown_timeout()).await
}

/// Bind, serve, and drain in-flight requests within `shutdown_timeout`.
async fn serve(router: Router, port: u16, shutdown_timeout: Duration) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                stop_rx.await.ok();
            })
            .await
    });

    shutdown_signal().await;
    stop_tx.send(()).ok();

    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(Ok(Ok(()))) => info!("Graceful shutdown complete."),
        Ok(Ok(Err(e))) => {
            error!("HTTP server error: {}", e);
            return Err(e.into());
        }
        Ok(Err(e)) => {
            error!("HTTP server task failed: {}", e);
            return Err(e.into());
        }
        Err(_) => warn!(
            "Shutdown timed out after {}s, dropping open connections",
            shutdown_timeout.as_secs()
        ),
    }

    Ok(())
}
