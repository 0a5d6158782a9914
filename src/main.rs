//! QuorumLog - Replicated Append-Only Message Log

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quorumlog::api;
use quorumlog::config::QuorumLogConfig;
use quorumlog::error::Result;
use quorumlog::primary::{Coordinator, Replicator};
use quorumlog::rpc::RpcServer;
use quorumlog::secondary::{OrderedStorage, SecondaryHandler};

/// QuorumLog - replicated append-only message log
#[derive(Parser)]
#[command(name = "quorumlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "quorumlog.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as the primary node: accepts writes, fans out to secondaries
    Primary,

    /// Run as a secondary node: accepts replicated appends
    Secondary,

    /// Validate a configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    match cli.command {
        Commands::Primary => run_primary(cli.config).await,
        Commands::Secondary => run_secondary(cli.config).await,
        Commands::Validate => run_validate(cli.config),
    }
}

fn init_logging(level: &str) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_primary(config_path: PathBuf) -> Result<()> {
    let config = QuorumLogConfig::from_file(&config_path)?;
    config.validate_primary()?;

    tracing::info!(
        "Starting primary node, {} secondaries configured",
        config.primary.secondary_hosts.len()
    );

    let replicator = Arc::new(Replicator::new(
        config.primary.secondary_hosts.clone(),
        Duration::from_secs(config.primary.rpc_timeout_seconds),
        Duration::from_secs(config.primary.heartbeat_timeout_seconds),
        Duration::from_secs(config.primary.heartbeat_interval_seconds),
    ));
    replicator.start().await;
    let coordinator = Coordinator::new(Arc::clone(&replicator));

    let state = Arc::new(api::primary::AppState { coordinator });
    let app = api::primary::router(state);
    let listener = tokio::net::TcpListener::bind(&config.api.bind_address).await?;
    tracing::info!("HTTP API listening on {}", config.api.bind_address);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }

    replicator.stop().await;
    tracing::info!("primary shutdown complete");
    Ok(())
}

async fn run_secondary(config_path: PathBuf) -> Result<()> {
    let config = QuorumLogConfig::from_file(&config_path)?;

    tracing::info!(
        "Starting secondary node, artificial delay {}s",
        config.secondary.delay_seconds
    );

    let storage = Arc::new(OrderedStorage::new());
    let handler = Arc::new(SecondaryHandler::new(
        Arc::clone(&storage),
        config.secondary.delay_seconds,
    ));

    let rpc_server = RpcServer::bind(&config.secondary.rpc_bind_address, handler).await?;
    tracing::info!("RPC listener on {}", config.secondary.rpc_bind_address);

    let state = Arc::new(api::secondary::AppState { storage });
    let app = api::secondary::router(state);
    let http_listener = tokio::net::TcpListener::bind(&config.api.bind_address).await?;
    tracing::info!("HTTP API listening on {}", config.api.bind_address);

    tokio::select! {
        result = rpc_server.serve() => {
            if let Err(e) = result {
                tracing::error!("RPC server error: {}", e);
            }
        }
        result = axum::serve(http_listener, app) => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }

    tracing::info!("secondary shutdown complete");
    Ok(())
}

fn run_validate(config_path: PathBuf) -> Result<()> {
    match QuorumLogConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  API bind address:      {}", config.api.bind_address);
            println!(
                "  Primary secondaries:   {:?}",
                config.primary.secondary_hosts
            );
            println!(
                "  Secondary RPC address: {}",
                config.secondary.rpc_bind_address
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            Err(e)
        }
    }
}
