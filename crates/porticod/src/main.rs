//! porticod: the Portico daemon.
//!
//! Boots the runner and handler once at process start, then hands the
//! pair to the HTTP front-end. No ambient globals: everything the
//! serving loop needs is passed in explicitly.
//!
//! # Usage
//!
//! ```text
//! porticod serve --addr 127.0.0.1:8080 --config portico.toml
//! ```

mod config;
mod hello;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use config::PorticoConfig;
use hello::HelloHandler;
use portico_runner::{HttpFront, Runner};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "porticod", about = "Portico daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the registered handler over HTTP.
    Serve {
        /// Bind address. Overrides the config file.
        #[arg(long)]
        addr: Option<SocketAddr>,

        /// Path to portico.toml.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { addr, config } => serve(addr, config).await,
    }
}

async fn serve(cli_addr: Option<SocketAddr>, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = match &config_path {
        Some(path) => PorticoConfig::from_file(path)?,
        None => PorticoConfig::default(),
    };

    init_tracing(&config);

    let addr = cli_addr
        .or_else(|| config.addr())
        .unwrap_or_else(|| DEFAULT_ADDR.parse().expect("default address is valid"));

    info!(%addr, config = ?config_path, "porticod starting");

    let handler = Arc::new(HelloHandler::new(
        config.server_header().map(str::to_string),
    ));

    let mut runner = Runner::new(handler);
    if config.access_log() {
        runner = runner.on_after_response(|status| info!(status, "response served"));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    HttpFront::new(addr, Arc::new(runner)).serve(shutdown_rx).await
}

/// Filter precedence: RUST_LOG, then the config file, then "info".
fn init_tracing(config: &PorticoConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .log_filter()
            .unwrap_or("info,porticod=debug")
            .parse()
            .unwrap_or_else(|_| "info".parse().expect("static filter is valid"))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
