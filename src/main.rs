//! Turbo accounts server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / native shell
//!            │
//!            ▼
//!   ┌─────────────────┐    ┌─────────────────┐    ┌──────────────────────┐
//!   │   http server   │───▶│    security     │───▶│       handlers       │
//!   │ request id/trace│    │ rate limit, hdrs│    │ pages · users · turbo│
//!   └─────────────────┘    └─────────────────┘    └──────────┬───────────┘
//!                                                            │
//!                        ┌───────────────────────────────────┼──────────┐
//!                        ▼                                   ▼          ▼
//!               ┌─────────────────┐                ┌──────────────┐ ┌────────┐
//!               │    accounts     │───────────────▶│    store     │ │ native │
//!               │    registrar    │                │memory/sqlite │ │        │
//!               └─────────────────┘                └──────────────┘ └────────┘
//!
//!   Cross-cutting: config · observability · lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;

use turbo_accounts::config::{load_config, AppConfig};
use turbo_accounts::lifecycle::startup;
use turbo_accounts::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "turbo-accounts")]
#[command(about = "Registration, sessions and path configuration for Turbo Native shells", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability.log_level);

    tracing::info!("turbo-accounts v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?cli.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
