//! Scoreboard room service.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 ROOM SERVICE                 │
//!                    │                                              │
//!   config file ─────┼─▶ config ──▶ store::StoreManager ──┐         │
//!   SCOREBOARD_* ────┼─▶ (validate)   (connect + PING)    │         │
//!                    │                                    ▼         │
//!   HTTP request ────┼─▶ http::HttpServer ──▶ Arc<dyn KeyValueStore>┼──▶ Redis
//!                    │                                              │
//!   SIGINT/SIGTERM ──┼─▶ lifecycle: stop HTTP, then close store     │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! A store that cannot be reached at startup is fatal: one error line is
//! logged and the process exits with status 1 before accepting traffic.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use scoreboard::config::{load_service_config, ObservabilityConfig};
use scoreboard::lifecycle::{self, signals};
use scoreboard::observability::logging;

#[derive(Parser)]
#[command(name = "scoreboard")]
#[command(about = "Scoreboard room service", long_about = None)]
struct Args {
    /// Path to the TOML config file. Defaults plus environment when omitted.
    #[arg(short, long, env = "SCOREBOARD_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_service_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let _ = logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("failed to initialize logging: {e}");
    }

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.http.bind_address,
        store = ?config.redis,
        "Configuration loaded"
    );

    match lifecycle::run(config, signals::shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            ExitCode::FAILURE
        }
    }
}
