//! Operator CLI for the scoreboard backing store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use scoreboard::config::load_service_config;
use scoreboard::lifecycle::startup::connect_store;
use scoreboard::store::KeyValueStore;

#[derive(Parser)]
#[command(name = "store-cli")]
#[command(about = "Inspect the scoreboard backing store", long_about = None)]
struct Cli {
    /// Path to the service config file (same format as the service).
    #[arg(short, long, env = "SCOREBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the store answers
    Ping,
    /// Read a key
    Get { key: String },
    /// Write a key
    Set { key: String, value: String },
    /// Delete a key
    Del { key: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_service_config(cli.config.as_deref())?;
    let manager = connect_store(&config).await?;
    let store = manager.get();

    let outcome = match cli.command {
        Commands::Ping => store.ping().await.map(|()| "PONG".to_string()),
        Commands::Get { key } => store
            .get(&key)
            .await
            .map(|value| value.unwrap_or_else(|| "(nil)".to_string())),
        Commands::Set { key, value } => store.set(&key, &value).await.map(|()| "OK".to_string()),
        Commands::Del { key } => store
            .del(&key)
            .await
            .map(|removed| if removed { "1" } else { "0" }.to_string()),
    };

    if let Err(e) = manager.shutdown() {
        eprintln!("warning: {e}");
    }

    println!("{}", outcome?);
    Ok(())
}
