//! notekeeper CLI
//!
//! # Commands
//!
//! - `serve` (default) - Run the HTTP service
//! - `config get <key>` - Print a value from config.json
//! - `config set <key> <value>` - Change a value in config.json

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use notekeeper::{start_server, stop_server, AuthMode, Config};
use tracing_subscriber::EnvFilter;

/// Serve notes over HTTP from flat JSON files.
#[derive(Debug, Parser)]
#[command(name = "notekeeper", version, about)]
struct Args {
    /// Directory holding config.json (default: current directory)
    #[arg(global = true, long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Port to listen on, overriding the config file for this run
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind, overriding the config file for this run
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// How the authorization header is checked
    #[arg(long, value_enum)]
    auth_mode: Option<AuthMode>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,

    /// Read or change config.json
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the value of a key
    Get { key: String },

    /// Set a key and save the file
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notekeeper=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let mut config = Config::new(args.config_dir)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {}
        Command::Config { action } => {
            match action {
                ConfigAction::Get { key } => {
                    let value = config
                        .get(&key)
                        .ok_or_else(|| anyhow!("Unknown config key: {}", key))?;
                    println!("{}", value);
                }
                ConfigAction::Set { key, value } => {
                    config.set(&key, &value)?;
                    tracing::info!(
                        "Saved {} = {} to {}",
                        key,
                        value,
                        config.config_dir().join("config.json").display()
                    );
                }
            }
            return Ok(());
        }
    }

    config.apply_overrides(args.port, args.bind, args.auth_mode);

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            stop_server();
        }
    });

    start_server(&config).await?;
    Ok(())
}
