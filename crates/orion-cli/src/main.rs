//! # orion CLI entry point
//!
//! Parses command-line arguments, loads configuration and dispatches to the
//! handlers in `orion_cli`.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use orion_cli::store::{cmd_digest, cmd_get, cmd_put, cmd_update, open_storage, UpdateMode};
use orion_cli::OrionConfig;

/// Orion private transaction storage.
#[derive(Parser, Debug)]
#[command(name = "orion", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage directory. Overrides the config file and ORION_DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a transaction pair and print its digest.
    Put {
        /// JSON file holding the record.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the transaction pair stored under a digest.
    Get {
        #[arg(value_name = "DIGEST")]
        digest: String,
    },

    /// Overwrite the entry under a digest and print the previous record.
    Update {
        #[arg(value_name = "DIGEST")]
        digest: String,
        /// JSON file holding the new record.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Compare-and-swap against the value read, retrying on conflict.
        #[arg(long)]
        atomic: bool,
    },

    /// Print the digest of a record without storing it.
    Digest {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show the configured transport mode.
    Transport,
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let mut config = OrionConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    tracing::debug!(?config, "configuration loaded");

    let mut out = std::io::stdout();

    if let Commands::Transport = cli.command {
        let mode = config.transport.mode()?;
        writeln!(out, "{mode}")?;
        return Ok(0);
    }

    let storage = open_storage(&config.storage).await?;
    match cli.command {
        Commands::Put { file } => cmd_put(&storage, &file, &mut out).await,
        Commands::Get { digest } => cmd_get(&storage, &digest, &mut out).await,
        Commands::Update {
            digest,
            file,
            atomic,
        } => {
            let mode = if atomic {
                UpdateMode::Atomic
            } else {
                UpdateMode::Wait
            };
            cmd_update(&storage, &digest, &file, mode, &mut out).await
        }
        Commands::Digest { file } => cmd_digest(&storage, &file, &mut out),
        Commands::Transport => Ok(0),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    tracing::debug!("orion CLI starting");

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
