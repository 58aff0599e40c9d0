//! `streampick` CLI - pick the best stream source for a client

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use streampick::SelectionConfig;

#[derive(Parser)]
#[command(name = "streampick")]
#[command(about = "Probe candidate stream providers and pick the best one to play")]
#[command(version)]
struct Cli {
    /// Log probe activity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Selection config file (default: ~/.config/streampick/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the best source from a candidates file
    Select {
        /// Candidates file (TOML with [[candidates]], or a JSON array)
        file: PathBuf,

        /// Client User-Agent used to pick the probing tier
        #[arg(short = 'u', long, default_value = cmd::DESKTOP_USER_AGENT)]
        user_agent: String,

        /// Print the full selection result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which probing tier a User-Agent gets
    Classify {
        /// Client User-Agent string
        user_agent: String,
    },

    /// Probe a single sample unit URL
    Probe {
        /// Playlist or segment URL
        url: String,

        /// Only check reachability and round-trip time
        #[arg(long)]
        light: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => SelectionConfig::load_from(path)?,
        None => SelectionConfig::load()?,
    };

    match cli.command {
        Commands::Select {
            file,
            user_agent,
            json,
        } => {
            cmd::select::cmd_select(&file, &user_agent, json, config).await?;
        }
        Commands::Classify { user_agent } => {
            cmd::classify::cmd_classify(&user_agent, &config)?;
        }
        Commands::Probe { url, light } => {
            cmd::probe::cmd_probe(&url, light, &config).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
