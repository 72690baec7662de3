//! jobline - job-posting ETL pipeline
//!
//! Fetches job postings from the JSearch API, then cleans, normalizes and
//! validates them into CSV / JSON (and optionally Parquet) tables.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "jobline")]
#[command(about = "Fetch, clean and validate job postings from JSearch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./jobline.toml or ~/.config/jobline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Page through the search API and save raw records
    Fetch(cmd::fetch::FetchArgs),
    /// Profile fields of raw records
    Explore(cmd::explore::ExploreArgs),
    /// Rename, normalize and enrich raw records
    Clean(cmd::clean::CleanArgs),
    /// Apply missing-value policy, dedup and quality checks
    Validate(cmd::validate::ValidateArgs),
    /// Fetch, clean and validate in one go, with a run manifest
    Run(cmd::run::RunArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(jobline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, progress bars and tables show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    jobline_core::init_logging(quiet, cli.debug, multi);

    if let Err(e) = jobline_core::install_signal_handlers() {
        log::warn!("could not install signal handlers: {e}");
    }

    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };
    if let Some(timeout) = cli.timeout {
        config.api.timeout_secs = timeout;
    }

    match cli.command {
        Command::Fetch(args) => cmd::fetch::run(args, &config, &progress),
        Command::Explore(args) => cmd::explore::run(args, &config, &progress),
        Command::Clean(args) => cmd::clean::run(args, &config, &progress),
        Command::Validate(args) => cmd::validate::run(args, &config, &progress),
        Command::Run(args) => cmd::run::run(args, &config, &progress),
        Command::Config => {
            eprintln!("{}", cmd::config_table(&config));
            Ok(())
        }
    }
}
