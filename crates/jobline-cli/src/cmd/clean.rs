//! Clean subcommand - raw records to the cleaned table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use jobline_clean::clean_table;
use jobline_core::{load_table, SharedProgress, Table};

use super::{output_dir, write_stage, CLEANED_STEM, RAW_FILE};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Raw records file (default: <output dir>/raw_jobs.json)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: CleanArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let dir = output_dir(args.output, config);
    let input = args.input.unwrap_or_else(|| dir.join(RAW_FILE));
    let raw = load_table(&input).with_context(|| format!("cannot clean {}", input.display()))?;
    log::info!("Loaded {} jobs from {}", raw.len(), input.display());

    clean_and_save(raw, &dir, config, progress)?;
    Ok(())
}

/// Clean `raw`, write `cleaned_jobs.*` into `dir`, and show the report.
pub fn clean_and_save(
    raw: Table,
    dir: &Path,
    config: &Config,
    progress: &SharedProgress,
) -> Result<(Table, Vec<String>)> {
    let line = progress.stage_line("clean");
    line.set_message(format!("{} rows", raw.len()));
    let (cleaned, report) = clean_table(raw);
    line.set_message("writing");
    let written = write_stage(&cleaned, dir, CLEANED_STEM, &config.output)?;
    line.finish_and_clear();
    if progress.is_tty() {
        report.print();
    } else {
        report.log();
    }
    Ok((cleaned, written))
}
