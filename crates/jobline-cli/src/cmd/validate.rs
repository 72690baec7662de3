//! Validate subcommand - cleaned table to the validated table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use jobline_clean::validate_table;
use jobline_core::{load_table, SharedProgress, Table};

use super::{output_dir, write_stage, CLEANED_STEM, VALIDATED_STEM};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Cleaned table (default: <output dir>/cleaned_jobs.csv)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: ValidateArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let dir = output_dir(args.output, config);
    let input = args
        .input
        .unwrap_or_else(|| dir.join(format!("{CLEANED_STEM}.csv")));
    let cleaned =
        load_table(&input).with_context(|| format!("cannot validate {}", input.display()))?;
    log::info!(
        "Loaded {} jobs, {} columns from {}",
        cleaned.len(),
        cleaned.columns().len(),
        input.display()
    );
    validate_and_save(cleaned, &dir, config, progress)?;
    Ok(())
}

/// Validate `cleaned`, write `validated_jobs.*` into `dir`, and show the report.
pub fn validate_and_save(
    cleaned: Table,
    dir: &Path,
    config: &Config,
    progress: &SharedProgress,
) -> Result<(Table, Vec<String>)> {
    let line = progress.stage_line("validate");
    line.set_message(format!("{} rows", cleaned.len()));
    let (validated, report) = validate_table(cleaned);
    line.set_message("writing");
    let written = write_stage(&validated, dir, VALIDATED_STEM, &config.output)?;
    line.finish_and_clear();
    if progress.is_tty() {
        report.print();
    } else {
        report.log();
    }
    Ok((validated, written))
}
