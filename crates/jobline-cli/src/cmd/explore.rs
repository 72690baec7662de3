//! Explore subcommand - profile raw record fields

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use jobline_core::{load_records, SharedProgress};
use jobline_jsearch::ExploreReport;

use super::RAW_FILE;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ExploreArgs {
    /// Raw records file (default: <output dir>/raw_jobs.json)
    pub input: Option<PathBuf>,
}

pub fn run(args: ExploreArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let input = args
        .input
        .unwrap_or_else(|| config.output.dir.join(RAW_FILE));
    let records = load_records(&input)
        .with_context(|| format!("cannot explore {}", input.display()))?;
    log::info!("Loaded {} records from {}", records.len(), input.display());

    let report = ExploreReport::from_records(&records);
    if progress.is_tty() {
        report.print();
    } else {
        report.log();
    }
    Ok(())
}
