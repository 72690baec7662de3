//! `jobline run` - fetch, clean and validate end to end, then write the run manifest

use anyhow::{Context, Result};
use clap::Args;

use jobline_core::manifest::MANIFEST_FILE;
use jobline_core::{save_records, RunManifest, SharedProgress, Table};
use jobline_jsearch::{FetchOutcome, FetchSummary};

use super::clean::clean_and_save;
use super::fetch::{self, FetchArgs};
use super::validate::validate_and_save;
use super::{output_dir, RAW_FILE};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,
}

pub fn run(args: RunArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let dir = output_dir(args.fetch.output.clone(), config);
    let mut outcome = fetch::fetch(&args.fetch, config, progress)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    save_records(&outcome.records, &dir.join(RAW_FILE))?;
    fetch::report(&outcome, args.fetch.sample, progress);
    if outcome.stopped_early() {
        log::warn!(
            "Pagination stopped early; continuing with {} collected jobs",
            outcome.records.len()
        );
    }

    let mut manifest = new_manifest(&outcome);
    let raw = Table::from_records(std::mem::take(&mut outcome.records));

    let (cleaned, mut files) = clean_and_save(raw, &dir, config, progress)?;
    manifest.cleaned_rows = cleaned.len();
    let (validated, validated_files) = validate_and_save(cleaned, &dir, config, progress)?;
    manifest.validated_rows = validated.len();
    files.extend(validated_files);
    files.insert(0, RAW_FILE.to_string());

    let names: Vec<&str> = files.iter().map(String::as_str).collect();
    manifest.record_files(&dir, &names)?;
    manifest.write(&dir)?;
    log::info!(
        "Run complete: {} raw, {} cleaned, {} validated; manifest at {}",
        manifest.raw_records,
        manifest.cleaned_rows,
        manifest.validated_rows,
        dir.join(MANIFEST_FILE).display()
    );
    Ok(())
}

/// Manifest seeded from the fetch; row counts and file digests are filled in later.
fn new_manifest(outcome: &FetchOutcome) -> RunManifest {
    RunManifest {
        query: outcome.query.clone(),
        start_page: outcome.start_page,
        num_pages: outcome.pages_requested,
        pages_ok: outcome.pages_ok,
        stopped_early: outcome.stopped_early(),
        failed_pages: FetchSummary::from_outcome(outcome).failed_entries(),
        raw_records: outcome.records.len(),
        cleaned_rows: 0,
        validated_rows: 0,
        files: Default::default(),
        created_at: chrono::Utc::now(),
    }
}
