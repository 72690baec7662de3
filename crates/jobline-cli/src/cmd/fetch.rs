//! Fetch subcommand - page through the search API and save raw records

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use jobline_core::{save_records, SharedProgress};
use jobline_jsearch::{fetch_jobs, FetchOutcome, FetchSummary, JSearchClient};

use super::{output_dir, RAW_FILE};
use crate::config::Config;

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// Search query (default from config)
    #[arg(short, long)]
    pub query: Option<String>,

    /// First page to request
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Number of pages to request
    #[arg(short = 'n', long)]
    pub num_pages: Option<u32>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the first fetched record in full as pretty JSON
    #[arg(long)]
    pub sample: bool,
}

pub fn run(args: FetchArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let dir = output_dir(args.output.clone(), config);
    let outcome = fetch(&args, config, progress)?;
    std::fs::create_dir_all(&dir)?;
    save_records(&outcome.records, &dir.join(RAW_FILE))?;
    log::info!(
        "Saved {} jobs to {}",
        outcome.records.len(),
        dir.join(RAW_FILE).display()
    );
    report(&outcome, args.sample, progress);
    Ok(())
}

/// Run the paginated fetch described by `args` over config defaults.
pub fn fetch(args: &FetchArgs, config: &Config, progress: &SharedProgress) -> Result<FetchOutcome> {
    let credentials = config.api.credentials()?;
    let client = JSearchClient::new(config.api.base_url.clone(), credentials, config.api.http());

    let query = args.query.as_deref().unwrap_or(&config.fetch.query);
    let start_page = args.start_page.unwrap_or(config.fetch.start_page);
    let num_pages = args.num_pages.unwrap_or(config.fetch.num_pages);
    log::info!("Fetching {num_pages} pages of {query:?} starting at page {start_page}");

    let pb = progress.page_bar("fetch", u64::from(num_pages));
    let outcome = fetch_jobs(
        &client,
        query,
        start_page,
        num_pages,
        &config.fetch.policy(),
        &pb,
    );
    // an early stop has already finished the bar with its reason; keep it visible
    if !pb.is_finished() {
        pb.finish_and_clear();
    }
    Ok(outcome?)
}

/// Print or log the fetch summary and one sample record.
///
/// With `full_sample` the first record is printed as pretty JSON; otherwise
/// only its one-line summary is shown and the full record goes to the debug log.
pub fn report(outcome: &FetchOutcome, full_sample: bool, progress: &SharedProgress) {
    let summary = FetchSummary::from_outcome(outcome);
    if progress.is_tty() {
        summary.print();
    } else {
        summary.log();
    }
    if let Some(first) = outcome.records.first() {
        progress.println(format!("Sample: {}", sample_line(first)));
        if full_sample {
            progress.println(sample_json(first));
        } else {
            log::debug!("sample record:\n{}", sample_json(first));
        }
    }
}

fn sample_json(job: &Value) -> String {
    serde_json::to_string_pretty(job).unwrap_or_else(|_| job.to_string())
}

fn sample_line(job: &Value) -> String {
    let field = |name: &str| job.get(name).and_then(Value::as_str).unwrap_or("?");
    let mut line = format!("{} at {}", field("job_title"), field("employer_name"));
    if let (Some(city), Some(state)) = (
        job.get("job_city").and_then(Value::as_str),
        job.get("job_state").and_then(Value::as_str),
    ) {
        line.push_str(&format!(" ({city}, {state})"));
    }
    line
}
