//! Subcommand implementations

pub mod clean;
pub mod explore;
pub mod fetch;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use jobline_core::{save_table, write_parquet};
use jobline_jsearch::config::mask_key;

use crate::config::{Config, OutputConfig};

pub const RAW_FILE: &str = "raw_jobs.json";
pub const CLEANED_STEM: &str = "cleaned_jobs";
pub const VALIDATED_STEM: &str = "validated_jobs";

/// `--output` if given, else the configured output directory
pub fn output_dir(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.unwrap_or_else(|| config.output.dir.clone())
}

/// Write `<stem>.csv`, `<stem>.json` and, when enabled, `<stem>.parquet`.
///
/// Returns the file names written, relative to `dir`.
pub fn write_stage(
    table: &jobline_core::Table,
    dir: &Path,
    stem: &str,
    output: &OutputConfig,
) -> Result<Vec<String>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    let mut written = Vec::new();
    for ext in ["csv", "json"] {
        let name = format!("{stem}.{ext}");
        save_table(table, &dir.join(&name))?;
        written.push(name);
    }
    if output.parquet {
        let name = format!("{stem}.parquet");
        write_parquet(table, &dir.join(&name), output.compression_level)?;
        written.push(name);
    }
    log::info!(
        "Saved {} rows x {} columns to {}/{stem}.{{{}}}",
        table.len(),
        table.columns().len(),
        dir.display(),
        written
            .iter()
            .filter_map(|n| n.rsplit('.').next())
            .collect::<Vec<_>>()
            .join(",")
    );
    Ok(written)
}

/// Effective configuration, API key masked.
pub fn config_table(config: &Config) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["API URL", config.api.base_url.as_str()]);
    let key = config
        .api
        .key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map_or_else(|| "not set".to_string(), mask_key);
    table.add_row(vec!["API key", &key]);
    table.add_row(vec![
        "API host",
        config.api.host.as_deref().unwrap_or("not set"),
    ]);
    table.add_row(vec!["Timeout", &format!("{}s", config.api.timeout_secs)]);
    table.add_row(vec!["Query", config.fetch.query.as_str()]);
    table.add_row(vec![
        "Pages",
        &format!(
            "{} from page {}",
            config.fetch.num_pages, config.fetch.start_page
        ),
    ]);
    table.add_row(vec![
        "Page delay",
        &format!("{}ms", config.fetch.page_delay_ms),
    ]);
    table.add_row(vec![
        "Retry delay",
        &format!("{}ms", config.fetch.retry_delay_ms),
    ]);
    table.add_row(vec![
        "Output directory",
        &config.output.dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Parquet",
        &if config.output.parquet {
            format!("on (zstd {})", config.output.compression_level)
        } else {
            "off".to_string()
        },
    ]);
    format!("\n{table}")
}
