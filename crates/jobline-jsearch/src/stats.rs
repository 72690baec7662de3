//! Fetch statistics and reporting

use std::time::Duration;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use jobline_core::{fmt_num, FailedPageEntry};

use crate::runner::{FailedPage, FetchOutcome, StopReason};

/// Aggregated view of one fetch run
#[derive(Debug, Clone)]
pub struct FetchSummary {
    pub query: String,
    pub pages_requested: u32,
    pub pages_ok: u32,
    pub records: usize,
    pub failed_pages: Vec<FailedPage>,
    pub stopped: Option<StopReason>,
    pub elapsed: Duration,
}

impl FetchSummary {
    pub fn from_outcome(outcome: &FetchOutcome) -> Self {
        Self {
            query: outcome.query.clone(),
            pages_requested: outcome.pages_requested,
            pages_ok: outcome.pages_ok,
            records: outcome.records.len(),
            failed_pages: outcome.failed_pages.clone(),
            stopped: outcome.stopped,
            elapsed: outcome.elapsed,
        }
    }

    /// Failed pages in manifest form
    pub fn failed_entries(&self) -> Vec<FailedPageEntry> {
        self.failed_pages
            .iter()
            .map(|f| FailedPageEntry {
                page: f.page,
                reason: f.failure.to_string(),
            })
            .collect()
    }

    fn failed_list(&self) -> String {
        if self.failed_pages.is_empty() {
            return "none".to_string();
        }
        self.failed_pages
            .iter()
            .map(|f| f.page.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Fetch")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        table.add_row(vec![Cell::new("Query"), Cell::new(&self.query)]);
        table.add_row(vec![
            Cell::new("Pages"),
            Cell::new(format!("{}/{} ok", self.pages_ok, self.pages_requested)),
        ]);
        table.add_row(vec![
            Cell::new("Jobs fetched").fg(Color::Green),
            Cell::new(fmt_num(self.records)).fg(Color::Green),
        ]);
        let failed_color = if self.failed_pages.is_empty() {
            Color::Reset
        } else {
            Color::Yellow
        };
        table.add_row(vec![
            Cell::new("Failed pages").fg(failed_color),
            Cell::new(self.failed_list()).fg(failed_color),
        ]);
        if let Some(stop) = self.stopped {
            table.add_row(vec![
                Cell::new("Stopped early").fg(Color::Yellow),
                Cell::new(stop.to_string()).fg(Color::Yellow),
            ]);
        }
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.1}s", self.elapsed.as_secs_f64())),
        ]);

        format!("\n{table}")
    }

    pub fn print(&self) {
        eprintln!("{}", self.format_table());
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "Fetch complete: {} jobs from {}/{} pages for {:?}",
            fmt_num(self.records),
            self.pages_ok,
            self.pages_requested,
            self.query
        );
        for f in &self.failed_pages {
            log::warn!("  failed page {}: {}", f.page, f.failure);
        }
        if let Some(stop) = self.stopped {
            log::warn!("  stopped early: {stop}");
        }
    }
}
