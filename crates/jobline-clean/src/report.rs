//! Table and log rendering for stage reports

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Color, Table};
use jobline_core::{fmt_num, fmt_pct};

use crate::pipeline::{CleanReport, ValidationReport};

fn new_table(title: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    table
}

fn warn_color(count: usize) -> Color {
    if count == 0 {
        Color::Green
    } else {
        Color::Yellow
    }
}

/// Whole dollars with thousands separators, sign ahead of the `$`.
fn money(v: f64) -> String {
    let n = v.round() as i64;
    let sign = if n < 0 { "-" } else { "" };
    format!("{sign}${}", fmt_num(n.unsigned_abs() as usize))
}

fn money_range(range: Option<(f64, f64)>) -> String {
    range.map_or_else(
        || "-".to_string(),
        |(lo, hi)| format!("{} - {}", money(lo), money(hi)),
    )
}

impl CleanReport {
    pub fn format_table(&self) -> String {
        let mut table = new_table("Clean");
        table.add_row(vec![
            Cell::new("Rows"),
            Cell::new(fmt_num(self.rows)),
        ]);
        table.add_row(vec![
            Cell::new("Columns"),
            Cell::new(format!(
                "{} -> {} ({} renamed)",
                self.input_columns, self.output_columns, self.renamed
            )),
        ]);
        table.add_row(vec![
            Cell::new("With salary"),
            Cell::new(format!("{}/{}", fmt_num(self.salary.with_salary), fmt_num(self.rows))),
        ]);
        table.add_row(vec![
            Cell::new("  Min salary"),
            Cell::new(money_range(self.salary.min_range)),
        ]);
        table.add_row(vec![
            Cell::new("  Max salary"),
            Cell::new(money_range(self.salary.max_range)),
        ]);
        if let Some(mean) = self.salary.mean_avg {
            table.add_row(vec![
                Cell::new("  Avg salary"),
                Cell::new(money(mean)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Skills per job"),
            Cell::new(format!("{:.1}", self.skills.mean_per_row())),
        ]);
        for (name, _, hits) in &self.skills.categories {
            table.add_row(vec![
                Cell::new(format!("  {name}")),
                Cell::new(format!("{} ({}%)", fmt_num(*hits), fmt_pct(*hits, self.rows))),
            ]);
        }
        if !self.skills.top.is_empty() {
            let top = self
                .skills
                .top
                .iter()
                .map(|(skill, n)| format!("{skill} ({n})"))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![Cell::new("Top skills"), Cell::new(top)]);
        }
        table.add_row(vec![
            Cell::new("Locations"),
            Cell::new(format!(
                "{} cities, {} states, {} countries",
                self.location.unique_cities,
                self.location.unique_states,
                self.location.unique_countries
            )),
        ]);
        table.add_row(vec![
            Cell::new("  Standardized"),
            Cell::new(fmt_num(self.location.with_location)),
        ]);
        table.add_row(vec![
            Cell::new("  Valid coordinates"),
            Cell::new(format!("{}/{}", fmt_num(self.location.valid_coordinates), fmt_num(self.rows))),
        ]);
        table.add_row(vec![
            Cell::new("  Remote / on-site"),
            Cell::new(format!("{} / {}", self.location.remote, self.location.on_site)),
        ]);
        for (label, n) in &self.location.top_locations {
            table.add_row(vec![Cell::new(format!("    {label}")), Cell::new(n)]);
        }
        table.add_row(vec![
            Cell::new("Salary logic errors").fg(warn_color(self.salary_logic_errors)),
            Cell::new(self.salary_logic_errors).fg(warn_color(self.salary_logic_errors)),
        ]);
        for (field, nulls) in &self.required_nulls {
            let status = if *nulls == 0 {
                "ok".to_string()
            } else {
                format!("{} missing", fmt_num(*nulls))
            };
            table.add_row(vec![
                Cell::new(format!("  {field}")).fg(warn_color(*nulls)),
                Cell::new(status).fg(warn_color(*nulls)),
            ]);
        }
        format!("\n{table}")
    }

    pub fn print(&self) {
        eprintln!("{}", self.format_table());
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "Clean complete: {} rows, {} columns, {} with salary, {} located",
            fmt_num(self.rows),
            self.output_columns,
            fmt_num(self.salary.with_salary),
            fmt_num(self.location.with_location)
        );
        for (field, nulls) in self.required_nulls.iter().filter(|(_, n)| *n > 0) {
            log::info!("  {field}: {} missing", fmt_num(*nulls));
        }
    }
}

impl ValidationReport {
    pub fn format_table(&self) -> String {
        let mut table = new_table("Validate");
        table.add_row(vec![
            Cell::new("Rows"),
            Cell::new(format!(
                "{} -> {} ({}% removed)",
                fmt_num(self.input_rows),
                fmt_num(self.output_rows),
                fmt_pct(self.rows_removed(), self.input_rows)
            )),
        ]);
        for m in self.missing.iter().take(10) {
            table.add_row(vec![
                Cell::new(format!("  null {}", m.column)),
                Cell::new(format!("{} ({}%)", fmt_num(m.count), m.pct)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Missing id/title").fg(warn_color(self.dropped_required)),
            Cell::new(fmt_num(self.dropped_required)).fg(warn_color(self.dropped_required)),
        ]);
        table.add_row(vec![
            Cell::new("Duplicates").fg(warn_color(self.duplicates)),
            Cell::new(fmt_num(self.duplicates)).fg(warn_color(self.duplicates)),
        ]);
        table.add_row(vec![
            Cell::new("Flag columns filled"),
            Cell::new(self.flags_filled),
        ]);
        table.add_row(vec![
            Cell::new("Salary logic errors").fg(warn_color(self.salary.logic_errors)),
            Cell::new(self.salary.logic_errors).fg(warn_color(self.salary.logic_errors)),
        ]);
        table.add_row(vec![
            Cell::new("Salary < $15,000"),
            Cell::new(self.salary.low),
        ]);
        table.add_row(vec![
            Cell::new("Salary > $500,000"),
            Cell::new(self.salary.high),
        ]);
        table.add_row(vec![
            Cell::new("Invalid coordinates").fg(warn_color(self.coordinates.invalid)),
            Cell::new(format!(
                "{}/{}",
                self.coordinates.invalid, self.coordinates.checked
            ))
            .fg(warn_color(self.coordinates.invalid)),
        ]);
        table.add_row(vec![
            Cell::new("Descriptions"),
            Cell::new(format!(
                "{} short, {} long, avg {:.0} chars",
                self.descriptions.short, self.descriptions.long, self.descriptions.mean_len
            )),
        ]);
        for level in &self.seniority {
            let sample = level.samples.first().map_or("", String::as_str);
            table.add_row(vec![
                Cell::new(format!("  {}", level.level)),
                Cell::new(format!(
                    "{} ({}%) {sample}",
                    fmt_num(level.count),
                    fmt_pct(level.count, self.output_rows)
                )),
            ]);
        }
        table.add_row(vec![
            Cell::new("Remaining nulls"),
            Cell::new(fmt_num(self.remaining_nulls)),
        ]);
        format!("\n{table}")
    }

    pub fn print(&self) {
        eprintln!("{}", self.format_table());
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "Validate complete: {} -> {} rows ({} missing id/title, {} duplicates)",
            fmt_num(self.input_rows),
            fmt_num(self.output_rows),
            self.dropped_required,
            self.duplicates
        );
        for sample in &self.salary.logic_samples {
            log::warn!(
                "  salary min > max: {} {:?} {:?}",
                sample.title,
                sample.min_salary,
                sample.max_salary
            );
        }
        let levels = self
            .seniority
            .iter()
            .map(|l| format!("{}={}", l.level, l.count))
            .collect::<Vec<_>>()
            .join(" ");
        log::info!("  seniority: {levels}");
    }
}
