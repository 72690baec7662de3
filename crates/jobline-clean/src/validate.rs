//! Missing-value policy, deduplication and quality checks.
//!
//! Checks only report; they never remove rows or fail the run.

use crate::location::valid_coordinates;
use crate::salary::to_number;
use jobline_core::{cell_text, fmt_pct, Table};
use rustc_hash::FxHashSet;
use serde_json::Value;

/// Columns that must be non-null for a row to survive validation
pub const REQUIRED_COLUMNS: [&str; 2] = ["id", "title"];

pub const LOW_SALARY: f64 = 15_000.0;
pub const HIGH_SALARY: f64 = 500_000.0;
pub const SHORT_DESCRIPTION: usize = 50;
pub const LONG_DESCRIPTION: usize = 10_000;

const LOGIC_SAMPLES: usize = 5;
const OUTLIER_SAMPLES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MissingColumn {
    pub column: String,
    pub count: usize,
    pub pct: String,
}

/// Columns that contain nulls, most nulls first.
pub fn missing_summary(table: &Table) -> Vec<MissingColumn> {
    let mut summary: Vec<MissingColumn> = table
        .null_counts()
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(column, count)| MissingColumn {
            pct: fmt_pct(count, table.len()),
            column,
            count,
        })
        .collect();
    summary.sort_by(|a, b| b.count.cmp(&a.count));
    summary
}

/// Drop rows whose `id` or `title` is missing. Returns rows removed.
pub fn drop_missing_required(table: &mut Table) -> usize {
    table.retain_rows(|row| {
        REQUIRED_COLUMNS
            .iter()
            .all(|c| row.get(*c).is_some_and(|v| !v.is_null()))
    })
}

/// Fill nulls in every `has_*` column with `false`. Returns the number of
/// flag columns touched.
pub fn fill_skill_flags(table: &mut Table) -> usize {
    let flags: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.starts_with("has_"))
        .cloned()
        .collect();
    for column in &flags {
        table.map_column(column, |v| v.cloned().unwrap_or(Value::Bool(false)));
    }
    flags.len()
}

/// Remove later rows that repeat an earlier `id`. Returns rows removed.
pub fn dedup_by_id(table: &mut Table) -> usize {
    let mut seen = FxHashSet::default();
    table.retain_rows(|row| match row.get("id").filter(|v| !v.is_null()) {
        Some(id) => seen.insert(id.to_string()),
        None => true,
    })
}

/// One flagged row, kept for display
#[derive(Debug, Clone, PartialEq)]
pub struct SalarySample {
    pub id: Option<String>,
    pub title: String,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

impl SalarySample {
    fn from_row(table: &Table, row: usize) -> Self {
        Self {
            id: table.get(row, "id").map(cell_text),
            title: table.get(row, "title").map(cell_text).unwrap_or_default(),
            min_salary: to_number(table.get(row, "min_salary")),
            max_salary: to_number(table.get(row, "max_salary")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryCheck {
    /// Rows with a `min_salary`
    pub with_salary: usize,
    pub logic_errors: usize,
    pub logic_samples: Vec<SalarySample>,
    pub low: usize,
    pub high: usize,
    pub low_samples: Vec<SalarySample>,
    pub high_samples: Vec<SalarySample>,
}

/// min > max logic errors and outliers, over rows that have a `min_salary`.
pub fn check_salaries(table: &Table) -> SalaryCheck {
    let mut check = SalaryCheck::default();
    for row in 0..table.len() {
        let Some(lo) = to_number(table.get(row, "min_salary")) else {
            continue;
        };
        let hi = to_number(table.get(row, "max_salary"));
        check.with_salary += 1;
        if hi.is_some_and(|hi| lo > hi) {
            check.logic_errors += 1;
            if check.logic_samples.len() < LOGIC_SAMPLES {
                check.logic_samples.push(SalarySample::from_row(table, row));
            }
        }
        if lo < LOW_SALARY {
            check.low += 1;
            if check.low_samples.len() < OUTLIER_SAMPLES {
                check.low_samples.push(SalarySample::from_row(table, row));
            }
        }
        if hi.is_some_and(|hi| hi > HIGH_SALARY) {
            check.high += 1;
            if check.high_samples.len() < OUTLIER_SAMPLES {
                check.high_samples.push(SalarySample::from_row(table, row));
            }
        }
    }
    check
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateCheck {
    /// Rows with a latitude
    pub checked: usize,
    pub valid: usize,
    pub invalid: usize,
}

/// Rows with a latitude whose coordinates fall outside the valid range.
/// A missing longitude counts as invalid.
pub fn check_coordinates(table: &Table) -> CoordinateCheck {
    let mut check = CoordinateCheck::default();
    for (lat, lon) in table.column("latitude").zip(table.column("longitude")) {
        let Some(lat) = lat else { continue };
        check.checked += 1;
        if valid_coordinates(lat.as_f64(), lon.and_then(Value::as_f64)) {
            check.valid += 1;
        } else {
            check.invalid += 1;
        }
    }
    check
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DescriptionCheck {
    pub short: usize,
    pub long: usize,
    pub mean_len: f64,
}

/// Description lengths in characters; missing descriptions count as empty.
pub fn check_descriptions(table: &Table) -> DescriptionCheck {
    let lengths: Vec<usize> = table
        .column("description")
        .map(|v| v.map_or(0, |v| cell_text(v).chars().count()))
        .collect();
    if lengths.is_empty() {
        return DescriptionCheck::default();
    }
    DescriptionCheck {
        short: lengths.iter().filter(|&&n| n < SHORT_DESCRIPTION).count(),
        long: lengths.iter().filter(|&&n| n > LONG_DESCRIPTION).count(),
        mean_len: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_sorted_by_count() {
        let t = Table::from_records(vec![
            json!({"id": "a", "city": null, "state": null}),
            json!({"id": "b", "city": null, "state": "TX"}),
        ]);
        let s = missing_summary(&t);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].column, "city");
        assert_eq!(s[0].count, 2);
        assert_eq!(s[0].pct, "100.0");
        assert_eq!(s[1].pct, "50.0");
    }

    #[test]
    fn drops_rows_without_id_or_title() {
        let mut t = Table::from_records(vec![
            json!({"id": "a", "title": "Analyst"}),
            json!({"id": null, "title": "Analyst"}),
            json!({"id": "c", "title": null}),
            json!({"id": "d", "title": "Engineer", "city": null}),
        ]);
        assert_eq!(drop_missing_required(&mut t), 2);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(1, "id"), Some(&json!("d")));
    }

    #[test]
    fn fills_only_flag_columns() {
        let mut t = Table::from_records(vec![
            json!({"has_bi": true, "has_cloud": null, "city": null}),
            json!({"has_bi": null, "has_cloud": false, "city": null}),
        ]);
        assert_eq!(fill_skill_flags(&mut t), 2);
        assert_eq!(t.get(0, "has_cloud"), Some(&json!(false)));
        assert_eq!(t.get(1, "has_bi"), Some(&json!(false)));
        assert_eq!(t.get(0, "has_bi"), Some(&json!(true)));
        assert_eq!(t.get(0, "city"), None);
    }

    #[test]
    fn dedup_keeps_first_and_is_idempotent() {
        let mut t = Table::from_records(vec![
            json!({"id": "a", "title": "first"}),
            json!({"id": "b", "title": "other"}),
            json!({"id": "a", "title": "second"}),
        ]);
        assert_eq!(dedup_by_id(&mut t), 1);
        assert_eq!(t.get(0, "title"), Some(&json!("first")));
        assert_eq!(dedup_by_id(&mut t), 0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn dedup_distinguishes_number_and_string_ids() {
        let mut t = Table::from_records(vec![json!({"id": 1}), json!({"id": "1"})]);
        assert_eq!(dedup_by_id(&mut t), 0);
    }

    #[test]
    fn salary_checks() {
        let t = Table::from_records(vec![
            json!({"id": "a", "title": "x", "min_salary": 90000.0, "max_salary": 80000.0}),
            json!({"id": "b", "title": "y", "min_salary": 20.0, "max_salary": 30.0}),
            json!({"id": "c", "title": "z", "min_salary": 200000.0, "max_salary": 900000.0}),
            json!({"id": "d", "title": "w", "min_salary": null, "max_salary": 950000.0}),
            json!({"id": "e", "title": "v", "min_salary": 50000.0, "max_salary": null}),
        ]);
        let c = check_salaries(&t);
        assert_eq!(c.with_salary, 4);
        assert_eq!(c.logic_errors, 1);
        assert_eq!(c.logic_samples[0].id.as_deref(), Some("a"));
        assert_eq!(c.low, 1);
        assert_eq!(c.high, 1);
        assert_eq!(c.high_samples[0].title, "z");
    }

    #[test]
    fn coordinate_check_counts_rows_with_latitude() {
        let t = Table::from_records(vec![
            json!({"latitude": 40.0, "longitude": -70.0}),
            json!({"latitude": 140.0, "longitude": -70.0}),
            json!({"latitude": 10.0, "longitude": null}),
            json!({"latitude": null, "longitude": 500.0}),
        ]);
        let c = check_coordinates(&t);
        assert_eq!(c, CoordinateCheck { checked: 3, valid: 1, invalid: 2 });
    }

    #[test]
    fn description_lengths() {
        let long = "x".repeat(10_001);
        let t = Table::from_records(vec![
            json!({"description": "short"}),
            json!({"description": null}),
            json!({"description": long}),
            json!({"description": "é".repeat(60)}),
        ]);
        let c = check_descriptions(&t);
        assert_eq!(c.short, 2);
        assert_eq!(c.long, 1);
        assert!((c.mean_len - (5.0 + 0.0 + 10_001.0 + 60.0) / 4.0).abs() < 1e-9);
    }

    #[test]
    fn empty_table_checks() {
        let t = Table::default();
        assert_eq!(check_descriptions(&t), DescriptionCheck::default());
        assert_eq!(check_coordinates(&t), CoordinateCheck::default());
        assert!(missing_summary(&t).is_empty());
    }
}
