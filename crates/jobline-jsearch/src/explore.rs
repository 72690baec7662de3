//! Raw record profiling: which fields the API returns, how often, and as what

use std::collections::{BTreeMap, BTreeSet};

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use jobline_core::{cell_text, fmt_pct, table::json_type_name};
use serde_json::Value;

/// Longest sample value shown per field
const SAMPLE_LEN: usize = 80;

/// Presence statistics for one field across all records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldProfile {
    pub name: String,
    /// Records containing the key (null or not)
    pub present: usize,
    /// Records where the key holds null
    pub nulls: usize,
    pub types: BTreeSet<&'static str>,
    /// First non-null value, truncated
    pub sample: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExploreReport {
    pub total: usize,
    /// Sorted by field name
    pub fields: Vec<FieldProfile>,
}

fn sample_text(value: &Value) -> String {
    cell_text(value).chars().take(SAMPLE_LEN).collect()
}

impl ExploreReport {
    /// Profile raw records. Non-object records count toward the total only.
    pub fn from_records(records: &[Value]) -> Self {
        let mut fields: BTreeMap<&str, FieldProfile> = BTreeMap::new();
        for record in records {
            let Some(obj) = record.as_object() else {
                continue;
            };
            for (key, value) in obj {
                let profile = fields.entry(key.as_str()).or_insert_with(|| FieldProfile {
                    name: key.clone(),
                    ..Default::default()
                });
                profile.present += 1;
                if value.is_null() {
                    profile.nulls += 1;
                    continue;
                }
                profile.types.insert(json_type_name(value));
                if profile.sample.is_none() {
                    profile.sample = Some(sample_text(value));
                }
            }
        }
        Self {
            total: records.len(),
            fields: fields.into_values().collect(),
        }
    }

    /// Fields present in every record
    pub fn always_present(&self) -> impl Iterator<Item = &FieldProfile> {
        self.fields.iter().filter(|f| f.present == self.total)
    }

    /// Fields present in fewer than half of the records
    pub fn mostly_missing(&self) -> impl Iterator<Item = &FieldProfile> {
        self.fields
            .iter()
            .filter(|f| (f.present as f64) < self.total as f64 * 0.5)
    }

    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Field").fg(Color::Cyan),
                Cell::new("Present %").fg(Color::Cyan),
                Cell::new("Null %").fg(Color::Cyan),
                Cell::new("Types").fg(Color::Cyan),
                Cell::new("Sample").fg(Color::Cyan),
            ]);
        for f in &self.fields {
            let types = f.types.iter().copied().collect::<Vec<_>>().join(", ");
            table.add_row(vec![
                Cell::new(&f.name),
                Cell::new(fmt_pct(f.present, self.total)),
                Cell::new(fmt_pct(f.nulls, self.total)),
                Cell::new(types),
                Cell::new(f.sample.as_deref().unwrap_or("")),
            ]);
        }
        let always: Vec<&str> = self.always_present().map(|f| f.name.as_str()).collect();
        let sparse: Vec<&str> = self.mostly_missing().map(|f| f.name.as_str()).collect();
        format!(
            "\n{} records, {} unique fields\n{table}\nAlways present ({}): {}\nMostly missing ({}): {}",
            self.total,
            self.fields.len(),
            always.len(),
            always.join(", "),
            sparse.len(),
            sparse.join(", ")
        )
    }

    pub fn print(&self) {
        eprintln!("{}", self.format_table());
    }

    pub fn log(&self) {
        log::info!(
            "{} records, {} unique fields",
            self.total,
            self.fields.len()
        );
        for f in &self.fields {
            let types = f.types.iter().copied().collect::<Vec<_>>().join(",");
            log::info!(
                "  {}: present {}/{} ({}%), null {} ({}%), types [{}]",
                f.name,
                f.present,
                self.total,
                fmt_pct(f.present, self.total),
                f.nulls,
                fmt_pct(f.nulls, self.total),
                types
            );
        }
        log::info!("Always present: {}", self.always_present().count());
        for f in self.mostly_missing() {
            log::info!(
                "  mostly missing: {} ({}%)",
                f.name,
                fmt_pct(f.present, self.total)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Value> {
        vec![
            json!({"job_id": "a", "job_min_salary": null, "job_is_remote": false,
                   "job_description": "x".repeat(200)}),
            json!({"job_id": "b", "job_min_salary": 50000, "job_is_remote": true}),
            json!({"job_id": "c", "job_min_salary": 61000.5, "job_benefits": ["dental"]}),
        ]
    }

    #[test]
    fn counts_presence_and_nulls() {
        let report = ExploreReport::from_records(&records());
        assert_eq!(report.total, 3);
        let salary = report
            .fields
            .iter()
            .find(|f| f.name == "job_min_salary")
            .unwrap();
        assert_eq!(salary.present, 3);
        assert_eq!(salary.nulls, 1);
        assert_eq!(
            salary.types.iter().copied().collect::<Vec<_>>(),
            ["float", "int"]
        );
        assert_eq!(salary.sample.as_deref(), Some("50000"));
    }

    #[test]
    fn fields_sorted_by_name() {
        let report = ExploreReport::from_records(&records());
        let names: Vec<&str> = report.fields.iter().map(|f| f.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn sample_is_truncated() {
        let report = ExploreReport::from_records(&records());
        let desc = report
            .fields
            .iter()
            .find(|f| f.name == "job_description")
            .unwrap();
        assert_eq!(desc.sample.as_ref().unwrap().len(), SAMPLE_LEN);
    }

    #[test]
    fn always_present_and_mostly_missing() {
        let report = ExploreReport::from_records(&records());
        let always: Vec<&str> = report.always_present().map(|f| f.name.as_str()).collect();
        assert_eq!(always, ["job_id", "job_min_salary"]);
        let sparse: Vec<&str> = report.mostly_missing().map(|f| f.name.as_str()).collect();
        assert_eq!(sparse, ["job_benefits", "job_description"]);
    }

    #[test]
    fn empty_input() {
        let report = ExploreReport::from_records(&[]);
        assert_eq!(report.total, 0);
        assert!(report.fields.is_empty());
    }
}
