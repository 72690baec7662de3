//! In-memory table of job records.
//!
//! Rows are JSON objects keyed by column name; a missing key and an explicit
//! `null` are both a missing value. `columns` fixes the output order.

use serde_json::Value;

/// A single record
pub type Row = serde_json::Map<String, Value>;

/// `None` for a missing key or JSON `null`
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build from raw API records.
    ///
    /// Column order is first-seen key order across records. Non-object
    /// records are skipped.
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut table = Self::default();
        for (idx, record) in records.into_iter().enumerate() {
            match record {
                Value::Object(row) => table.push_row(row),
                other => log::warn!(
                    "record {idx}: expected object, got {}, skipping",
                    json_type_name(&other)
                ),
            }
        }
        table
    }

    /// Append a row, registering any unseen keys as new trailing columns.
    pub fn push_row(&mut self, row: Row) {
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Non-null cell value
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| present(r.get(column)))
    }

    /// Cells of one column in row order (`None` = missing)
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows.iter().map(move |r| present(r.get(name)))
    }

    /// Replace or append a column. `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len(), "column length mismatch");
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }
    }

    /// Recompute a column cell by cell from its current value.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(Option<&Value>) -> Value) {
        let values: Vec<Value> = self.column(name).map(&mut f).collect();
        self.set_column(name, values);
    }

    /// Add an all-null column if absent.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            let nulls = vec![Value::Null; self.rows.len()];
            self.set_column(name, nulls);
        }
    }

    /// Remove a column; returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(pos) = self.columns.iter().position(|c| c == name) else {
            return false;
        };
        self.columns.remove(pos);
        for row in &mut self.rows {
            row.remove(name);
        }
        true
    }

    /// Rename columns in place, keeping their position.
    ///
    /// Pairs whose source column is absent are ignored. If the target name
    /// already exists as another column, the renamed column replaces it.
    /// Returns the number of columns renamed.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) -> usize {
        let mut renamed = 0;
        for &(from, to) in mapping {
            if from == to {
                continue;
            }
            let Some(pos) = self.columns.iter().position(|c| c == from) else {
                continue;
            };
            if self.has_column(to) {
                log::warn!("rename {from} -> {to}: replacing existing column '{to}'");
                self.drop_column(to);
            }
            // position may have shifted after the drop
            let pos = self.columns.iter().position(|c| c == from).unwrap_or(pos);
            self.columns[pos] = to.to_string();
            for row in &mut self.rows {
                let value = row.remove(from);
                row.remove(to);
                if let Some(value) = value {
                    row.insert(to.to_string(), value);
                }
            }
            renamed += 1;
        }
        renamed
    }

    /// Keep rows matching the predicate; returns the number removed.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&Row) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| keep(r));
        before - self.rows.len()
    }

    /// Null count per column, in column order
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .map(|c| {
                let nulls = self.column(c).filter(Option::is_none).count();
                (c.clone(), nulls)
            })
            .collect()
    }

    /// Total number of missing cells
    pub fn total_nulls(&self) -> usize {
        self.null_counts().iter().map(|(_, n)| n).sum()
    }

    /// Rows as JSON objects with every column present, in column order.
    pub fn records(&self) -> impl Iterator<Item = Row> + '_ {
        self.rows.iter().map(|r| {
            self.columns
                .iter()
                .map(|c| (c.clone(), r.get(c).cloned().unwrap_or(Value::Null)))
                .collect()
        })
    }

    pub fn into_records(self) -> Vec<Value> {
        self.records().map(Value::Object).collect()
    }
}

/// Text form of a cell: strings verbatim, other values as compact JSON
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Python-ish type label used in explore output and logs
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
