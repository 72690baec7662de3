//! Table persistence: `load_table` / `save_table` over CSV, JSON and Parquet.
//!
//! Every write goes to `<path>.tmp` first and is renamed into place, so a
//! crashed run never leaves a half-written output behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, ListBuilder, RecordBatch, StringArray,
    StringBuilder, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde_json::Value;

use crate::table::{Row, Table};

/// Default zstd level for Parquet output
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
    Parquet,
}

impl TableFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
        }
    }
}

fn detect(path: &Path) -> Result<TableFormat> {
    TableFormat::from_path(path)
        .with_context(|| format!("unsupported table format: {}", path.display()))
}

/// Load a table from `.csv` or `.json`.
pub fn load_table(path: &Path) -> Result<Table> {
    let table = match detect(path)? {
        TableFormat::Csv => read_csv(path),
        TableFormat::Json => read_json(path),
        TableFormat::Parquet => bail!("reading parquet is not supported: {}", path.display()),
    }
    .with_context(|| format!("failed to load {}", path.display()))?;
    log::debug!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Save a table as `.csv`, `.json` or `.parquet`.
pub fn save_table(table: &Table, path: &Path) -> Result<()> {
    match detect(path)? {
        TableFormat::Csv => write_atomic(path, |w| write_csv(table, w)),
        TableFormat::Json => write_atomic(path, |w| {
            let records: Vec<Row> = table.records().collect();
            serde_json::to_writer_pretty(&mut *w, &records)?;
            Ok(())
        }),
        TableFormat::Parquet => write_parquet(table, path, DEFAULT_ZSTD_LEVEL),
    }
    .with_context(|| format!("failed to save {}", path.display()))?;
    log::info!("Saved {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write raw records as one pretty-printed JSON array.
pub fn save_records(records: &[Value], path: &Path) -> Result<()> {
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, records)?;
        Ok(())
    })
    .with_context(|| format!("failed to save {}", path.display()))
}

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a JSON array of records", path.display()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut writer = BufWriter::new(File::create(&tmp)?);
    write(&mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp, path)?;
    Ok(())
}

// === JSON ===

fn read_json(path: &Path) -> Result<Table> {
    Ok(Table::from_records(load_records(path)?))
}

// === CSV ===

/// Cell text for CSV: null → empty, strings verbatim, everything else as compact JSON.
fn encode_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// What every non-empty cell of a CSV column decodes to.
///
/// Typing is decided per column, never per cell: a state column holding
/// "TX" and "12" stays text, and an id column only becomes numeric when every
/// id parses as an integer without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Bool,
    Int,
    Float,
    Json,
    Text,
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" => Some(true),
        "false" | "False" => Some(false),
        _ => None,
    }
}

/// i64 first, then u64. Anything wider is not an integer here.
fn parse_int(text: &str) -> Option<Value> {
    text.parse::<i64>()
        .map(Value::from)
        .or_else(|_| text.parse::<u64>().map(Value::from))
        .ok()
}

/// Decimal or exponent notation only; bare digit runs are left to [`parse_int`].
fn parse_float(text: &str) -> Option<Value> {
    let numeric = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if !numeric || !text.contains(['.', 'e', 'E']) {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

fn parse_json(text: &str) -> Option<Value> {
    if !(text.starts_with('[') || text.starts_with('{')) {
        return None;
    }
    serde_json::from_str(text).ok()
}

/// Narrowest kind that decodes every non-empty cell of a column.
fn column_kind<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> CellKind {
    let mut present = cells.filter(|c| !c.is_empty());
    if present.clone().next().is_none() {
        return CellKind::Text;
    }
    if present.clone().all(|c| parse_bool(c).is_some()) {
        CellKind::Bool
    } else if present.clone().all(|c| parse_int(c).is_some()) {
        CellKind::Int
    } else if present
        .clone()
        .all(|c| parse_int(c).is_some() || parse_float(c).is_some())
    {
        CellKind::Float
    } else if present.all(|c| parse_json(c).is_some()) {
        CellKind::Json
    } else {
        CellKind::Text
    }
}

/// Inverse of [`encode_cell`] for a column of the given kind; also accepts
/// pandas-style `True` / `False`.
fn decode_cell(text: &str, kind: CellKind) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    let decoded = match kind {
        CellKind::Bool => parse_bool(text).map(Value::Bool),
        CellKind::Int => parse_int(text),
        CellKind::Float => parse_int(text).or_else(|| parse_float(text)),
        CellKind::Json => parse_json(text),
        CellKind::Text => None,
    };
    decoded.unwrap_or_else(|| Value::String(text.to_string()))
}

fn write_csv(table: &Table, w: &mut BufWriter<File>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(table.columns().iter().map(|c| encode_cell(row.get(c))))?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let records = reader
        .records()
        .enumerate()
        .map(|(line, record)| record.with_context(|| format!("bad CSV record at row {}", line + 1)))
        .collect::<Result<Vec<csv::StringRecord>>>()?;

    let kinds: Vec<CellKind> = (0..headers.len())
        .map(|i| column_kind(records.iter().map(move |r| r.get(i).unwrap_or_default())))
        .collect();
    log::trace!("csv column kinds: {kinds:?}");

    let mut table = Table::new(headers.clone());
    for record in &records {
        let row: Row = headers
            .iter()
            .zip(&kinds)
            .zip(record.iter())
            .map(|((h, kind), cell)| (h.clone(), decode_cell(cell, *kind)))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

// === Parquet ===

/// Helper: create List<Utf8> type
fn list_utf8() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
}

/// Narrowest Arrow type that holds every non-null cell of a column.
fn infer_type<'a>(cells: impl Iterator<Item = Option<&'a Value>>) -> DataType {
    let mut seen = false;
    let (mut all_bool, mut all_int, mut all_uint, mut all_integral, mut all_num, mut all_str_list) =
        (true, true, true, true, true, true);
    for v in cells.flatten() {
        seen = true;
        all_bool &= v.is_boolean();
        all_int &= v.is_i64();
        all_uint &= v.is_u64();
        all_integral &= v.is_i64() || v.is_u64();
        all_num &= v.is_number();
        all_str_list &= v
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
    }
    if !seen {
        DataType::Utf8
    } else if all_bool {
        DataType::Boolean
    } else if all_int {
        DataType::Int64
    } else if all_uint {
        DataType::UInt64
    } else if all_integral {
        // negative and beyond-i64 ids together fit no integer type; f64 would round them
        DataType::Utf8
    } else if all_num {
        DataType::Float64
    } else if all_str_list {
        list_utf8()
    } else {
        DataType::Utf8
    }
}

fn build_array(table: &Table, column: &str, data_type: &DataType) -> ArrayRef {
    let cells = table.column(column);
    match data_type {
        DataType::Boolean => Arc::new(BooleanArray::from(
            cells.map(|v| v.and_then(Value::as_bool)).collect::<Vec<_>>(),
        )),
        DataType::Int64 => Arc::new(Int64Array::from(
            cells.map(|v| v.and_then(Value::as_i64)).collect::<Vec<_>>(),
        )),
        DataType::UInt64 => Arc::new(UInt64Array::from(
            cells.map(|v| v.and_then(Value::as_u64)).collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            cells.map(|v| v.and_then(Value::as_f64)).collect::<Vec<_>>(),
        )),
        DataType::List(_) => {
            let mut builder = ListBuilder::new(StringBuilder::new());
            for cell in cells {
                match cell.and_then(Value::as_array) {
                    Some(items) => {
                        for item in items {
                            builder.values().append_option(item.as_str());
                        }
                        builder.append(true);
                    }
                    None => builder.append(false),
                }
            }
            Arc::new(builder.finish())
        }
        _ => Arc::new(StringArray::from(
            cells
                .map(|v| {
                    v.map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect::<Vec<_>>(),
        )),
    }
}

/// Convert the table to a single Arrow record batch with inferred column types.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    if table.columns().is_empty() {
        bail!("cannot convert a table without columns");
    }
    let mut fields = Vec::with_capacity(table.columns().len());
    let mut arrays = Vec::with_capacity(table.columns().len());
    for column in table.columns() {
        let data_type = infer_type(table.column(column));
        arrays.push(build_array(table, column, &data_type));
        fields.push(Field::new(column, data_type, true));
    }
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Write a zstd-compressed Parquet file via tmp → rename.
pub fn write_parquet(table: &Table, path: &Path, zstd_level: i32) -> Result<()> {
    let batch = to_record_batch(table)?;
    let tmp = tmp_path(path);
    if tmp.exists() {
        fs::remove_file(&tmp)?;
    }
    let level = ZstdLevel::try_new(zstd_level)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(level))
        .build();
    let mut writer = ArrowWriter::try_new(File::create(&tmp)?, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn cleaned() -> Table {
        Table::from_records(vec![
            json!({"id": "a1", "title": "Data Analyst", "min_salary": 50000.5,
                   "skills": ["Python", "SQL"], "has_databases": false, "city": "Austin, \"TX\""}),
            json!({"id": "b2", "title": "Engineer", "min_salary": null,
                   "skills": [], "has_databases": true, "city": null}),
        ])
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("x.CSV")), Some(TableFormat::Csv));
        assert_eq!(TableFormat::from_path(Path::new("a/b.json")), Some(TableFormat::Json));
        assert_eq!(TableFormat::from_path(Path::new("t.parquet")), Some(TableFormat::Parquet));
        assert_eq!(TableFormat::from_path(Path::new("t.txt")), None);
        assert_eq!(TableFormat::from_path(Path::new("noext")), None);
    }

    fn kind_of(cells: &[&str]) -> CellKind {
        column_kind(cells.iter().copied())
    }

    #[test]
    fn column_kinds() {
        assert_eq!(kind_of(&["True", "", "false"]), CellKind::Bool);
        assert_eq!(kind_of(&["42", "-7", ""]), CellKind::Int);
        assert_eq!(kind_of(&["42", "-1.5", "1e3"]), CellKind::Float);
        assert_eq!(kind_of(&["[\"Python\"]", "[]", ""]), CellKind::Json);
        assert_eq!(kind_of(&["TX", "12"]), CellKind::Text);
        assert_eq!(kind_of(&["[\"SQL\"]", "[not json"]), CellKind::Text);
        assert_eq!(kind_of(&["NaN", "1.5"]), CellKind::Text);
        assert_eq!(kind_of(&["", ""]), CellKind::Text);
    }

    #[test]
    fn decode_cell_types() {
        assert_eq!(decode_cell("", CellKind::Int), Value::Null);
        assert_eq!(decode_cell("True", CellKind::Bool), json!(true));
        assert_eq!(decode_cell("42", CellKind::Int), json!(42));
        assert_eq!(decode_cell("42", CellKind::Float), json!(42));
        assert_eq!(decode_cell("-1.5", CellKind::Float), json!(-1.5));
        assert_eq!(decode_cell("[\"Python\"]", CellKind::Json), json!(["Python"]));
        assert_eq!(decode_cell("12", CellKind::Text), json!("12"));
        assert_eq!(decode_cell("Austin, TX", CellKind::Text), json!("Austin, TX"));
    }

    #[test]
    fn big_ids_survive_csv_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.csv");
        fs::write(
            &path,
            "id,state,wide\n\
             18446744073709551614,TX,1234567890123456789012345\n\
             18446744073709551615,12,7\n",
        )
        .unwrap();

        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded.get(0, "id"), Some(&json!(18446744073709551614u64)));
        assert_eq!(loaded.get(1, "id"), Some(&json!(18446744073709551615u64)));
        assert_ne!(loaded.get(0, "id"), loaded.get(1, "id"));
        assert_eq!(loaded.get(1, "state"), Some(&json!("12")));
        assert_eq!(loaded.get(0, "wide"), Some(&json!("1234567890123456789012345")));
        assert_eq!(loaded.get(1, "wide"), Some(&json!("7")));

        let batch = to_record_batch(&loaded).unwrap();
        assert_eq!(batch.schema().field_with_name("id").unwrap().data_type(), &DataType::UInt64);
        assert_eq!(batch.schema().field_with_name("state").unwrap().data_type(), &DataType::Utf8);
    }

    #[test]
    fn mixed_sign_wide_integers_stay_text_in_arrow() {
        let t = Table::from_records(vec![json!({"n": -1}), json!({"n": 18446744073709551615u64})]);
        let batch = to_record_batch(&t).unwrap();
        assert_eq!(batch.schema().field_with_name("n").unwrap().data_type(), &DataType::Utf8);
    }

    #[test]
    fn csv_preserves_nulls_lists_and_bools() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cleaned_jobs.csv");
        save_table(&cleaned(), &path).unwrap();

        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded.columns(), cleaned().columns());
        assert_eq!(loaded.get(0, "skills"), Some(&json!(["Python", "SQL"])));
        assert_eq!(loaded.get(1, "has_databases"), Some(&json!(true)));
        assert_eq!(loaded.get(1, "min_salary"), None);
        assert_eq!(loaded.get(0, "city"), Some(&json!("Austin, \"TX\"")));
        assert!(!dir.path().join("cleaned_jobs.csv.tmp").exists());
    }

    #[test]
    fn json_writes_every_column_per_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/cleaned_jobs.json");
        save_table(&cleaned(), &path).unwrap();

        let raw: Vec<Value> = load_records(&path).unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw[1].as_object().unwrap().contains_key("city"));
        assert_eq!(load_table(&path).unwrap(), cleaned());
    }

    #[test]
    fn unsupported_extension_errors() {
        let dir = TempDir::new().unwrap();
        assert!(save_table(&cleaned(), &dir.path().join("x.xlsx")).is_err());
        assert!(load_table(&dir.path().join("x.parquet")).is_err());
    }

    #[test]
    fn inferred_arrow_types() {
        let batch = to_record_batch(&cleaned()).unwrap();
        let schema = batch.schema();
        assert_eq!(schema.field_with_name("id").unwrap().data_type(), &DataType::Utf8);
        assert_eq!(
            schema.field_with_name("min_salary").unwrap().data_type(),
            &DataType::Float64
        );
        assert_eq!(schema.field_with_name("skills").unwrap().data_type(), &list_utf8());
        assert_eq!(
            schema.field_with_name("has_databases").unwrap().data_type(),
            &DataType::Boolean
        );
        assert_eq!(batch.num_rows(), 2);
    }

    #[test]
    fn parquet_file_has_valid_footer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validated_jobs.parquet");
        write_parquet(&cleaned(), &path, 3).unwrap();
        let file = File::open(&path).unwrap();
        assert!(parquet::file::reader::SerializedFileReader::new(file).is_ok());
    }
}
