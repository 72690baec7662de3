//! Stage ordering for `clean` and `validate`

use jobline_core::Table;

use crate::location::{standardize_location, LocationStats};
use crate::rename::standardize_field_names;
use crate::salary::{normalize_salary, salary_logic_errors, SalaryStats};
use crate::seniority::{add_seniority_level, LevelCount};
use crate::skills::{extract_skill_columns, SkillStats};
use crate::validate::{
    check_coordinates, check_descriptions, check_salaries, dedup_by_id, drop_missing_required,
    fill_skill_flags, missing_summary, CoordinateCheck, DescriptionCheck, MissingColumn,
    SalaryCheck,
};

/// Fields whose null counts are reported after cleaning
pub const CLEAN_REQUIRED_FIELDS: [&str; 6] =
    ["id", "title", "description", "city", "state", "country"];

#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub rows: usize,
    pub input_columns: usize,
    pub output_columns: usize,
    pub renamed: usize,
    pub salary: SalaryStats,
    pub skills: SkillStats,
    pub location: LocationStats,
    pub salary_logic_errors: usize,
    /// Null count per required field; a missing column counts every row
    pub required_nulls: Vec<(&'static str, usize)>,
}

impl CleanReport {
    /// True when every required field is fully populated.
    pub fn required_complete(&self) -> bool {
        self.required_nulls.iter().all(|(_, n)| *n == 0)
    }
}

/// rename → salary → skills → location, then report-only checks.
pub fn clean_table(mut table: Table) -> (Table, CleanReport) {
    let input_columns = table.columns().len();
    let renamed = standardize_field_names(&mut table);
    let salary = normalize_salary(&mut table);
    let skills = extract_skill_columns(&mut table);
    let location = standardize_location(&mut table);

    let salary_logic_errors = salary_logic_errors(&table).len();
    if salary_logic_errors > 0 {
        log::warn!("{salary_logic_errors} rows have min_salary > max_salary");
    }
    let required_nulls = CLEAN_REQUIRED_FIELDS
        .iter()
        .map(|&field| {
            let nulls = if table.has_column(field) {
                table.column(field).filter(Option::is_none).count()
            } else {
                table.len()
            };
            (field, nulls)
        })
        .collect();

    let report = CleanReport {
        rows: table.len(),
        input_columns,
        output_columns: table.columns().len(),
        renamed,
        salary,
        skills,
        location,
        salary_logic_errors,
        required_nulls,
    };
    (table, report)
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub input_rows: usize,
    pub missing: Vec<MissingColumn>,
    pub dropped_required: usize,
    pub flags_filled: usize,
    pub duplicates: usize,
    pub salary: SalaryCheck,
    pub coordinates: CoordinateCheck,
    pub descriptions: DescriptionCheck,
    pub seniority: Vec<LevelCount>,
    /// Nulls left in optional fields after validation
    pub remaining_nulls: usize,
    pub output_rows: usize,
}

impl ValidationReport {
    pub fn rows_removed(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

/// Missing-value policy → dedup → quality checks → seniority.
///
/// A table without an `id` or `title` column loses every row.
pub fn validate_table(mut table: Table) -> (Table, ValidationReport) {
    let input_rows = table.len();
    let missing = missing_summary(&table);

    let dropped_required = drop_missing_required(&mut table);
    if dropped_required > 0 {
        log::info!("dropped {dropped_required} rows missing id or title");
    }
    let flags_filled = fill_skill_flags(&mut table);
    let duplicates = dedup_by_id(&mut table);
    if duplicates > 0 {
        log::info!("removed {duplicates} duplicate job ids");
    }

    let salary = check_salaries(&table);
    if salary.logic_errors > 0 {
        log::warn!("{} rows have min_salary > max_salary", salary.logic_errors);
    }
    let coordinates = check_coordinates(&table);
    if coordinates.invalid > 0 {
        log::warn!("{} rows have invalid coordinates", coordinates.invalid);
    }
    let descriptions = check_descriptions(&table);
    let seniority = add_seniority_level(&mut table);

    let report = ValidationReport {
        input_rows,
        missing,
        dropped_required,
        flags_filled,
        duplicates,
        salary,
        coordinates,
        descriptions,
        seniority,
        remaining_nulls: table.total_nulls(),
        output_rows: table.len(),
    };
    (table, report)
}
