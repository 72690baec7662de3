//! Field name standardization: drop the `job_` prefix from API field names

use jobline_core::Table;

/// API field → short column name. Keys and values are each unique, and no
/// value is also a key, so applying the mapping is a bijection on its keys.
pub const FIELD_RENAMES: [(&str, &str); 23] = [
    ("job_id", "id"),
    ("job_title", "title"),
    ("job_description", "description"),
    ("job_location", "location"),
    ("job_city", "city"),
    ("job_state", "state"),
    ("job_country", "country"),
    ("job_latitude", "latitude"),
    ("job_longitude", "longitude"),
    ("job_is_remote", "is_remote"),
    ("job_employment_type", "employment_type"),
    ("job_publisher", "publisher"),
    ("job_apply_link", "apply_link"),
    ("job_apply_is_direct", "apply_is_direct"),
    ("job_google_link", "google_link"),
    ("job_min_salary", "min_salary"),
    ("job_max_salary", "max_salary"),
    ("job_salary_period", "salary_period"),
    ("job_onet_soc", "onet_soc"),
    ("job_onet_job_zone", "onet_job_zone"),
    ("job_posted_at", "posted_at_relative"),
    ("job_posted_at_datetime_utc", "posted_at"),
    ("job_posted_at_timestamp", "posted_at_timestamp"),
];

/// Standardized name for a field; unknown names pass through unchanged.
pub fn standard_name(field: &str) -> &str {
    FIELD_RENAMES
        .iter()
        .find(|(from, _)| *from == field)
        .map_or(field, |&(_, to)| to)
}

/// Rename known API fields in place. Returns the number of columns renamed.
pub fn standardize_field_names(table: &mut Table) -> usize {
    let renamed = table.rename_columns(&FIELD_RENAMES);
    log::debug!("renamed {renamed} of {} known fields", FIELD_RENAMES.len());
    renamed
}
