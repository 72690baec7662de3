//! Location standardization: US state names, "City, State" labels, coordinate checks

use jobline_core::{cell_text, Table};
use rustc_hash::FxHashSet;
use serde_json::Value;

/// Two-letter US state code → full name
pub const STATE_ABBREVIATIONS: [(&str, &str); 50] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Full state name for an exact two-letter code
pub fn full_state_name(code: &str) -> Option<&'static str> {
    STATE_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == code)
        .map(|&(_, name)| name)
}

/// Latitude within ±90 and longitude within ±180
pub fn valid_coordinates(lat: Option<f64>, lon: Option<f64>) -> bool {
    match (lat, lon) {
        (Some(lat), Some(lon)) => (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon),
        _ => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationStats {
    pub unique_cities: usize,
    pub unique_states: usize,
    pub unique_countries: usize,
    /// Rows with a `location_standardized` label
    pub with_location: usize,
    pub valid_coordinates: usize,
    pub remote: usize,
    pub on_site: usize,
    /// Most common labels, ties in first-seen order
    pub top_locations: Vec<(String, usize)>,
}

fn distinct(table: &Table, column: &str) -> usize {
    table
        .column(column)
        .flatten()
        .map(cell_text)
        .collect::<FxHashSet<_>>()
        .len()
}

fn top_labels<'a>(labels: impl Iterator<Item = &'a str>, n: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = Vec::new();
    for label in labels {
        match ranked.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => ranked.push((label.to_string(), 1)),
        }
    }
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Expand state codes, add `location_standardized`, and gather location stats.
pub fn standardize_location(table: &mut Table) -> LocationStats {
    for column in ["city", "state", "country"] {
        table.ensure_column(column);
    }
    let mut stats = LocationStats {
        unique_cities: distinct(table, "city"),
        unique_states: distinct(table, "state"),
        unique_countries: distinct(table, "country"),
        ..Default::default()
    };

    table.map_column("state", |v| match v {
        Some(Value::String(s)) => full_state_name(s).map_or_else(|| Value::from(s.as_str()), Value::from),
        Some(other) => other.clone(),
        None => Value::Null,
    });

    let labels: Vec<Value> = table
        .column("city")
        .zip(table.column("state"))
        .map(|(city, state)| match (city, state) {
            (Some(city), Some(state)) => {
                Value::String(format!("{}, {}", cell_text(city), cell_text(state)))
            }
            _ => Value::Null,
        })
        .collect();
    table.set_column("location_standardized", labels);

    stats.with_location = table.column("location_standardized").flatten().count();
    stats.valid_coordinates = table
        .column("latitude")
        .zip(table.column("longitude"))
        .filter(|(lat, lon)| {
            valid_coordinates(lat.and_then(Value::as_f64), lon.and_then(Value::as_f64))
        })
        .count();
    stats.remote = table
        .column("is_remote")
        .filter(|v| v.and_then(Value::as_bool) == Some(true))
        .count();
    stats.on_site = table
        .column("is_remote")
        .filter(|v| v.and_then(Value::as_bool) == Some(false))
        .count();
    stats.top_locations = top_labels(
        table
            .column("location_standardized")
            .flatten()
            .filter_map(Value::as_str),
        10,
    );
    stats
}
