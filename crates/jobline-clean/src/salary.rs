//! Salary normalization: numeric coercion, period labels, derived midpoint and spread

use jobline_core::Table;
use serde_json::Value;

/// Salary period spellings from the API → standardized label
pub const PERIOD_LABELS: [(&str, &str); 3] =
    [("YEAR", "YEARLY"), ("MONTH", "MONTHLY"), ("HOUR", "HOURLY")];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryStats {
    /// Rows with a numeric `min_salary`
    pub with_salary: usize,
    /// (lowest, highest) `min_salary`
    pub min_range: Option<(f64, f64)>,
    /// (lowest, highest) `max_salary` among rows with a `min_salary`
    pub max_range: Option<(f64, f64)>,
    /// Mean `avg_salary` among rows where it is defined
    pub mean_avg: Option<f64>,
}

/// Coerce a cell to a number: numbers kept, numeric strings parsed,
/// everything else becomes null.
pub fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn number_value(n: Option<f64>) -> Value {
    n.and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// `YEAR` → `YEARLY` etc.; any other value is kept as-is.
pub fn standardize_period(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(s)) => PERIOD_LABELS
            .iter()
            .find(|(from, _)| *from == s.as_str())
            .map_or_else(|| Value::String(s.clone()), |&(_, to)| Value::from(to)),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Normalize `min_salary`, `max_salary`, `salary_period` and add
/// `avg_salary` / `salary_range`.
///
/// Missing salary columns are created null-filled so derived columns always exist.
pub fn normalize_salary(table: &mut Table) -> SalaryStats {
    for column in ["min_salary", "max_salary", "salary_period"] {
        table.ensure_column(column);
    }

    let mins: Vec<Option<f64>> = table.column("min_salary").map(to_number).collect();
    let maxs: Vec<Option<f64>> = table.column("max_salary").map(to_number).collect();
    table.set_column(
        "min_salary",
        mins.iter().copied().map(number_value).collect(),
    );
    table.set_column(
        "max_salary",
        maxs.iter().copied().map(number_value).collect(),
    );
    table.map_column("salary_period", standardize_period);

    let pairs: Vec<(Option<f64>, Option<f64>)> =
        mins.iter().copied().zip(maxs.iter().copied()).collect();
    let avgs: Vec<Option<f64>> = pairs
        .iter()
        .map(|&(lo, hi)| lo.zip(hi).map(|(lo, hi)| (hi + lo) / 2.0))
        .collect();
    table.set_column("avg_salary", avgs.iter().copied().map(number_value).collect());
    table.set_column(
        "salary_range",
        pairs
            .iter()
            .map(|&(lo, hi)| number_value(lo.zip(hi).map(|(lo, hi)| hi - lo)))
            .collect(),
    );

    let defined: Vec<f64> = avgs.iter().flatten().copied().collect();
    let stats = SalaryStats {
        with_salary: mins.iter().flatten().count(),
        min_range: range(mins.iter().flatten().copied()),
        max_range: range(
            pairs
                .iter()
                .filter(|(lo, _)| lo.is_some())
                .filter_map(|(_, hi)| *hi),
        ),
        mean_avg: (!defined.is_empty()).then(|| defined.iter().sum::<f64>() / defined.len() as f64),
    };
    log::debug!("salary normalized: {} rows with salary data", stats.with_salary);
    stats
}

/// Rows where `min_salary > max_salary` (both present). Reported, never fatal.
pub fn salary_logic_errors(table: &Table) -> Vec<usize> {
    table
        .column("min_salary")
        .zip(table.column("max_salary"))
        .enumerate()
        .filter_map(|(idx, (lo, hi))| match (to_number(lo), to_number(hi)) {
            (Some(lo), Some(hi)) if lo > hi => Some(idx),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> Table {
        Table::from_records(vec![
            json!({"min_salary": 50000, "max_salary": 70000, "salary_period": "YEAR"}),
            json!({"min_salary": "25.5", "max_salary": "30", "salary_period": "HOUR"}),
            json!({"min_salary": null, "max_salary": 90000, "salary_period": "WEEK"}),
            json!({"min_salary": "competitive", "max_salary": null, "salary_period": null}),
        ])
    }

    #[test]
    fn coerces_numbers() {
        assert_eq!(to_number(Some(&json!(5))), Some(5.0));
        assert_eq!(to_number(Some(&json!(" 12.5 "))), Some(12.5));
        assert_eq!(to_number(Some(&json!("n/a"))), None);
        assert_eq!(to_number(Some(&json!("inf"))), None);
        assert_eq!(to_number(Some(&json!(true))), None);
        assert_eq!(to_number(None), None);
    }

    #[test]
    fn standardizes_periods() {
        assert_eq!(standardize_period(Some(&json!("MONTH"))), json!("MONTHLY"));
        assert_eq!(standardize_period(Some(&json!("WEEK"))), json!("WEEK"));
        assert_eq!(standardize_period(None), Value::Null);
    }

    #[test]
    fn derives_avg_and_range() {
        let mut t = table();
        normalize_salary(&mut t);
        assert_eq!(t.get(0, "avg_salary"), Some(&json!(60000.0)));
        assert_eq!(t.get(0, "salary_range"), Some(&json!(20000.0)));
        assert_eq!(t.get(1, "min_salary"), Some(&json!(25.5)));
        assert_eq!(t.get(1, "salary_period"), Some(&json!("HOURLY")));
        assert_eq!(t.get(2, "avg_salary"), None);
        assert_eq!(t.get(3, "min_salary"), None);
        assert_eq!(t.get(3, "salary_range"), None);
    }

    #[test]
    fn stats_cover_rows_with_salary() {
        let mut t = table();
        let stats = normalize_salary(&mut t);
        assert_eq!(stats.with_salary, 2);
        assert_eq!(stats.min_range, Some((25.5, 50000.0)));
        assert_eq!(stats.max_range, Some((30.0, 70000.0)));
        let mean = stats.mean_avg.unwrap();
        assert!((mean - (60000.0 + 27.75) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_columns_are_created() {
        let mut t = Table::from_records(vec![json!({"id": "a"})]);
        let stats = normalize_salary(&mut t);
        assert!(t.has_column("avg_salary"));
        assert!(t.has_column("salary_period"));
        assert_eq!(stats.with_salary, 0);
        assert_eq!(stats.mean_avg, None);
    }

    #[test]
    fn inverted_salary_is_flagged_not_fatal() {
        let mut t = Table::from_records(vec![
            json!({"min_salary": 90000, "max_salary": 60000}),
            json!({"min_salary": 50000, "max_salary": 60000}),
            json!({"min_salary": 50000, "max_salary": null}),
        ]);
        normalize_salary(&mut t);
        assert_eq!(salary_logic_errors(&t), [0]);
        assert_eq!(t.get(0, "salary_range"), Some(&json!(-30000.0)));
    }
}
