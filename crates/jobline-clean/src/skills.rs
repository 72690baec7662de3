//! Skill keyword extraction from job descriptions

use std::sync::LazyLock;

use jobline_core::{cell_text, Table};
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// A named group of skills, each with the pattern that detects it
pub struct SkillCategory {
    pub name: &'static str,
    pub skills: Vec<(&'static str, Regex)>,
}

impl SkillCategory {
    /// Boolean column name: `has_` + lowercased name with spaces as `_`
    pub fn column_name(&self) -> String {
        format!("has_{}", self.name.to_lowercase().replace(' ', "_"))
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.skills.iter().any(|(name, _)| *name == skill)
    }
}

/// Patterns run against the lowercased description.
const SKILL_PATTERNS: &[(&str, &[(&str, &str)])] = &[
    (
        "Programming Languages",
        &[
            ("Python", r"\bpython\b"),
            ("R", r"\b(?:r\s+programming|r\slanguage)"),
            ("SQL", r"\bsql\b"),
            ("Java", r"\bjava\b"),
            ("JavaScript", r"\bjavascript\b"),
            ("C++", r"\bc\+\+\b"),
            ("C#", r"\bc#\b"),
            ("VBA", r"\bvba\b"),
        ],
    ),
    (
        "Data Tools & Platforms",
        &[
            ("Tableau", r"\btableau\b"),
            ("Power BI", r"\bpower\s*bi\b"),
            ("Excel", r"\bexcel\b"),
            ("Jupyter", r"\bjupyter\b"),
            ("Hadoop", r"\bhadoop\b"),
            ("Spark", r"\bspark\b"),
        ],
    ),
    (
        "Databases",
        &[
            ("PostgreSQL", r"\bpostgresql\b"),
            ("MySQL", r"\bmysql\b"),
            ("MongoDB", r"\bmongodb\b"),
            ("Oracle", r"\boracle\b"),
            ("SQL Server", r"\bsql\s*server\b"),
        ],
    ),
    (
        "Soft Skills",
        &[
            ("Communication", r"\bcommunication\b"),
            ("Leadership", r"\bleadership\b"),
            ("Problem Solving", r"\bproblem[\s-]?solving\b"),
            ("Collaboration", r"\bcollaboration\b"),
            ("Project Management", r"\bproject\s*management\b"),
        ],
    ),
    (
        "Analysis & Statistics",
        &[
            ("Statistical Analysis", r"\bstatistical\s*analysis\b"),
            ("Data Analysis", r"\bdata\s*analysis\b"),
            ("Predictive Modeling", r"\bpredictive\s*modeling\b"),
            ("Machine Learning", r"\bmachine\s*learning\b"),
            ("Data Visualization", r"\bdata\s*visualization\b"),
        ],
    ),
];

static CATEGORIES: LazyLock<Vec<SkillCategory>> = LazyLock::new(|| {
    SKILL_PATTERNS
        .iter()
        .map(|&(name, skills)| SkillCategory {
            name,
            skills: skills
                .iter()
                .map(|&(skill, pattern)| {
                    (skill, Regex::new(pattern).expect("invalid skill pattern"))
                })
                .collect(),
        })
        .collect()
});

/// Skill categories in declaration order
pub fn categories() -> &'static [SkillCategory] {
    &CATEGORIES
}

/// Skills mentioned in `text`, in category then declaration order.
pub fn extract_skills(text: Option<&str>) -> Vec<&'static str> {
    let Some(text) = text else {
        return Vec::new();
    };
    let text = text.to_lowercase();
    categories()
        .iter()
        .flat_map(|c| c.skills.iter())
        .filter(|(_, re)| re.is_match(&text))
        .map(|(name, _)| *name)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillStats {
    pub rows: usize,
    pub total_mentions: usize,
    /// (category, `has_` column, rows with at least one skill of it)
    pub categories: Vec<(&'static str, String, usize)>,
    /// Most frequent skills, ties in declaration order
    pub top: Vec<(&'static str, usize)>,
}

impl SkillStats {
    pub fn mean_per_row(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.total_mentions as f64 / self.rows as f64
    }
}

/// Skill frequency, descending; ties keep declaration order.
pub fn skill_counts<'a>(rows: impl Iterator<Item = &'a [&'static str]>) -> Vec<(&'static str, usize)> {
    let mut counts: FxHashMap<&'static str, usize> = FxHashMap::default();
    for skills in rows {
        for &skill in skills {
            *counts.entry(skill).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&'static str, usize)> = categories()
        .iter()
        .flat_map(|c| c.skills.iter())
        .filter_map(|(name, _)| counts.get(name).map(|&n| (*name, n)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Add the `skills` list column and one `has_<category>` boolean column per category.
pub fn extract_skill_columns(table: &mut Table) -> SkillStats {
    let descriptions: Vec<Option<String>> = table
        .column("description")
        .map(|v| v.map(cell_text))
        .collect();
    let found: Vec<Vec<&'static str>> = descriptions
        .par_iter()
        .map(|d| extract_skills(d.as_deref()))
        .collect();

    table.set_column(
        "skills",
        found
            .iter()
            .map(|skills| Value::from(skills.clone()))
            .collect(),
    );

    let mut category_stats = Vec::with_capacity(categories().len());
    for category in categories() {
        let column = category.column_name();
        let flags: Vec<bool> = found
            .iter()
            .map(|skills| skills.iter().any(|s| category.contains(s)))
            .collect();
        let hits = flags.iter().filter(|&&f| f).count();
        table.set_column(&column, flags.into_iter().map(Value::Bool).collect());
        category_stats.push((category.name, column, hits));
    }

    let mut top = skill_counts(found.iter().map(Vec::as_slice));
    top.truncate(10);
    let stats = SkillStats {
        rows: found.len(),
        total_mentions: found.iter().map(Vec::len).sum(),
        categories: category_stats,
        top,
    };
    log::debug!(
        "extracted {} skill mentions across {} rows",
        stats.total_mentions,
        stats.rows
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_column_names() {
        let names: Vec<String> = categories().iter().map(SkillCategory::column_name).collect();
        assert_eq!(
            names,
            [
                "has_programming_languages",
                "has_data_tools_&_platforms",
                "has_databases",
                "has_soft_skills",
                "has_analysis_&_statistics",
            ]
        );
    }

    #[test]
    fn extracts_in_declaration_order() {
        let text = "Strong SQL and Python; Power BI dashboards, problem-solving and Machine Learning.";
        assert_eq!(
            extract_skills(Some(text)),
            ["Python", "SQL", "Power BI", "Problem Solving", "Machine Learning"]
        );
    }

    #[test]
    fn word_boundaries_respected() {
        assert!(extract_skills(Some("javascript only")).iter().all(|s| *s != "Java"));
        assert_eq!(extract_skills(Some("sparkling water")), Vec::<&str>::new());
        assert_eq!(extract_skills(Some("vba macros")), ["VBA"]);
    }

    #[test]
    fn r_needs_context() {
        assert_eq!(extract_skills(Some("R programming")), ["R"]);
        assert!(extract_skills(Some("our team")).is_empty());
    }

    #[test]
    fn sql_server_also_counts_sql() {
        assert_eq!(extract_skills(Some("SQL Server")), ["SQL", "SQL Server"]);
    }

    #[test]
    fn missing_description_has_no_skills() {
        assert!(extract_skills(None).is_empty());
    }

    #[test]
    fn adds_list_and_flag_columns() {
        let mut table = Table::from_records(vec![
            json!({"id": "a", "description": "Tableau and Excel; strong communication"}),
            json!({"id": "b", "description": null}),
            json!({"id": "c", "description": "Python, MongoDB"}),
        ]);
        let stats = extract_skill_columns(&mut table);

        assert_eq!(
            table.get(0, "skills"),
            Some(&json!(["Tableau", "Excel", "Communication"]))
        );
        assert_eq!(table.get(1, "skills"), Some(&json!([])));
        assert_eq!(table.get(0, "has_data_tools_&_platforms"), Some(&json!(true)));
        assert_eq!(table.get(0, "has_databases"), Some(&json!(false)));
        assert_eq!(table.get(1, "has_soft_skills"), Some(&json!(false)));
        assert_eq!(table.get(2, "has_databases"), Some(&json!(true)));

        assert_eq!(stats.rows, 3);
        assert_eq!(stats.total_mentions, 5);
        assert!((stats.mean_per_row() - 5.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.categories[2], ("Databases", "has_databases".to_string(), 1));
    }

    #[test]
    fn skill_counts_rank_by_frequency() {
        let rows: Vec<Vec<&'static str>> =
            vec![vec!["Excel", "SQL"], vec!["SQL"], vec!["Python", "Excel", "SQL"]];
        let ranked = skill_counts(rows.iter().map(Vec::as_slice));
        assert_eq!(ranked, [("SQL", 3), ("Excel", 2), ("Python", 1)]);
    }
}
