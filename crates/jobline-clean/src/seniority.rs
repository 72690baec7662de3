//! Seniority classification from job titles

use jobline_core::{cell_text, Table};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Seniority {
    Executive,
    Senior,
    Mid,
    Junior,
    Unknown,
}

/// Levels in match priority order with their title keywords.
///
/// Matching is plain substring search on the lowercased title, so short
/// keywords also hit inside longer words ("coo" in "coordinator").
const LEVEL_KEYWORDS: [(Seniority, &[&str]); 4] = [
    (
        Seniority::Executive,
        &[
            "ceo",
            "cfo",
            "coo",
            "cto",
            "chief",
            "president",
            "vp",
            "vice president",
            "director",
            "principal",
        ],
    ),
    (
        Seniority::Senior,
        &["senior", "sr.", "sr ", "lead", "principal", "staff", "manager"],
    ),
    (
        Seniority::Mid,
        &["mid", "mid-level", "analyst", "engineer", "specialist", "coordinator"],
    ),
    (
        Seniority::Junior,
        &[
            "junior",
            "jr.",
            "jr ",
            "entry",
            "entry-level",
            "associate",
            "intern",
            "apprentice",
        ],
    ),
];

impl Seniority {
    pub const ALL: [Seniority; 5] = [
        Seniority::Executive,
        Seniority::Senior,
        Seniority::Mid,
        Seniority::Junior,
        Seniority::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Seniority::Executive => "Executive",
            Seniority::Senior => "Senior",
            Seniority::Mid => "Mid",
            Seniority::Junior => "Junior",
            Seniority::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a title. Absent titles are `Unknown`, unmatched ones `Mid`.
pub fn classify_title(title: Option<&str>) -> Seniority {
    let Some(title) = title else {
        return Seniority::Unknown;
    };
    let title = title.to_lowercase();
    LEVEL_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map_or(Seniority::Mid, |&(level, _)| level)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCount {
    pub level: Seniority,
    pub count: usize,
    /// Up to three example titles
    pub samples: Vec<String>,
}

const SAMPLE_TITLES: usize = 3;

/// Add `seniority_level` and return the distribution (levels with rows only).
///
/// Non-string titles (a CSV cell like `2024` that reloaded as a number) are
/// classified on their text form; only null titles are `Unknown`.
pub fn add_seniority_level(table: &mut Table) -> Vec<LevelCount> {
    let titles: Vec<Option<String>> = table.column("title").map(|v| v.map(cell_text)).collect();
    let levels: Vec<Seniority> = titles
        .iter()
        .map(|t| classify_title(t.as_deref()))
        .collect();

    let mut dist: Vec<LevelCount> = Seniority::ALL
        .iter()
        .map(|&level| LevelCount {
            level,
            count: 0,
            samples: Vec::new(),
        })
        .collect();
    for (level, title) in levels.iter().zip(&titles) {
        let Some(entry) = dist.iter_mut().find(|e| e.level == *level) else {
            continue;
        };
        entry.count += 1;
        if let Some(title) = title {
            if entry.samples.len() < SAMPLE_TITLES {
                entry.samples.push(title.clone());
            }
        }
    }
    dist.retain(|e| e.count > 0);
    dist.sort_by(|a, b| b.count.cmp(&a.count));

    table.set_column(
        "seniority_level",
        levels.iter().map(|l| Value::from(l.as_str())).collect(),
    );
    dist
}
