// ABOUTME: Advisory 0-100 score for a role mapping with human-readable issues.
// ABOUTME: Shares duplicate detection with the validator, restricted to card-critical roles.

use std::fmt;

use serde::Serialize;

use crate::validate::{duplicate_uses, RoleMapping};

/// Roles whose duplicated keys would show the same text twice on a card.
pub const CRITICAL_ROLES: &[&str] = &["title", "description", "content", "subtitle", "author"];

const MAX_SCORE: u32 = 100;

/// (role, points, issue when missing)
const CHECKLIST: &[(&str, u32, Option<&str>)] = &[
    ("title", 30, Some("missing title; it is the most important field")),
    ("description", 20, Some("missing description; it helps readers understand each item")),
    ("image", 15, Some("consider adding an image; cards look better with one")),
    ("link", 10, Some("add a link if readers should reach the original content")),
    ("date", 10, Some("a date helps put the content in context")),
    ("author", 5, None),
];

const NO_DUPLICATES_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Acceptable,
    NeedsWork,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Grade::Excellent,
            60..=79 => Grade::Good,
            40..=59 => Grade::Acceptable,
            _ => Grade::NeedsWork,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Acceptable => "acceptable",
            Grade::NeedsWork => "needs work",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingQuality {
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub issues: Vec<String>,
}

/// Scores a cleaned mapping with a weighted checklist.
pub fn mapping_quality(mapping: &RoleMapping) -> MappingQuality {
    let mapped = |role: &str| mapping.get(role).is_some_and(|k| !k.trim().is_empty());

    let mut score = 0;
    let mut issues = Vec::new();
    for (role, points, issue) in CHECKLIST {
        if mapped(role) {
            score += points;
        } else if let Some(issue) = issue {
            issues.push(issue.to_string());
        }
    }

    let critical: RoleMapping = mapping
        .iter()
        .filter(|(role, _)| CRITICAL_ROLES.contains(&role.as_str()))
        .map(|(role, key)| (role.clone(), key.trim().to_string()))
        .collect();
    let duplicates = duplicate_uses(&critical);
    if duplicates.is_empty() {
        score += NO_DUPLICATES_POINTS;
    }
    for dup in duplicates {
        issues.push(format!(
            "'{}' and '{}' use the same field '{}'; cards will repeat the same text",
            dup.role, dup.first_role, dup.key
        ));
    }

    MappingQuality {
        score,
        max_score: MAX_SCORE,
        grade: Grade::from_score(score),
        issues,
    }
}
