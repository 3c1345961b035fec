// ABOUTME: Role suggestion: scores every observed item key against every role using name hints and value types.
// ABOUTME: Smart strategy assigns top picks greedily by role priority so no key heads two roles.

//! Role suggestion.
//!
//! Scoring is shared by both strategies:
//!
//! - `+6` when the normalized key equals a role hint, otherwise `+3` when the hint
//!   is a substring of the key (per hint)
//! - `+4` when the role expects URLs, dates, numbers or lists and at least two
//!   sampled values have that shape
//! - `+1` for text roles when at least three sampled values are strings
//!
//! [`SuggestStrategy::Smart`] then walks roles in [`ROLE_PRIORITY`] order and lets
//! each role claim its best unclaimed key; [`SuggestStrategy::Independent`] ranks
//! every role on its own.

use std::collections::{BTreeMap, HashSet};

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::heuristics::{looks_like_date, looks_like_number, looks_like_url, normalize_key};
use crate::roles::{RoleDefinition, RoleKind, ROLE_CATALOG, ROLE_PRIORITY};

/// Dict items inspected for keys and value shapes.
const SAMPLE_ITEMS: usize = 20;
/// Suggestions kept per role.
const MAX_SUGGESTIONS: usize = 5;

const EXACT_HINT_SCORE: i64 = 6;
const PARTIAL_HINT_SCORE: i64 = 3;
const KIND_SCORE: i64 = 4;
const TEXT_KIND_SCORE: i64 = 1;

/// role id -> key -> score.
pub type KeyScoreTable = BTreeMap<String, BTreeMap<String, i64>>;

/// How candidate keys are assigned to roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestStrategy {
    /// Greedy by role priority; a key can be the top pick of one role only.
    #[default]
    Smart,
    /// Every role ranks all keys on its own.
    Independent,
}

/// Up to five candidate keys per role, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSuggestions {
    entries: Vec<(String, Vec<String>)>,
}

impl RoleSuggestions {
    /// Empty suggestion lists for every role of `catalog`.
    pub fn empty(catalog: &[RoleDefinition]) -> Self {
        Self {
            entries: catalog.iter().map(|r| (r.id.to_string(), Vec::new())).collect(),
        }
    }

    /// Suggested keys for a role, best first. Unknown roles have none.
    pub fn get(&self, role: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, keys)| keys.as_slice())
            .unwrap_or(&[])
    }

    /// The top suggestion for a role.
    pub fn first(&self, role: &str) -> Option<&str> {
        self.get(role).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(r, k)| (r.as_str(), k.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, keys)| keys.is_empty())
    }

    fn set(&mut self, role: &str, keys: Vec<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|(r, _)| r == role) {
            entry.1 = keys;
        }
    }
}

impl Serialize for RoleSuggestions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (role, keys) in &self.entries {
            map.serialize_entry(role, keys)?;
        }
        map.end()
    }
}

#[derive(Debug, Default)]
struct ShapeCounts {
    strings: usize,
    urls: usize,
    dates: usize,
    numbers: usize,
    lists: usize,
}

impl ShapeCounts {
    fn observe(&mut self, value: &Value) {
        if value.is_string() {
            self.strings += 1;
            if looks_like_url(value) {
                self.urls += 1;
            }
            if looks_like_date(value) {
                self.dates += 1;
            }
        }
        if looks_like_number(value) {
            self.numbers += 1;
        }
        if value.is_array() {
            self.lists += 1;
        }
    }

    fn kind_bonus(&self, kind: RoleKind) -> i64 {
        match kind {
            RoleKind::Url if self.urls >= 2 => KIND_SCORE,
            RoleKind::Date if self.dates >= 2 => KIND_SCORE,
            RoleKind::Number if self.numbers >= 2 => KIND_SCORE,
            RoleKind::List if self.lists >= 2 => KIND_SCORE,
            RoleKind::Text if self.strings >= 3 => TEXT_KIND_SCORE,
            _ => 0,
        }
    }
}

fn sample_dicts(items: &Value) -> Vec<&Map<String, Value>> {
    match items {
        Value::Array(list) => list
            .iter()
            .filter_map(Value::as_object)
            .take(SAMPLE_ITEMS)
            .collect(),
        _ => Vec::new(),
    }
}

/// Builds the role/key score table over the first sampled dict items.
/// Roles without any scoring key get an empty inner map.
pub fn score_keys(items: &Value, catalog: &[RoleDefinition]) -> KeyScoreTable {
    let mut table: KeyScoreTable = catalog
        .iter()
        .map(|r| (r.id.to_string(), BTreeMap::new()))
        .collect();

    let sample = sample_dicts(items);
    let mut keys: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for dict in &sample {
        for key in dict.keys() {
            if seen.insert(key.as_str()) {
                keys.push(key.as_str());
            }
        }
    }

    for key in keys {
        let normalized = normalize_key(key);
        let mut counts = ShapeCounts::default();
        for value in sample.iter().filter_map(|d| d.get(key)) {
            counts.observe(value);
        }

        for role in catalog {
            let mut score = 0;
            for hint in role.hints {
                let hint = normalize_key(hint);
                if normalized == hint {
                    score += EXACT_HINT_SCORE;
                } else if normalized.contains(&hint) {
                    score += PARTIAL_HINT_SCORE;
                }
            }
            score += counts.kind_bonus(role.kind);
            if score != 0 {
                if let Some(row) = table.get_mut(role.id) {
                    row.insert(key.to_string(), score);
                }
            }
        }
    }

    table
}

/// Keys of a score row ordered by score descending, then by key.
fn ranked(row: &BTreeMap<String, i64>) -> Vec<(&str, i64)> {
    let mut out: Vec<(&str, i64)> = row.iter().map(|(k, s)| (k.as_str(), *s)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

fn plain_top(row: &BTreeMap<String, i64>) -> Vec<String> {
    ranked(row)
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .take(MAX_SUGGESTIONS)
        .map(|(k, _)| k.to_string())
        .collect()
}

/// Suggests keys for every catalog role with the smart strategy.
pub fn suggest_roles(items: &Value) -> RoleSuggestions {
    suggest_with(items, ROLE_CATALOG, SuggestStrategy::Smart)
}

/// Suggests keys for every role of `catalog` using `strategy`.
///
/// Non-list input, empty lists and lists without objects produce empty
/// suggestions for every role.
pub fn suggest_with(
    items: &Value,
    catalog: &[RoleDefinition],
    strategy: SuggestStrategy,
) -> RoleSuggestions {
    let mut suggestions = RoleSuggestions::empty(catalog);
    if sample_dicts(items).is_empty() {
        return suggestions;
    }

    let table = score_keys(items, catalog);
    let empty = BTreeMap::new();
    let row_for = |role: &str| table.get(role).unwrap_or(&empty);

    match strategy {
        SuggestStrategy::Independent => {
            for role in catalog {
                suggestions.set(role.id, plain_top(row_for(role.id)));
            }
        }
        SuggestStrategy::Smart => {
            let mut claimed: HashSet<&str> = HashSet::new();
            for role_id in ROLE_PRIORITY {
                let role_id: &str = role_id;
                if !catalog.iter().any(|r| r.id == role_id) {
                    continue;
                }
                let mut picks: Vec<String> = Vec::new();
                for (key, score) in ranked(row_for(role_id)) {
                    if score <= 0 {
                        break;
                    }
                    if claimed.contains(key) {
                        continue;
                    }
                    if picks.is_empty() {
                        claimed.insert(key);
                    }
                    picks.push(key.to_string());
                    if picks.len() >= MAX_SUGGESTIONS {
                        break;
                    }
                }
                suggestions.set(role_id, picks);
            }

            for role in catalog.iter().filter(|r| !ROLE_PRIORITY.contains(&r.id)) {
                suggestions.set(role.id, plain_top(row_for(role.id)));
            }
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_lists_and_dictless_lists_give_empty_suggestions() {
        for items in [json!(null), json!({"title": "x"}), json!([]), json!([1, "a"])] {
            let s = suggest_roles(&items);
            assert!(s.is_empty());
            assert_eq!(s.iter().count(), ROLE_CATALOG.len());
        }
    }

    #[test]
    fn exact_and_partial_hint_scores() {
        let items = json!([{"title": "A", "page_title": "B"}]);
        let table = score_keys(&items, ROLE_CATALOG);
        assert_eq!(table["title"]["title"], 6);
        assert_eq!(table["title"]["page_title"], 3);
    }

    #[test]
    fn type_signals_add_kind_bonus() {
        let items = json!([
            {"pic": "https://x.test/1.png", "when": "2024-01-01", "cost_eur": 3, "kw": ["a"]},
            {"pic": "https://x.test/2.png", "when": "2024-01-02", "cost_eur": 4.5, "kw": ["b"]}
        ]);
        let table = score_keys(&items, ROLE_CATALOG);
        assert_eq!(table["image"]["pic"], 4);
        assert_eq!(table["date"]["when"], 4);
        assert_eq!(table["price"]["cost_eur"], 3 + 4);
        assert_eq!(table["tags"]["kw"], 4);
    }

    #[test]
    fn booleans_are_not_numbers() {
        let items = json!([{"flag": true}, {"flag": false}, {"flag": true}]);
        let table = score_keys(&items, ROLE_CATALOG);
        assert!(table["price"].get("flag").is_none());
    }

    #[test]
    fn smart_never_repeats_top_picks() {
        let items = json!([
            {"name": "a", "text": "x", "url": "https://a.test", "content": "c"},
            {"name": "b", "text": "y", "url": "https://b.test", "content": "d"},
            {"name": "c", "text": "z", "url": "https://c.test", "content": "e"}
        ]);
        let s = suggest_roles(&items);
        let mut tops = HashSet::new();
        for (_, keys) in s.iter() {
            if let Some(first) = keys.first() {
                assert!(tops.insert(first.clone()), "{} is a top pick twice", first);
            }
        }
    }

    #[test]
    fn smart_allows_reuse_below_the_top() {
        let items = json!([
            {"id": 1, "title": "a", "body": "x"},
            {"id": 2, "title": "b", "body": "y"},
            {"id": 3, "title": "c", "body": "z"}
        ]);
        let s = suggest_roles(&items);
        assert_eq!(s.first("id"), Some("id"));
        assert_eq!(s.first("title"), Some("title"));
        assert_eq!(s.first("description"), Some("body"));
        // body is a runner-up for title before description claims it
        assert!(s.get("title").contains(&"body".to_string()));
        // claimed top picks are skipped everywhere else
        assert!(!s.get("description").contains(&"title".to_string()));
    }

    #[test]
    fn independent_scores_each_role_alone() {
        let items = json!([
            {"image_url": "https://x.test/1.png"},
            {"image_url": "https://x.test/2.png"}
        ]);
        let independent = suggest_with(&items, ROLE_CATALOG, SuggestStrategy::Independent);
        assert_eq!(independent.first("image"), Some("image_url"));
        assert_eq!(independent.first("link"), Some("image_url"));

        let smart = suggest_roles(&items);
        assert_eq!(smart.first("image"), Some("image_url"));
        assert_eq!(smart.first("link"), None);
    }

    #[test]
    fn limits_to_five_suggestions() {
        let items = json!([{
            "title": 1, "title2": 1, "title3": 1, "title4": 1,
            "title5": 1, "title6": 1, "title7": 1
        }]);
        let s = suggest_roles(&items);
        assert_eq!(s.get("title").len(), 5);
    }

    #[test]
    fn roles_outside_priority_use_plain_ranking() {
        const EXTRA: &[RoleDefinition] = &[RoleDefinition {
            id: "venue",
            hints: &["venue", "place"],
            kind: RoleKind::Text,
        }];
        let items = json!([{"venue": "Hall", "place_name": "Hall"}]);
        let s = suggest_with(&items, EXTRA, SuggestStrategy::Smart);
        assert_eq!(s.get("venue"), &["venue".to_string(), "place_name".to_string()]);
    }

    #[test]
    fn serializes_in_catalog_order() {
        let s = suggest_roles(&json!([{"title": "a"}]));
        let encoded = serde_json::to_value(&s).unwrap();
        let keys: Vec<&String> = encoded.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "id");
        assert_eq!(keys[1], "title");
        assert_eq!(encoded["title"], json!(["title"]));
    }
}
