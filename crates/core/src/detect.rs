// ABOUTME: Collection detection: finds the list of objects most likely to be the payload's content items.
// ABOUTME: Scores every list in the tree (size, density, key consistency, name signals) and keeps the best.

//! Main collection detection.
//!
//! Every array reachable from the root is scored for "item-collection-ness":
//!
//! - larger lists score higher, saturating so a huge list cannot win on size alone
//! - lists made mostly of objects score higher; mixed lists are penalized, not rejected
//! - objects sharing the same keys score higher than a bag of unrelated shapes
//! - content-like keys (`title`, `url`, ...) add a small bonus
//! - metadata-like names (`links`, `pagination`, ...) and deep index paths are penalized
//!
//! Traversal is depth-first with object keys in insertion order and only the
//! first few elements of each array explored. The highest score wins; ties go
//! to the list found first.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::options::DetectionConfig;
use crate::path::{display_path, Path, Step};

/// Key names that usually belong to content items.
const GOOD_KEYS: &[&str] = &[
    "id",
    "uuid",
    "title",
    "name",
    "headline",
    "description",
    "summary",
    "content",
    "text",
    "url",
    "link",
    "href",
    "image",
    "thumbnail",
];

/// Container names that usually hold metadata rather than items.
const META_NAMES: &[&str] = &[
    "meta",
    "metadata",
    "links",
    "link",
    "headers",
    "header",
    "facets",
    "facet",
    "aggregations",
    "aggregation",
    "pagination",
    "page",
    "pages",
    "request",
    "response",
    "status",
    "errors",
    "error",
    "warnings",
    "warning",
];

/// Item keys typical of metadata records.
const METAISH_KEYS: &[&str] = &["meta", "links", "link", "type", "status", "count", "total"];

const MAX_SAMPLE_KEYS: usize = 25;
const MAX_TOP_KEYS: usize = 10;

/// The detected main collection of a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainCollection {
    pub found: bool,
    pub path: Option<Path>,
    pub count: usize,
    /// Keys of the first object item, in original order.
    pub sample_keys: Vec<String>,
    /// Most frequent keys across all object items, most frequent first.
    pub top_keys: Vec<(String, usize)>,
    pub path_display: String,
}

impl MainCollection {
    /// Result for payloads without any qualifying list.
    pub fn not_found() -> Self {
        Self {
            found: false,
            path: None,
            count: 0,
            sample_keys: Vec::new(),
            top_keys: Vec::new(),
            path_display: display_path(None),
        }
    }

    /// Names of `top_keys` without their counts.
    pub fn top_key_names(&self) -> Vec<String> {
        self.top_keys.iter().map(|(k, _)| k.clone()).collect()
    }
}

/// A scored list found during traversal.
#[derive(Debug, Clone)]
pub struct CollectionCandidate<'a> {
    pub path: Path,
    pub items: &'a [Value],
    pub score: f64,
}

/// Finds the main collection with the tuned default weights.
pub fn find_main_collection(tree: &Value) -> MainCollection {
    find_main_collection_with(tree, &DetectionConfig::default())
}

/// Finds the main collection with explicit weights.
pub fn find_main_collection_with(tree: &Value, config: &DetectionConfig) -> MainCollection {
    match best_candidate(tree, config) {
        Some(best) => {
            debug!(path = %best.path, score = best.score, count = best.items.len(), "main collection detected");
            summarize(best)
        }
        None => {
            debug!("no list of objects found");
            MainCollection::not_found()
        }
    }
}

/// Walks the whole tree and returns the highest-scoring list, if any qualifies.
pub fn best_candidate<'a>(tree: &'a Value, config: &DetectionConfig) -> Option<CollectionCandidate<'a>> {
    walk(tree, Path::new(), config, None)
}

fn walk<'a>(
    node: &'a Value,
    path: Path,
    config: &DetectionConfig,
    best: Option<CollectionCandidate<'a>>,
) -> Option<CollectionCandidate<'a>> {
    match node {
        Value::Array(items) => {
            let mut best = best;
            if let Some(score) = score_list(items, &path, config) {
                trace!(path = %path, score, "scored list");
                let better = best.as_ref().map_or(true, |b| score > b.score);
                if better {
                    best = Some(CollectionCandidate {
                        path: path.clone(),
                        items,
                        score,
                    });
                }
            }
            for (i, child) in items.iter().take(config.max_sample_items).enumerate() {
                best = walk(child, path.child(Step::Index(i)), config, best);
            }
            best
        }
        Value::Object(map) => map.iter().fold(best, |best, (key, child)| {
            walk(child, path.child(Step::Key(key.clone())), config, best)
        }),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => best,
    }
}

/// Scores a list as a candidate collection. `None` means the list can never qualify
/// (empty, no objects, or only empty objects in the sample).
pub fn score_list(items: &[Value], path: &Path, config: &DetectionConfig) -> Option<f64> {
    let n = items.len();
    if n == 0 {
        return None;
    }

    let dicts: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();
    if dicts.is_empty() {
        return None;
    }

    let density = dicts.len() as f64 / n as f64;
    let density_penalty = if density < config.min_dict_density {
        (config.min_dict_density - density) * config.density_penalty_multiplier
    } else {
        0.0
    };

    let size_score = (n.min(config.max_size_score) as f64).sqrt();

    let sample = &dicts[..dicts.len().min(config.max_sample_items)];
    let union: HashSet<&str> = sample
        .iter()
        .flat_map(|d| d.keys().map(String::as_str))
        .collect();
    if union.is_empty() {
        return None;
    }

    let sample_len = sample.len() as f64;
    let avg_size = sample.iter().map(|d| d.len() as f64).sum::<f64>() / sample_len;
    let consistency = sample
        .iter()
        .map(|d| d.len() as f64 / union.len() as f64)
        .sum::<f64>()
        / sample_len;

    let threshold = (sample.len() / 2).max(1);
    let commonish: HashSet<String> = union
        .iter()
        .filter(|k| sample.iter().filter(|d| d.contains_key(**k)).count() >= threshold)
        .map(|k| k.to_lowercase())
        .collect();
    let good_hits = commonish
        .iter()
        .filter(|k| GOOD_KEYS.contains(&k.as_str()))
        .count();
    let good_bonus = good_hits.min(config.good_key_cap) as f64 * config.good_key_bonus;

    let mut meta_penalty = 0.0;
    if let Some(name) = path.last_key() {
        if META_NAMES.contains(&name.to_lowercase().as_str()) {
            meta_penalty += config.meta_name_penalty;
        }
    }
    let lowered_union: HashSet<String> = union.iter().map(|k| k.to_lowercase()).collect();
    let metaish_hits = lowered_union
        .iter()
        .filter(|k| METAISH_KEYS.contains(&k.as_str()))
        .count();
    meta_penalty += metaish_hits.min(config.metaish_key_cap) as f64 * config.metaish_key_penalty;

    let path_penalty = config.path_index_penalty * path.index_steps() as f64
        + config.path_length_penalty
            * path.len().saturating_sub(config.path_length_threshold) as f64;

    Some(
        config.size_weight * size_score
            + config.density_weight * density
            + config.consistency_weight * consistency
            + config.avg_size_weight * avg_size / 10.0
            + good_bonus
            - meta_penalty
            - path_penalty
            - density_penalty,
    )
}

fn summarize(best: CollectionCandidate<'_>) -> MainCollection {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for item in best.items.iter().filter_map(Value::as_object) {
        for key in item.keys() {
            match positions.get(key.as_str()) {
                Some(&pos) => order[pos].1 += 1,
                None => {
                    positions.insert(key.as_str(), order.len());
                    order.push((key.clone(), 1));
                }
            }
        }
    }
    // stable: equal counts keep first-seen order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(MAX_TOP_KEYS);

    let sample_keys = best
        .items
        .iter()
        .find_map(Value::as_object)
        .map(|first| first.keys().take(MAX_SAMPLE_KEYS).cloned().collect())
        .unwrap_or_default();

    let path_display = display_path(Some(&best.path));
    MainCollection {
        found: true,
        path: Some(best.path),
        count: best.items.len(),
        sample_keys,
        top_keys: order,
        path_display,
    }
}
