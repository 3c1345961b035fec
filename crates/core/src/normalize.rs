// ABOUTME: Turns items of the detected collection into canonical card records.
// ABOUTME: Resolves mapped keys with fallbacks, converts values to text and keeps only URL-shaped links.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::analysis::Analysis;
use crate::heuristics::looks_like_link;
use crate::options::NormalizeOptions;
use crate::path::{resolve, resolve_key, Path};
use crate::validate::RoleMapping;

const ELLIPSIS: char = '…';
const URL_MAX_LEN: usize = 1200;

const TITLE_FALLBACKS: &[&str] = &["title", "name", "headline", "label"];
const DESCRIPTION_FALLBACKS: &[&str] =
    &["description", "summary", "content", "text", "body", "excerpt"];
const IMAGE_FALLBACKS: &[&str] = &[
    "image",
    "image_url",
    "thumbnail",
    "thumbnail_url",
    "thumb",
    "media.url",
    "media.image",
];
const LINK_FALLBACKS: &[&str] = &["link", "url", "href", "permalink", "web_url"];
const ID_FALLBACKS: &[&str] = &["id", "uuid", "identifier"];

/// One card-ready record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedItem {
    pub title: String,
    pub description: String,
    /// A URL or empty.
    pub image: String,
    /// A URL or empty.
    pub link: String,
    pub raw: Value,
    /// Fields that had an explicit mapped key; `None` when none did.
    pub mapping_info: Option<BTreeMap<String, String>>,
}

/// Trims `text`; when longer than `max_len` characters keeps the first
/// `max_len - 1`, trims their trailing whitespace and appends `…`.
pub fn truncate(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(1)).collect();
    let mut out = kept.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

/// Display text for any value, capped at `max_len` characters.
///
/// Numbers and booleans are never truncated. Objects and arrays become compact
/// JSON with keys sorted at every level.
pub fn to_text(value: &Value, max_len: usize) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => truncate(s, max_len),
        Value::Array(_) | Value::Object(_) => {
            let text = serde_json::to_string(&sorted_keys(value)).unwrap_or_default();
            truncate(&text, max_len)
        }
    }
}

fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), sorted_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

fn mapped_key<'m>(mapping: &'m RoleMapping, role: &str) -> Option<&'m str> {
    mapping
        .get(role)
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
}

fn candidates<'a>(mapped: Option<&'a str>, fallbacks: &[&'a str], strict: bool) -> Vec<&'a str> {
    let mut keys: Vec<&str> = mapped.into_iter().collect();
    if !strict {
        keys.extend(fallbacks.iter().copied());
    }
    keys
}

fn pick_text(item: &Value, keys: &[&str], max_len: usize) -> String {
    keys.iter()
        .filter_map(|key| resolve_key(item, key))
        .map(|value| to_text(value, max_len))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn pick_url(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| resolve_key(item, key))
        .filter_map(|value| {
            let text = to_text(value, URL_MAX_LEN);
            text.split_whitespace().next().map(String::from)
        })
        .find(|token| looks_like_link(token))
        .unwrap_or_default()
}

fn normalize_one(
    item: &Value,
    position: usize,
    mapping: &RoleMapping,
    options: &NormalizeOptions,
) -> NormalizedItem {
    let title_key = mapped_key(mapping, "title");
    let description_key = mapped_key(mapping, "description");
    let image_key = mapped_key(mapping, "image");
    let link_key = mapped_key(mapping, "link");

    let strict = options.strict;
    let mut title = pick_text(
        item,
        &candidates(title_key, TITLE_FALLBACKS, strict),
        options.title_max_len,
    );
    let description = pick_text(
        item,
        &candidates(description_key, DESCRIPTION_FALLBACKS, strict),
        options.description_max_len,
    );
    let image = pick_url(item, &candidates(image_key, IMAGE_FALLBACKS, strict));
    let link = pick_url(item, &candidates(link_key, LINK_FALLBACKS, strict));

    if title.is_empty() {
        title = pick_text(item, ID_FALLBACKS, options.id_max_len);
    }
    if title.is_empty() {
        title = format!("Item #{}", position);
    }

    let mapping_info: BTreeMap<String, String> = [
        ("title", title_key),
        ("description", description_key),
        ("image", image_key),
        ("link", link_key),
    ]
    .into_iter()
    .filter_map(|(field, key)| key.map(|k| (field.to_string(), k.to_string())))
    .collect();

    NormalizedItem {
        title,
        description,
        image,
        link,
        raw: item.clone(),
        mapping_info: (!mapping_info.is_empty()).then_some(mapping_info),
    }
}

/// Normalizes up to `options.limit` object items of the list at `path`.
///
/// Returns an empty vec when `path` does not lead to a list. Non-object
/// elements are skipped and do not consume positions.
pub fn normalize_items(
    tree: &Value,
    path: &Path,
    mapping: &RoleMapping,
    options: &NormalizeOptions,
) -> Vec<NormalizedItem> {
    let Some(items) = resolve(tree, path).and_then(Value::as_array) else {
        debug!(path = %path, "collection path does not lead to a list");
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .take(options.limit)
        .enumerate()
        .map(|(idx, item)| normalize_one(item, idx + 1, mapping, options))
        .collect()
}

/// Normalizes the collection an [`Analysis`] detected; empty when none was found.
pub fn normalize_analysis(
    tree: &Value,
    analysis: &Analysis,
    mapping: &RoleMapping,
    options: &NormalizeOptions,
) -> Vec<NormalizedItem> {
    match analysis.main_collection.path.as_ref() {
        Some(path) => normalize_items(tree, path, mapping, options),
        None => Vec::new(),
    }
}
