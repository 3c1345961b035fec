// ABOUTME: Path navigation over parsed payload trees.
// ABOUTME: Resolves key/index step sequences and dotted/bracketed key paths without panicking.

//! Path navigation.
//!
//! A [`Path`] is an ordered list of [`Step`]s, each either an object key or an
//! array index. Resolution never fails loudly: a step that does not apply to the
//! current node yields `None`, which callers treat as a routine "not here".
//!
//! Item fields can also be addressed with a small key-path syntax used by
//! mappings, e.g. `user.posts[0].title` or `matrix[1][0]`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step into a tree: an array index or an object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Index(usize),
    Key(String),
}

impl Step {
    pub fn is_index(&self) -> bool {
        matches!(self, Step::Index(_))
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Step::Key(k) => Some(k.as_str()),
            Step::Index(_) => None,
        }
    }
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_string())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

impl From<usize> for Step {
    fn from(index: usize) -> Self {
        Step::Index(index)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Index(i) => write!(f, "[{}]", i),
            Step::Key(k) => write!(f, "{}", k),
        }
    }
}

/// Location of a node inside a tree. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Step>);

impl Path {
    /// The root path.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns this path extended with an object key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Step::Key(key.into()));
        self
    }

    /// Returns this path extended with an array index.
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Step::Index(index));
        self
    }

    /// Returns a copy of this path with `step` appended.
    pub fn child(&self, step: Step) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of index steps in the path.
    pub fn index_steps(&self) -> usize {
        self.0.iter().filter(|s| s.is_index()).count()
    }

    /// The last key step, skipping trailing indices.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(Step::as_key)
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Self(steps)
    }
}

impl FromIterator<Step> for Path {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join(" → "))
    }
}

/// Human readable form of an optional path: `—` when there is none.
pub fn display_path(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.to_string(),
        None => "—".to_string(),
    }
}

/// Resolves `path` against `tree`. The empty path returns the tree itself.
pub fn resolve<'a>(tree: &'a Value, path: &Path) -> Option<&'a Value> {
    path.steps()
        .iter()
        .try_fold(tree, |node, step| step_into(node, step))
}

fn step_into<'a>(node: &'a Value, step: &Step) -> Option<&'a Value> {
    match (step, node) {
        (Step::Index(i), Value::Array(items)) => items.get(*i),
        (Step::Key(k), Value::Object(map)) => map.get(k),
        (Step::Index(_), _) | (Step::Key(_), _) => None,
    }
}

/// Parses a key path such as `user.posts[0].title` into steps.
///
/// Returns `None` for empty keys, empty segments (`a..b`), unclosed brackets and
/// indices that are not non-negative integers.
pub fn parse_key_path(key: &str) -> Option<Path> {
    if key.is_empty() {
        return None;
    }

    let mut path = Path::new();
    for segment in key.split('.') {
        let (name, mut rest) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };
        if name.is_empty() && rest.is_empty() {
            return None;
        }
        if !name.is_empty() {
            path.push(Step::Key(name.to_string()));
        }
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let index = inner[..close].parse::<usize>().ok()?;
            path.push(Step::Index(index));
            rest = &inner[close + 1..];
        }
    }
    Some(path)
}

/// Looks up `key` on an item. Plain keys are a direct object lookup; keys with
/// `.` or `[` are parsed with [`parse_key_path`] and resolved step by step.
pub fn resolve_key<'a>(item: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    let map = item.as_object()?;
    if !key.contains(&['.', '['][..]) {
        return map.get(key);
    }
    let path = parse_key_path(key)?;
    resolve(item, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_path_returns_root() {
        let tree = json!({"a": [1, 2]});
        assert_eq!(resolve(&tree, &Path::new()), Some(&tree));

        let scalar = json!("just text");
        assert_eq!(resolve(&scalar, &Path::new()), Some(&scalar));
    }

    #[test]
    fn resolves_keys_and_indices() {
        let tree = json!({"items": [{"name": "A"}]});
        let path = Path::new().key("items").index(0).key("name");
        assert_eq!(resolve(&tree, &path), Some(&json!("A")));
    }

    #[test]
    fn invalid_steps_are_not_found() {
        let tree = json!({"items": [{"name": "A"}]});
        assert_eq!(resolve(&tree, &Path::new().key("missing")), None);
        assert_eq!(resolve(&tree, &Path::new().key("items").index(5)), None);
        assert_eq!(resolve(&tree, &Path::new().index(0)), None);
        assert_eq!(
            resolve(&tree, &Path::new().key("items").key("name")),
            None
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(display_path(None), "—");
        assert_eq!(display_path(Some(&Path::new())), "(root)");
        let path = Path::new().key("users").index(0).key("name");
        assert_eq!(path.to_string(), "users → [0] → name");
    }

    #[test]
    fn last_key_skips_indices() {
        let path = Path::new().key("data").key("rows").index(3).index(1);
        assert_eq!(path.last_key(), Some("rows"));
        assert_eq!(path.index_steps(), 2);
        assert_eq!(Path::new().index(0).last_key(), None);
    }

    #[test]
    fn path_serializes_as_mixed_array() {
        let path = Path::new().key("data").index(2);
        let encoded = serde_json::to_value(&path).unwrap();
        assert_eq!(encoded, json!(["data", 2]));
        let decoded: Path = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, path);
    }

    #[test]
    fn parses_key_paths() {
        let path = parse_key_path("user.posts[0].title").unwrap();
        assert_eq!(path, Path::new().key("user").key("posts").index(0).key("title"));

        let path = parse_key_path("matrix[1][0]").unwrap();
        assert_eq!(path, Path::new().key("matrix").index(1).index(0));
    }

    #[test]
    fn rejects_malformed_key_paths() {
        assert_eq!(parse_key_path(""), None);
        assert_eq!(parse_key_path("a..b"), None);
        assert_eq!(parse_key_path("a[0"), None);
        assert_eq!(parse_key_path("a[x]"), None);
        assert_eq!(parse_key_path("a[-1]"), None);
    }

    #[test]
    fn resolve_key_fast_path_and_nested() {
        let item = json!({
            "title": "Top",
            "media": {"url": "https://x.test/a.png"},
            "user": {"posts": [{"title": "First"}]}
        });
        assert_eq!(resolve_key(&item, "title"), Some(&json!("Top")));
        assert_eq!(
            resolve_key(&item, "media.url"),
            Some(&json!("https://x.test/a.png"))
        );
        assert_eq!(
            resolve_key(&item, "user.posts[0].title"),
            Some(&json!("First"))
        );
        assert_eq!(resolve_key(&item, "user.posts[1].title"), None);
        assert_eq!(resolve_key(&item, "media.url.deeper"), None);
        assert_eq!(resolve_key(&item, ""), None);
    }

    #[test]
    fn resolve_key_requires_object_item() {
        assert_eq!(resolve_key(&json!(["title"]), "title"), None);
        assert_eq!(resolve_key(&json!("title"), "title"), None);
    }
}
