// ABOUTME: Analysis builder combining format labelling, collection detection and role suggestions.
// ABOUTME: Produces the Analysis record a mapping form is built from.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::detect::{find_main_collection, MainCollection};
use crate::path::resolve;
use crate::roles::{role_ids, ROLE_CATALOG};
use crate::suggest::{suggest_roles, RoleSuggestions};

const NO_COLLECTION_MESSAGE: &str = "No main list of items was detected. \
The payload may be a single object or nested very deeply. \
If it does contain items, check the collection path or try another URL.";

/// Source format label of a raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Xml,
    #[default]
    Unknown,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceFormat::Json => "json",
            SourceFormat::Xml => "xml",
            SourceFormat::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Labels raw text by its first non-whitespace character: `{`/`[` is JSON, `<` is XML.
pub fn detect_format(raw: &str) -> SourceFormat {
    match raw.trim_start().chars().next() {
        Some('{') | Some('[') => SourceFormat::Json,
        Some('<') => SourceFormat::Xml,
        _ => SourceFormat::Unknown,
    }
}

/// Type name of the root node: `dict`, `list`, `str`, `int`, `float`, `bool` or `null`.
pub fn root_type(tree: &Value) -> &'static str {
    match tree {
        Value::Object(_) => "dict",
        Value::Array(_) => "list",
        Value::String(_) => "str",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::Bool(_) => "bool",
        Value::Null => "null",
    }
}

/// Keys available for mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeySummary {
    /// Sample keys followed by top keys, deduplicated.
    pub all: Vec<String>,
    /// Most frequent keys without counts.
    pub top: Vec<String>,
}

/// Result of analyzing one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub format: SourceFormat,
    pub root_type: String,
    pub message: String,
    pub main_collection: MainCollection,
    pub keys: KeySummary,
    pub roles: Vec<String>,
    pub suggestions: RoleSuggestions,
}

impl Analysis {
    /// The detected collection inside `tree`, if it is still a list there.
    pub fn items<'a>(&self, tree: &'a Value) -> Option<&'a Vec<Value>> {
        let path = self.main_collection.path.as_ref()?;
        resolve(tree, path)?.as_array()
    }
}

/// Analyzes a parsed payload. `raw_text` only labels the format.
pub fn analyze(tree: &Value, raw_text: Option<&str>) -> Analysis {
    let format = raw_text.map(detect_format).unwrap_or_default();
    let main_collection = find_main_collection(tree);

    let top = main_collection.top_key_names();
    let mut all: Vec<String> = Vec::new();
    for key in main_collection.sample_keys.iter().chain(top.iter()) {
        if !all.contains(key) {
            all.push(key.clone());
        }
    }

    let suggestions = match main_collection
        .path
        .as_ref()
        .and_then(|path| resolve(tree, path))
    {
        Some(items @ Value::Array(_)) => suggest_roles(items),
        _ => RoleSuggestions::empty(ROLE_CATALOG),
    };

    let message = if main_collection.found {
        String::new()
    } else {
        NO_COLLECTION_MESSAGE.to_string()
    };

    debug!(
        format = %format,
        found = main_collection.found,
        count = main_collection.count,
        "analysis built"
    );

    Analysis {
        format,
        root_type: root_type(tree).to_string(),
        message,
        main_collection,
        keys: KeySummary { all, top },
        roles: role_ids().into_iter().map(String::from).collect(),
        suggestions,
    }
}
