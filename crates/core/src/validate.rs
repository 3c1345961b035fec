// ABOUTME: Mapping validation: required roles, unknown keys and duplicate-key policy per role.
// ABOUTME: Never fails; problems come back as error strings (blocking) and warnings (advisory).

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::analysis::Analysis;
use crate::error::MappingError;
use crate::options::ValidationOptions;
use crate::roles::ROLE_PRIORITY;

/// role id -> item key. An empty key means the role is unmapped.
pub type RoleMapping = BTreeMap<String, String>;

/// Outcome of [`validate_mapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// False iff `errors` is non-empty.
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub cleaned: RoleMapping,
}

/// A role reusing a key that an earlier role already claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DuplicateUse<'a> {
    pub role: &'a str,
    pub first_role: &'a str,
    pub key: &'a str,
}

/// Parses mapping JSON text into a raw role -> value object.
pub fn mapping_from_json(text: &str) -> Result<Map<String, Value>, MappingError> {
    let value: Value = serde_json::from_str(text).map_err(MappingError::parse)?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(MappingError::invalid(format!(
            "expected an object of role -> key, got {}",
            crate::analysis::root_type(&other)
        ))),
    }
}

/// Trims string values; anything that is not a string becomes an empty key.
pub fn clean_mapping(raw: &Map<String, Value>) -> RoleMapping {
    raw.iter()
        .map(|(role, value)| {
            let key = value.as_str().map(str::trim).unwrap_or("").to_string();
            (role.clone(), key)
        })
        .collect()
}

/// Roles in the order duplicates are judged: priority roles first, then the rest by name.
fn scan_order(mapping: &RoleMapping) -> Vec<(&str, &str)> {
    let mut ordered: Vec<(&str, &str)> = ROLE_PRIORITY
        .iter()
        .filter_map(|role| mapping.get_key_value(*role))
        .map(|(r, k)| (r.as_str(), k.as_str()))
        .collect();
    ordered.extend(
        mapping
            .iter()
            .filter(|(r, _)| !ROLE_PRIORITY.contains(&r.as_str()))
            .map(|(r, k)| (r.as_str(), k.as_str())),
    );
    ordered
}

/// Every non-empty key reused by a later role, paired with the role that claimed it first.
pub(crate) fn duplicate_uses(mapping: &RoleMapping) -> Vec<DuplicateUse<'_>> {
    let mut claimed: HashMap<&str, &str> = HashMap::new();
    let mut out = Vec::new();
    for (role, key) in scan_order(mapping) {
        if key.is_empty() {
            continue;
        }
        match claimed.get(key) {
            Some(first_role) => out.push(DuplicateUse {
                role,
                first_role,
                key,
            }),
            None => {
                claimed.insert(key, role);
            }
        }
    }
    out
}

/// Keys the analysis saw: `keys.all`, else the sample keys, else the top key names.
fn known_keys(analysis: &Analysis) -> HashSet<String> {
    let main = &analysis.main_collection;
    let source: Vec<&String> = if !analysis.keys.all.is_empty() {
        analysis.keys.all.iter().collect()
    } else if !main.sample_keys.is_empty() {
        main.sample_keys.iter().collect()
    } else {
        main.top_keys.iter().map(|(k, _)| k).collect()
    };
    source
        .into_iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Validates a role mapping.
///
/// 1. values are trimmed; non-strings become empty
/// 2. empty required roles are errors
/// 3. keys missing from the analysis' main collection are warnings
/// 4. a key shared by two roles is an error when both roles are in
///    `prevent_duplicates_in`, silent when either is in `allow_duplicate_in`, and a
///    warning otherwise
pub fn validate_mapping(
    mapping: &Map<String, Value>,
    analysis: Option<&Analysis>,
    options: &ValidationOptions,
) -> ValidationResult {
    let cleaned = clean_mapping(mapping);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for role in &options.required_roles {
        if cleaned.get(role).map_or(true, |k| k.is_empty()) {
            errors.push(format!("required role '{}' cannot be empty", role));
        }
    }

    if let Some(known) = analysis.map(known_keys).filter(|k| !k.is_empty()) {
        for (role, key) in &cleaned {
            if !key.is_empty() && !known.contains(key) {
                warnings.push(format!(
                    "role '{}' points to '{}', but that key does not appear in the detected main collection",
                    role, key
                ));
            }
        }
    }

    for dup in duplicate_uses(&cleaned) {
        if options.prevents(dup.role) && options.prevents(dup.first_role) {
            errors.push(format!(
                "roles '{}' and '{}' cannot use the same field '{}'; cards would repeat the same text",
                dup.role, dup.first_role, dup.key
            ));
        } else if options.allows(dup.role) || options.allows(dup.first_role) {
            continue;
        } else {
            warnings.push(format!(
                "roles '{}' and '{}' both use the field '{}'; consider different fields unless this is intended",
                dup.role, dup.first_role, dup.key
            ));
        }
    }

    ValidationResult {
        ok: errors.is_empty(),
        errors,
        warnings,
        cleaned,
    }
}
