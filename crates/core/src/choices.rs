// ABOUTME: Per-role option lists for a mapping form: current pick, suggestions, then every known key.
// ABOUTME: Roles are ordered by intent profile when one applies, else by the catalog.

use serde::Serialize;

use crate::analysis::Analysis;
use crate::intent::{role_label, roles_for_intent, section_for, Section};
use crate::validate::RoleMapping;

const MAX_SUGGESTED: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOption {
    pub key: String,
    pub selected: bool,
    pub suggested: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleChoice {
    pub role: String,
    pub label: String,
    pub section: Section,
    pub options: Vec<KeyOption>,
    pub none_selected: bool,
}

/// Builds the selectable keys for each role.
///
/// `roles` overrides the order; otherwise the intent's roles are used, and for
/// the `custom` intent the analysis' catalog order.
pub fn build_role_choices(
    analysis: &Analysis,
    mapping: &RoleMapping,
    roles: Option<&[&str]>,
    intent: Option<&str>,
) -> Vec<RoleChoice> {
    let ordered: Vec<&str> = match roles {
        Some(roles) => roles.to_vec(),
        None => {
            let by_intent = roles_for_intent(intent);
            if by_intent.is_empty() {
                analysis.roles.iter().map(String::as_str).collect()
            } else {
                by_intent
            }
        }
    };

    ordered
        .into_iter()
        .map(|role| {
            let suggested: Vec<&str> = analysis
                .suggestions
                .get(role)
                .iter()
                .take(MAX_SUGGESTED)
                .map(String::as_str)
                .collect();
            let selected = mapping
                .get(role)
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .or_else(|| suggested.first().copied())
                .unwrap_or("");

            let mut keys: Vec<&str> = Vec::new();
            let candidates = std::iter::once(selected)
                .chain(suggested.iter().copied())
                .chain(analysis.keys.all.iter().map(String::as_str));
            for key in candidates {
                if !key.is_empty() && !keys.contains(&key) {
                    keys.push(key);
                }
            }

            RoleChoice {
                role: role.to_string(),
                label: role_label(role),
                section: section_for(intent, role),
                options: keys
                    .into_iter()
                    .map(|key| KeyOption {
                        key: key.to_string(),
                        selected: key == selected,
                        suggested: suggested.contains(&key),
                    })
                    .collect(),
                none_selected: selected.is_empty(),
            }
        })
        .collect()
}
