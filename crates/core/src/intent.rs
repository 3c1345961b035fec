// ABOUTME: Intent profiles (blog, portfolio, catalog, directory, custom) that order and group roles.
// ABOUTME: Each profile splits roles into required, recommended and optional sections.

use std::fmt;

use serde::Serialize;

pub const DEFAULT_INTENT: &str = "custom";

/// What kind of site the mapped items are meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntentProfile {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub recommended: &'static [&'static str],
    pub optional: &'static [&'static str],
}

pub const INTENT_PROFILES: &[IntentProfile] = &[
    IntentProfile {
        key: "blog",
        label: "Blog",
        description: "Posts with a title, body and date.",
        required: &["title"],
        recommended: &["description", "content", "date"],
        optional: &["author", "image", "thumbnail", "tags", "category", "link", "id"],
    },
    IntentProfile {
        key: "portfolio",
        label: "Portfolio",
        description: "Visual projects with a description and an image.",
        required: &["title"],
        recommended: &["description", "image", "thumbnail", "link"],
        optional: &["content", "tags", "category", "date", "id"],
    },
    IntentProfile {
        key: "catalog",
        label: "Catalog",
        description: "Products with a price and an image.",
        required: &["title"],
        recommended: &["price", "currency", "image", "description"],
        optional: &["category", "tags", "link", "id", "date", "thumbnail", "content"],
    },
    IntentProfile {
        key: "directory",
        label: "Directory",
        description: "Listings with a detail card and a link.",
        required: &["title"],
        recommended: &["description", "category", "link"],
        optional: &["image", "thumbnail", "tags", "date", "id", "content"],
    },
    IntentProfile {
        key: "custom",
        label: "Custom",
        description: "Pick whichever fields you like.",
        required: &["title"],
        recommended: &[],
        optional: &[],
    },
];

/// Where a role is shown for a given intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Required,
    Recommended,
    Optional,
    Other,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Section::Required => "required",
            Section::Recommended => "recommended",
            Section::Optional => "optional",
            Section::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Trimmed, lowercased intent key; empty or unknown intents become `custom`.
pub fn normalize_intent(intent: Option<&str>) -> &'static str {
    let wanted = intent.map(|i| i.trim().to_lowercase()).unwrap_or_default();
    INTENT_PROFILES
        .iter()
        .find(|p| p.key == wanted)
        .map_or(DEFAULT_INTENT, |p| p.key)
}

pub fn profile_for(intent: Option<&str>) -> &'static IntentProfile {
    let key = normalize_intent(intent);
    INTENT_PROFILES
        .iter()
        .find(|p| p.key == key)
        .unwrap_or(&INTENT_PROFILES[INTENT_PROFILES.len() - 1])
}

/// Roles ordered required, recommended, optional without repeats.
/// Empty for `custom`, meaning "use the catalog order".
pub fn roles_for_intent(intent: Option<&str>) -> Vec<&'static str> {
    let profile = profile_for(intent);
    if profile.key == DEFAULT_INTENT {
        return Vec::new();
    }
    let mut out: Vec<&'static str> = Vec::new();
    for role in profile
        .required
        .iter()
        .chain(profile.recommended)
        .chain(profile.optional)
    {
        if !out.contains(role) {
            out.push(*role);
        }
    }
    out
}

pub fn section_for(intent: Option<&str>, role: &str) -> Section {
    let profile = profile_for(intent);
    let listed = |roles: &[&str]| roles.iter().any(|r| *r == role);
    if listed(profile.required) {
        Section::Required
    } else if listed(profile.recommended) {
        Section::Recommended
    } else if listed(profile.optional) {
        Section::Optional
    } else {
        Section::Other
    }
}

/// Human label for a role; unknown roles are title-cased with `_` as spaces.
pub fn role_label(role: &str) -> String {
    let known = match role.trim().to_lowercase().as_str() {
        "title" => "Title",
        "subtitle" => "Subtitle",
        "description" => "Short description",
        "content" => "Content",
        "image" => "Main image",
        "thumbnail" => "Thumbnail",
        "date" => "Date",
        "author" => "Author",
        "category" => "Category",
        "tags" => "Tags",
        "price" => "Price",
        "currency" => "Currency",
        "link" => "Link",
        "id" => "ID",
        _ => "",
    };
    if !known.is_empty() {
        return known.to_string();
    }
    role.trim()
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_intents_become_custom() {
        assert_eq!(normalize_intent(None), "custom");
        assert_eq!(normalize_intent(Some("")), "custom");
        assert_eq!(normalize_intent(Some("  BLOG ")), "blog");
        assert_eq!(normalize_intent(Some("newsletter")), "custom");
        assert_eq!(profile_for(Some("Catalog")).label, "Catalog");
    }

    #[test]
    fn roles_are_ordered_and_unique() {
        assert_eq!(
            roles_for_intent(Some("directory")),
            vec!["title", "description", "category", "link", "image", "thumbnail", "tags", "date", "id", "content"]
        );
        assert!(roles_for_intent(Some("custom")).is_empty());
        assert!(roles_for_intent(None).is_empty());
    }

    #[test]
    fn sections() {
        assert_eq!(section_for(Some("blog"), "title"), Section::Required);
        assert_eq!(section_for(Some("blog"), "date"), Section::Recommended);
        assert_eq!(section_for(Some("blog"), "author"), Section::Optional);
        assert_eq!(section_for(Some("blog"), "price"), Section::Other);
        assert_eq!(section_for(None, "title"), Section::Required);
        assert_eq!(Section::Recommended.to_string(), "recommended");
    }

    #[test]
    fn labels() {
        assert_eq!(role_label("image"), "Main image");
        assert_eq!(role_label("release_year"), "Release Year");
    }
}
