// ABOUTME: Static catalog of semantic roles (title, image, date, ...) with name hints and value kinds.
// ABOUTME: Also fixes the role priority order used by greedy suggestion and duplicate scanning.

use std::fmt;

use serde::Serialize;

/// The kind of value a role expects; drives the type bonus during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Text,
    Url,
    Date,
    Number,
    List,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoleKind::Text => "text",
            RoleKind::Url => "url",
            RoleKind::Date => "date",
            RoleKind::Number => "number",
            RoleKind::List => "list",
        };
        write!(f, "{}", s)
    }
}

/// A semantic slot a card can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub id: &'static str,
    pub hints: &'static [&'static str],
    pub kind: RoleKind,
}

/// Every role the system understands, in display order.
pub const ROLE_CATALOG: &[RoleDefinition] = &[
    RoleDefinition {
        id: "id",
        hints: &["id", "uuid", "identifier"],
        kind: RoleKind::Text,
    },
    RoleDefinition {
        id: "title",
        hints: &["title", "name", "headline", "label"],
        kind: RoleKind::Text,
    },
    RoleDefinition {
        id: "subtitle",
        hints: &["subtitle", "tagline", "subheading"],
        kind: RoleKind::Text,
    },
    RoleDefinition {
        id: "description",
        hints: &["description", "summary", "desc", "body", "text"],
        kind: RoleKind::Text,
    },
    RoleDefinition {
        id: "content",
        hints: &["content", "html", "markdown", "article", "post"],
        kind: RoleKind::Text,
    },
    RoleDefinition {
        id: "image",
        hints: &["image", "img", "photo", "picture"],
        kind: RoleKind::Url,
    },
    RoleDefinition {
        id: "thumbnail",
        hints: &["thumbnail", "thumb", "avatar", "icon"],
        kind: RoleKind::Url,
    },
    RoleDefinition {
        id: "link",
        hints: &["url", "link", "href", "permalink", "website"],
        kind: RoleKind::Url,
    },
    RoleDefinition {
        id: "author",
        hints: &["author", "user", "username", "by", "creator"],
        kind: RoleKind::Text,
    },
    RoleDefinition {
        id: "date",
        hints: &["date", "created", "updated", "published", "timestamp"],
        kind: RoleKind::Date,
    },
    RoleDefinition {
        id: "category",
        hints: &["category", "section", "type", "topic"],
        kind: RoleKind::Text,
    },
    RoleDefinition {
        id: "tags",
        hints: &["tags", "tag", "keywords", "labels"],
        kind: RoleKind::List,
    },
    RoleDefinition {
        id: "price",
        hints: &["price", "amount", "cost", "value"],
        kind: RoleKind::Number,
    },
    RoleDefinition {
        id: "currency",
        hints: &["currency", "curr", "iso", "symbol"],
        kind: RoleKind::Text,
    },
];

/// Order in which roles claim keys: the most visible card slots first.
pub const ROLE_PRIORITY: &[&str] = &[
    "id",
    "title",
    "description",
    "image",
    "link",
    "subtitle",
    "content",
    "author",
    "date",
    "thumbnail",
    "category",
    "tags",
    "price",
    "currency",
];

/// Role ids in catalog order.
pub fn role_ids() -> Vec<&'static str> {
    ROLE_CATALOG.iter().map(|r| r.id).collect()
}

/// Looks up a role definition by id.
pub fn role(id: &str) -> Option<&'static RoleDefinition> {
    ROLE_CATALOG.iter().find(|r| r.id == id)
}

/// Position of a role in [`ROLE_PRIORITY`], if it has one.
pub fn priority_of(id: &str) -> Option<usize> {
    ROLE_PRIORITY.iter().position(|r| *r == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = ROLE_CATALOG.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), ROLE_CATALOG.len());
    }

    #[test]
    fn priority_covers_catalog() {
        for def in ROLE_CATALOG {
            assert!(priority_of(def.id).is_some(), "{} missing from priority", def.id);
        }
        assert_eq!(ROLE_PRIORITY.len(), ROLE_CATALOG.len());
    }

    #[test]
    fn lookup_by_id() {
        let date = role("date").unwrap();
        assert_eq!(date.kind, RoleKind::Date);
        assert!(date.hints.contains(&"created"));
        assert!(role("nope").is_none());
        assert_eq!(role_ids()[0], "id");
    }
}
