// ABOUTME: Integration tests for the analyze -> suggest -> validate -> normalize pipeline.
// ABOUTME: Covers detection preferences, suggestion uniqueness, validation outcomes and idempotence.

use std::collections::HashSet;

use cardscope_core::{
    analyze, find_main_collection, mapping_from_json, mapping_quality, normalize_analysis,
    normalize_items, resolve, suggest_roles, validate_mapping, Grade, NormalizeOptions, Path,
    RoleMapping, ValidationOptions, ROLE_CATALOG,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn articles_payload() -> Value {
    json!({
        "meta": {"links": [{"rel": "self"}, {"rel": "next"}], "total": 3},
        "data": {
            "articles": [
                {
                    "id": 1,
                    "headline": "Rust 2024 edition lands",
                    "summary": "What changed and why it matters.",
                    "cover": {"url": "https://cdn.example.com/1.jpg"},
                    "permalink": "https://example.com/a/1",
                    "created_at": "2024-10-20T08:00:00Z",
                    "author": "Ana"
                },
                {
                    "id": 2,
                    "headline": "Async closures",
                    "summary": "A long awaited feature.",
                    "cover": {"url": "https://cdn.example.com/2.jpg"},
                    "permalink": "https://example.com/a/2",
                    "created_at": "2024-11-02T09:30:00Z",
                    "author": "Bo"
                },
                {
                    "id": 3,
                    "headline": "Trait upcasting",
                    "summary": "",
                    "cover": null,
                    "permalink": "not a link",
                    "created_at": "2024-12-01T10:00:00Z",
                    "author": "Cy"
                }
            ]
        }
    })
}

#[test]
fn root_list_is_found_at_empty_path() {
    let tree = json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]);
    let main = find_main_collection(&tree);
    assert!(main.found);
    assert_eq!(main.path, Some(Path::new()));
    assert_eq!(main.count, 2);
}

#[test]
fn larger_denser_list_wins() {
    let tree = json!({
        "small": [{"id": 1}],
        "large": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}, {"id": 3, "title": "C"}]
    });
    let main = find_main_collection(&tree);
    assert_eq!(main.path, Some(Path::new().key("large")));
    assert_eq!(main.count, 3);
}

#[test]
fn metadata_lists_are_avoided() {
    let tree = json!({
        "meta": {"links": [{"rel": "self"}, {"rel": "next"}]},
        "articles": [{"id": 1, "title": "Real"}, {"id": 2, "title": "Other"}]
    });
    let main = find_main_collection(&tree);
    assert_eq!(main.path, Some(Path::new().key("articles")));
}

#[test]
fn empty_list_is_not_found() {
    let main = find_main_collection(&json!([]));
    assert!(!main.found);
    assert_eq!(main.count, 0);
    assert_eq!(main.path, None);
}

#[test]
fn resolve_identity_and_lookup() {
    let tree = json!({"items": [{"name": "A"}]});
    assert_eq!(resolve(&tree, &Path::new()), Some(&tree));
    let path = Path::new().key("items").index(0).key("name");
    assert_eq!(resolve(&tree, &path), Some(&json!("A")));
    let invalid = Path::new().key("items").index(4).key("name");
    assert_eq!(resolve(&tree, &invalid), None);
    let wrong_kind = Path::new().index(0);
    assert_eq!(resolve(&tree, &wrong_kind), None);
}

#[test]
fn top_suggestions_are_unique_across_roles() {
    let tree = articles_payload();
    let analysis = analyze(&tree, None);
    let items = resolve(&tree, analysis.main_collection.path.as_ref().unwrap()).unwrap();
    let suggestions = suggest_roles(items);

    let mut seen = HashSet::new();
    for role in ROLE_CATALOG {
        if let Some(first) = suggestions.first(role.id) {
            assert!(seen.insert(first.to_string()), "{} reused as a top pick", first);
        }
    }
}

#[test]
fn created_at_is_a_date_suggestion() {
    let items = json!([
        {"title": "A", "created_at": "2024-01-01T00:00:00Z"},
        {"title": "B", "created_at": "2024-01-02T00:00:00Z"}
    ]);
    let suggestions = suggest_roles(&items);
    assert!(suggestions.get("date").iter().any(|k| k.contains("created")));
}

#[test]
fn validation_property_cases() {
    let none_required = ValidationOptions::new().required_roles(Vec::<String>::new());
    let result = validate_mapping(&serde_json::Map::new(), None, &none_required);
    assert!(result.ok);
    assert!(result.errors.is_empty());

    let raw = mapping_from_json(r#"{"title": ""}"#).unwrap();
    let result = validate_mapping(&raw, None, &ValidationOptions::new().required_roles(["title"]));
    assert!(!result.ok);
    assert_eq!(result.cleaned["title"], "");

    let raw = mapping_from_json(r#"{"title": "content", "description": "content"}"#).unwrap();
    let explicit = ValidationOptions::new().prevent_duplicates_in(["title", "description"]);
    let result = validate_mapping(&raw, None, &explicit);
    assert!(!result.ok);
    assert!(result.errors.iter().any(|e| e.contains("content")));

    let loose = ValidationOptions::new().prevent_duplicates_in(["title"]);
    let result = validate_mapping(&raw, None, &loose);
    assert!(result.ok);
    assert!(result.warnings.iter().any(|w| w.contains("content")));
}

#[test]
fn end_to_end_articles() {
    let tree = articles_payload();
    let analysis = analyze(&tree, Some("{\"meta\": {}}"));
    assert_eq!(analysis.format.to_string(), "json");
    assert_eq!(analysis.root_type, "dict");
    assert_eq!(
        analysis.main_collection.path,
        Some(Path::new().key("data").key("articles"))
    );
    assert_eq!(analysis.main_collection.count, 3);

    let raw = mapping_from_json(
        r#"{"title": "headline", "description": "summary", "image": "cover.url", "link": "permalink", "date": "created_at"}"#,
    )
    .unwrap();
    let validation = validate_mapping(&raw, Some(&analysis), &ValidationOptions::default());
    assert!(validation.ok, "{:?}", validation.errors);
    // cover.url is a nested path, not a top-level key
    assert_eq!(validation.warnings.len(), 1);

    let items = normalize_analysis(&tree, &analysis, &validation.cleaned, &NormalizeOptions::default());
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].title, "Rust 2024 edition lands");
    assert_eq!(items[0].image, "https://cdn.example.com/1.jpg");
    assert_eq!(items[0].link, "https://example.com/a/1");
    assert_eq!(items[2].description, "");
    assert_eq!(items[2].image, "");
    assert_eq!(items[2].link, "");
    assert_eq!(
        items[0].mapping_info.as_ref().map(|m| m.len()),
        Some(4)
    );

    let quality = mapping_quality(&validation.cleaned);
    assert_eq!(quality.score, 95);
    assert_eq!(quality.grade, Grade::Excellent);
}

#[test]
fn normalize_is_idempotent() {
    let tree = articles_payload();
    let path = Path::new().key("data").key("articles");
    let mapping: RoleMapping = [("title".to_string(), "headline".to_string())].into();
    let opts = NormalizeOptions::new().limit(2);
    let first = normalize_items(&tree, &path, &mapping, &opts);
    let second = normalize_items(&tree, &path, &mapping, &opts);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn scalar_payload_degrades_gracefully() {
    let tree = json!("just a string");
    let analysis = analyze(&tree, Some("just a string"));
    assert!(!analysis.main_collection.found);
    assert_eq!(analysis.root_type, "str");
    assert!(analysis.suggestions.is_empty());
    let items = normalize_analysis(&tree, &analysis, &RoleMapping::new(), &NormalizeOptions::default());
    assert!(items.is_empty());
}
