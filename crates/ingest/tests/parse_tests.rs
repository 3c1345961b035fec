// ABOUTME: Integration tests for parsing raw payloads and analyzing the resulting trees.
// ABOUTME: Checks JSON and XML inputs flow into collection detection unchanged.

use cardscope_core::{analyze, Path};
use cardscope_ingest::{make_preview, parse_raw, summarize, SourceFormat};
use pretty_assertions::assert_eq;

#[test]
fn json_payload_round_trip_into_analysis() {
    let raw = r#"{"data": {"items": [{"id": "a", "name": "One"}, {"id": "b", "name": "Two"}]}}"#;
    let (format, tree) = parse_raw(raw).unwrap();
    assert_eq!(format, SourceFormat::Json);
    assert_eq!(summarize(format, &tree), "Detected format: json. Root: dict. Root keys: 1.");

    let analysis = analyze(&tree, Some(raw));
    assert_eq!(
        analysis.main_collection.path,
        Some(Path::new().key("data").key("items"))
    );
    assert_eq!(analysis.keys.all, vec!["id", "name"]);
}

#[test]
fn rss_items_are_detected() {
    let raw = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Blog</title>
    <link>https://example.com</link>
    <item>
      <title>First</title>
      <link>https://example.com/1</link>
      <pubDate>2024-01-15</pubDate>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.com/2</link>
      <pubDate>2024-01-16</pubDate>
    </item>
  </channel>
</rss>"#;
    let (format, tree) = parse_raw(raw).unwrap();
    assert_eq!(format, SourceFormat::Xml);

    let analysis = analyze(&tree, Some(raw));
    assert!(analysis.main_collection.found);
    assert_eq!(
        analysis.main_collection.path,
        Some(Path::new().key("rss").key("channel").key("item"))
    );
    assert_eq!(analysis.main_collection.count, 2);
    assert_eq!(analysis.suggestions.first("title"), Some("title"));
    assert_eq!(analysis.suggestions.first("date"), Some("pubDate"));
}

#[test]
fn single_xml_item_is_not_a_list() {
    let raw = "<feed><entry><title>Only</title></entry></feed>";
    let (_, tree) = parse_raw(raw).unwrap();
    let analysis = analyze(&tree, Some(raw));
    assert!(!analysis.main_collection.found);
    assert!(!analysis.message.is_empty());
}

#[test]
fn preview_is_bounded() {
    let raw = "a".repeat(1000);
    assert_eq!(make_preview(&raw, 600).len(), 600);
}
