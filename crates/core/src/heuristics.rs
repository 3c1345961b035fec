// ABOUTME: Stateless shape predicates used as scoring signals (URL, date, number).
// ABOUTME: All predicates are total: any value is accepted and anything unexpected is just "no".

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}[-/]\d{2}[-/]\d{2}").unwrap());
static ISO_DATETIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}T").unwrap());

/// Lowercased, trimmed form used for key and hint comparisons.
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True for strings starting with `http://` or `https://` (case-insensitive, trimmed).
pub fn looks_like_url(value: &Value) -> bool {
    value.as_str().is_some_and(is_absolute_url)
}

fn is_absolute_url(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Looser URL check for display links: absolute http(s) URLs plus
/// root-relative (`/a`) and relative (`./a`, `../a`) paths.
pub fn looks_like_link(text: &str) -> bool {
    if is_absolute_url(text) {
        return true;
    }
    let t = text.trim();
    t.chars().count() > 1 && (t.starts_with('/') || t.starts_with("./") || t.starts_with("../"))
}

/// True for strings containing `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYY-MM-DDT`.
pub fn looks_like_date(value: &Value) -> bool {
    match value.as_str() {
        Some(text) => {
            let text = text.trim();
            DATE_RE.is_match(text) || ISO_DATETIME_RE.is_match(text)
        }
        None => false,
    }
}

/// True for JSON numbers. Booleans are a separate variant and never count.
pub fn looks_like_number(value: &Value) -> bool {
    value.is_number()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_detection() {
        assert!(looks_like_url(&json!("https://example.com")));
        assert!(looks_like_url(&json!("  HTTP://EXAMPLE.COM/a ")));
        assert!(!looks_like_url(&json!("example.com")));
        assert!(!looks_like_url(&json!("/relative/path")));
        assert!(!looks_like_url(&json!(42)));
        assert!(!looks_like_url(&json!(null)));
    }

    #[test]
    fn link_detection_accepts_relative_paths() {
        assert!(looks_like_link("https://example.com/a"));
        assert!(looks_like_link("/images/a.png"));
        assert!(looks_like_link("./a.png"));
        assert!(looks_like_link("../a.png"));
        assert!(!looks_like_link("/"));
        assert!(!looks_like_link("images/a.png"));
        assert!(!looks_like_link(""));
    }

    #[test]
    fn date_detection() {
        assert!(looks_like_date(&json!("2024-01-15")));
        assert!(looks_like_date(&json!("2024/01/15")));
        assert!(looks_like_date(&json!("2024-01-15T10:00:00Z")));
        assert!(looks_like_date(&json!("published 2024-01-15 at noon")));
        assert!(!looks_like_date(&json!("15 Jan 2024")));
        assert!(!looks_like_date(&json!(20240115)));
    }

    #[test]
    fn number_detection_excludes_booleans() {
        assert!(looks_like_number(&json!(3)));
        assert!(looks_like_number(&json!(3.5)));
        assert!(!looks_like_number(&json!(true)));
        assert!(!looks_like_number(&json!("3")));
    }

    #[test]
    fn normalize_key_trims_and_lowercases() {
        assert_eq!(normalize_key("  Title "), "title");
    }
}
