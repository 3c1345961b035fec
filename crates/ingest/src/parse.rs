// ABOUTME: Turns raw payload text into a value tree, labelled by format.
// ABOUTME: Also builds the short summary and preview strings shown next to an analysis.

use cardscope_core::{detect_format, root_type, SourceFormat};
use serde_json::Value;
use tracing::debug;

use crate::error::IngestError;
use crate::xml::xml_to_value;

/// Parses JSON or XML text. Anything else is [`ErrorCode::UnknownFormat`](crate::ErrorCode).
pub fn parse_raw(raw: &str) -> Result<(SourceFormat, Value), IngestError> {
    let format = detect_format(raw);
    let tree = match format {
        SourceFormat::Json => serde_json::from_str(raw).map_err(IngestError::parse)?,
        SourceFormat::Xml => xml_to_value(raw)?,
        SourceFormat::Unknown => return Err(IngestError::unknown_format()),
    };
    debug!(format = %format, root = root_type(&tree), "parsed payload");
    Ok((format, tree))
}

/// One-line description of the parsed root.
pub fn summarize(format: SourceFormat, tree: &Value) -> String {
    match tree {
        Value::Object(map) => format!(
            "Detected format: {}. Root: dict. Root keys: {}.",
            format,
            map.len()
        ),
        Value::Array(items) => format!(
            "Detected format: {}. Root: list. Items: {}.",
            format,
            items.len()
        ),
        other => format!("Detected format: {}. Root: {}.", format, root_type(other)),
    }
}

/// The first `max_chars` characters of `raw`.
pub fn make_preview(raw: &str, max_chars: usize) -> String {
    raw.chars().take(max_chars).collect()
}
