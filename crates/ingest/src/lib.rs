// ABOUTME: Ingestion library for cardscope: fetches remote payloads and parses JSON or XML text.
// ABOUTME: Produces the value trees and raw text that cardscope-core analyzes.

pub mod error;
pub mod fetch;
pub mod parse;
pub mod xml;

pub use cardscope_core::{detect_format, SourceFormat};
pub use error::{ErrorCode, IngestError};
pub use fetch::{
    build_client, decode_text, fetch, fetch_with, is_private_ip, FetchOptions, FetchResult,
    DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use parse::{make_preview, parse_raw, summarize};
pub use xml::xml_to_value;
