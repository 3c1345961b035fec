// ABOUTME: Error types for the few fallible core entry points.
// ABOUTME: Data-shape anomalies are never errors; only unusable mapping input is.

use std::fmt;
use thiserror::Error;

/// Errors raised when turning external input into a role mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The mapping text is not valid JSON.
    #[error("failed to parse mapping: {0}")]
    Parse(String),

    /// The mapping parsed, but is not a JSON object of role -> key.
    #[error("invalid mapping: {0}")]
    Invalid(String),
}

impl MappingError {
    pub fn parse(err: impl fmt::Display) -> Self {
        MappingError::Parse(err.to_string())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        MappingError::Invalid(msg.into())
    }
}
