// ABOUTME: Error types for ingestion including the ErrorCode enum and IngestError struct.
// ABOUTME: Categorizes fetch, parse and safety failures with constructors and boolean helpers.

use std::fmt;

/// Categories of ingestion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Blocked,
    Fetch,
    Timeout,
    TooLarge,
    Parse,
    UnknownFormat,
    UnsafeXml,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Blocked => "private network address blocked",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::TooLarge => "input too large",
            ErrorCode::Parse => "parse error",
            ErrorCode::UnknownFormat => "content is neither JSON nor XML",
            ErrorCode::UnsafeXml => "unsafe XML",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, thiserror::Error)]
pub struct IngestError {
    pub code: ErrorCode,
    /// URL or other label of the input that failed.
    pub target: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.target.is_empty() {
            write!(f, "cardscope: {}", self.code)?;
        } else {
            write!(f, "cardscope: {}: {}", self.target, self.code)?;
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl IngestError {
    pub fn new(code: ErrorCode, target: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code,
            target: target.into(),
            source,
        }
    }

    pub fn invalid_url(target: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::InvalidUrl, target, source)
    }

    pub fn blocked(target: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Blocked, target, source)
    }

    pub fn fetch(target: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Fetch, target, source)
    }

    pub fn timeout(target: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Timeout, target, source)
    }

    /// Body exceeded `limit` bytes.
    pub fn too_large(target: impl Into<String>, limit: usize) -> Self {
        Self::new(
            ErrorCode::TooLarge,
            target,
            Some(anyhow::anyhow!("limit is {} bytes", limit)),
        )
    }

    pub fn parse(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Parse, "", Some(source.into()))
    }

    pub fn unknown_format() -> Self {
        Self::new(ErrorCode::UnknownFormat, "", None)
    }

    pub fn unsafe_xml(reason: impl fmt::Display) -> Self {
        Self::new(ErrorCode::UnsafeXml, "", Some(anyhow::anyhow!("{}", reason)))
    }

    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    pub fn is_blocked(&self) -> bool {
        self.code == ErrorCode::Blocked
    }

    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    pub fn is_too_large(&self) -> bool {
        self.code == ErrorCode::TooLarge
    }

    pub fn is_parse(&self) -> bool {
        self.code == ErrorCode::Parse
    }

    pub fn is_unknown_format(&self) -> bool {
        self.code == ErrorCode::UnknownFormat
    }

    pub fn is_unsafe_xml(&self) -> bool {
        self.code == ErrorCode::UnsafeXml
    }
}
