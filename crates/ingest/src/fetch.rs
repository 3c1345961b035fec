// ABOUTME: HTTP fetching of remote payloads with SSRF protection, a timeout and a byte limit.
// ABOUTME: Decodes bodies to text using the Content-Type charset or chardetng detection.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use tracing::{debug, warn};
use url::Url;

use crate::error::IngestError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_MAX_BYTES: usize = 1_000_000;
pub const DEFAULT_USER_AGENT: &str = "cardscope/1.0";

static PRIVATE_V4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    [
        "0.0.0.0/8",
        "10.0.0.0/8",
        "100.64.0.0/10",
        "127.0.0.0/8",
        "169.254.0.0/16",
        "172.16.0.0/12",
        "192.168.0.0/16",
    ]
    .iter()
    .map(|net| net.parse().unwrap())
    .collect()
});

static PRIVATE_V6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    ["fc00::/7", "fe80::/10"]
        .iter()
        .map(|net| net.parse().unwrap())
        .collect()
});

/// Options for fetching a payload.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Bodies larger than this fail with `TooLarge`.
    pub max_bytes: usize,
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub headers: HashMap<String, String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private_networks: false,
            headers: HashMap::new(),
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.allow_private_networks = allow;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A successfully fetched payload.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Body decoded to text.
    pub fn text(&self) -> String {
        decode_text(&self.body, self.content_type.as_deref())
    }

    /// Short status line, e.g. `HTTP 200. 512 characters.`
    pub fn summary(&self) -> String {
        format!("HTTP {}. {} characters.", self.status, self.text().chars().count())
    }
}

/// Loopback, private, link-local and unspecified ranges.
pub fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => {
            if ip.is_loopback() || ip.is_unspecified() {
                return true;
            }
            if let Some(mapped) = ip.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(mapped));
            }
            PRIVATE_V6.iter().any(|net| net.contains(ip))
        }
    }
}

/// Decodes bytes using the `charset` of `content_type`, or a detected encoding when absent.
pub fn decode_text(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .find_map(|part| {
            part.trim()
                .strip_prefix("charset=")
                .map(|c| c.trim_matches('"').trim_matches('\'').to_string())
        })
}

fn parse_url(url: &str) -> Result<Url, IngestError> {
    if url.trim().is_empty() {
        return Err(IngestError::invalid_url(url, Some(anyhow::anyhow!("URL is empty"))));
    }
    let parsed = Url::parse(url.trim())
        .map_err(|e| IngestError::invalid_url(url, Some(anyhow::anyhow!("invalid URL: {}", e))))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(IngestError::invalid_url(
            url,
            Some(anyhow::anyhow!("URL must start with http:// or https://")),
        )),
    }
}

/// Fails with `Blocked` when `target` names or resolves to a private address.
async fn ensure_public(target: &Url, original: &str, redirected: bool) -> Result<(), IngestError> {
    let Some(host) = target.host_str() else {
        return Err(IngestError::invalid_url(original, Some(anyhow::anyhow!("URL has no host"))));
    };
    let what = if redirected { "redirect to a private address" } else { "private address" };
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            warn!(url = original, host, "blocked {}", what);
            return Err(IngestError::blocked(original, Some(anyhow::anyhow!("{} is not allowed", what))));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((bare, port))
        .await
        .map_err(|e| IngestError::fetch(original, Some(anyhow::anyhow!("DNS lookup failed: {}", e))))?;
    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            warn!(url = original, host, "blocked {}", what);
            return Err(IngestError::blocked(original, Some(anyhow::anyhow!("{} is not allowed", what))));
        }
    }
    Ok(())
}

fn request_error(url: &str, err: reqwest::Error) -> IngestError {
    if err.is_timeout() {
        IngestError::timeout(url, Some(anyhow::anyhow!("no response within the time limit")))
    } else {
        IngestError::fetch(url, Some(anyhow::anyhow!("request failed: {}", err)))
    }
}

/// Builds the HTTP client used by [`fetch`].
pub fn build_client(opts: &FetchOptions) -> Result<reqwest::Client, IngestError> {
    reqwest::Client::builder()
        .user_agent(opts.user_agent.clone())
        .timeout(opts.timeout)
        .build()
        .map_err(|e| IngestError::fetch("", Some(anyhow::anyhow!("failed to build HTTP client: {}", e))))
}

/// Fetches `url` with a fresh client.
pub async fn fetch(url: &str, opts: &FetchOptions) -> Result<FetchResult, IngestError> {
    let client = build_client(opts)?;
    fetch_with(&client, url, opts).await
}

/// Fetches `url` with an existing client.
pub async fn fetch_with(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, IngestError> {
    let parsed = parse_url(url)?;
    if !opts.allow_private_networks {
        ensure_public(&parsed, url, false).await?;
    }

    let mut request = client.get(parsed.clone()).timeout(opts.timeout);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    debug!(url, "fetching");
    let mut response = request.send().await.map_err(|e| request_error(url, e))?;

    if !opts.allow_private_networks && response.url() != &parsed {
        ensure_public(response.url(), url, true).await?;
    }

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::fetch(url, Some(anyhow::anyhow!("HTTP status {}", status.as_u16()))));
    }

    if let Some(len) = response.content_length() {
        if len > opts.max_bytes as u64 {
            return Err(IngestError::too_large(url, opts.max_bytes));
        }
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| request_error(url, e))? {
        if body.len() + chunk.len() > opts.max_bytes {
            return Err(IngestError::too_large(url, opts.max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");
    Ok(FetchResult {
        status: status.as_u16(),
        url: url.to_string(),
        final_url,
        content_type,
        body: Bytes::from(body),
    })
}
