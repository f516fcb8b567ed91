//! SDK configuration.
//!
//! Configures the service base URL, the default header set and the
//! per-request timeout. Defaults point at a local development service.
//! Override via environment variables or explicit construction.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use url::Url;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Request timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for constructing a [`crate::ConfigSdk`].
///
/// Custom `Debug` implementation redacts credential-bearing header values
/// to prevent leakage in log output.
#[derive(Clone)]
pub struct SdkOptions {
    /// Service base URL, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Extra headers sent with every request. Merged over the default
    /// `Content-Type: application/json`; a caller entry with the same name
    /// (case-insensitive) replaces the default.
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout. `Duration::ZERO` means [`DEFAULT_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for SdkOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for SdkOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let shown = if is_sensitive_header(name) {
                    "[REDACTED]"
                } else {
                    value.as_str()
                };
                (name.as_str(), shown)
            })
            .collect();
        f.debug_struct("SdkOptions")
            .field("base_url", &self.base_url)
            .field("headers", &headers)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SdkOptions {
    /// Options for the given base URL with default headers and timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Add a header, replacing any previous value under the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load options from environment variables.
    ///
    /// Variables:
    /// - `CFGSVC_BASE_URL` (default: `http://localhost:3000/api`)
    /// - `CFGSVC_TIMEOUT_SECS` (default: 30)
    /// - `CFGSVC_HEADERS` (comma-separated `Name: value` pairs, default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var("CFGSVC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        // Fail early on a bad URL rather than at first request.
        parse_base_url(&base_url)?;

        let timeout = std::env::var("CFGSVC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let mut headers = BTreeMap::new();
        if let Ok(raw) = std::env::var("CFGSVC_HEADERS") {
            for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
                let (name, value) = parse_header_pair(entry)?;
                headers.insert(name, value);
            }
        }

        Ok(Self {
            base_url,
            headers,
            timeout,
        })
    }

    /// The effective timeout, substituting the default for zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// The base URL, parsed and checked for an HTTP scheme.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url)
    }

    /// The default JSON content type merged with the caller's headers.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::InvalidHeader(name.clone(), e.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ConfigError::InvalidHeader(name.clone(), e.to_string()))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

/// Split a `Name: value` header line into its parts.
pub fn parse_header_pair(raw: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = raw.split_once(':').ok_or_else(|| {
        ConfigError::InvalidHeader(raw.trim().to_string(), "expected `Name: value`".into())
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidHeader(
            raw.trim().to_string(),
            "empty header name".into(),
        ));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn is_sensitive_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    matches!(lower.as_str(), "authorization" | "cookie" | "x-api-key") || lower.contains("token")
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid header {0}: {1}")]
    InvalidHeader(String, String),
}
