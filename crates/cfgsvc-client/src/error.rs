//! Configuration service client error types.

/// Errors from configuration service calls.
///
/// HTTP-facing variants carry the `endpoint` that failed (for example
/// `"GET /config/display"`) so log lines and CLI output point at the call
/// without needing a backtrace.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The request could not be built: bad URL segment, header, or body.
    #[error("failed to build request for {endpoint}: {reason}")]
    RequestConstruction { endpoint: String, reason: String },

    /// HTTP transport error (connection refused, timeout, broken body stream).
    #[error("HTTP error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The service returned a non-2xx status.
    #[error("configuration service {endpoint} returned {status}: {body}")]
    Remote {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response body was not the expected JSON shape.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// Document failed schema validation before the operation could proceed.
    #[error("validation of {name} failed: {}", errors.join("; "))]
    Validation { name: String, errors: Vec<String> },

    /// Invalid SDK options.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl SdkError {
    /// HTTP status of a `Remote` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Schema violations carried by a `Validation` error.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
