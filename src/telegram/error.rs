//! Error types for the chat platform boundary.
//!
//! Every variant carries the Bot API method (or file path) it came from so
//! log lines and user-facing failure texts stay actionable. Transport errors
//! are stored with their URL stripped because request URLs embed the bot token.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`ChatApi`](super::ChatApi) implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error calling {method}: {source}")]
    Network {
        /// The API method that failed.
        method: &'static str,
        /// The underlying network error, URL removed.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout calling {method}")]
    Timeout {
        /// The API method that timed out.
        method: &'static str,
    },

    /// Non-success HTTP response without a parseable API error body.
    #[error("HTTP {status} calling {method}")]
    HttpStatus {
        /// The API method that failed.
        method: &'static str,
        /// The HTTP status code.
        status: u16,
    },

    /// The platform answered with `ok: false`.
    #[error("{method} failed ({code}): {description}")]
    Api {
        /// The API method that failed.
        method: &'static str,
        /// Platform error code (mirrors HTTP status semantics).
        code: u16,
        /// Platform error description.
        description: String,
        /// Seconds to wait before retrying, when the platform is rate limiting.
        retry_after: Option<u64>,
    },

    /// Response body could not be interpreted.
    #[error("invalid response from {method}: {reason}")]
    InvalidResponse {
        /// The API method whose response was rejected.
        method: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// File system error while reading or writing a transferred file.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configured API base URL is unusable.
    #[error("invalid API URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },
}

impl ApiError {
    /// Creates a network error, stripping the request URL from the source.
    pub fn network(method: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { method };
        }
        Self::Network {
            method,
            source: source.without_url(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(method: &'static str, status: u16) -> Self {
        Self::HttpStatus { method, status }
    }

    /// Creates a platform error without a retry hint.
    pub fn api(method: &'static str, code: u16, description: impl Into<String>) -> Self {
        Self::Api {
            method,
            code,
            description: description.into(),
            retry_after: None,
        }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(method: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method,
            reason: reason.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the platform rejected an edit because the text did not change.
    #[must_use]
    pub fn is_message_not_modified(&self) -> bool {
        matches!(self, Self::Api { code: 400, description, .. } if description.contains("message is not modified"))
    }

    /// Returns the server-mandated wait, if any.
    #[must_use]
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
