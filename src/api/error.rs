//! Error types for the API module.
//!
//! Every variant carries the URL (or path) of the failed operation so log
//! lines and user-facing messages keep their context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the literature service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The `message` field of the error body, if the service sent one.
        message: Option<String>,
    },

    /// The service answered 2xx but its envelope reported a failure code.
    #[error("service error {code} requesting {url}: {message}")]
    Server {
        /// The URL that was requested.
        url: String,
        /// The envelope's `code` field.
        code: i64,
        /// The envelope's `message` field.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// The URL whose response failed to decode.
        url: String,
        /// Decoder error description.
        reason: String,
    },

    /// The configured base URL or a derived endpoint is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A request was rejected before it was sent.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },

    /// File system error while reading an upload or writing a download.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Creates a network error from a reqwest error, mapping timeouts to [`ApiError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16, message: Option<String>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            message,
        }
    }

    /// Creates an envelope failure error.
    pub fn server(url: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self::Server {
            url: url.into(),
            code,
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
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

    /// Returns the message the service supplied for this failure, if any.
    ///
    /// Local validation failures count as supplied messages too, since they
    /// mirror limits the service would otherwise enforce.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::HttpStatus {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            Self::Server { message, .. } if !message.is_empty() => Some(message.as_str()),
            Self::InvalidRequest { reason } => Some(reason.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_timeout_display() {
        let error = ApiError::Timeout {
            url: "http://localhost/literature/list".to_string(),
        };
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("/literature/list"));
    }

    #[test]
    fn test_api_error_http_status_display() {
        let error = ApiError::http_status("http://localhost/literature/7", 404, None);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("/literature/7"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_server_message_prefers_body_message() {
        let error = ApiError::http_status("u", 500, Some("文献不存在".to_string()));
        assert_eq!(error.server_message(), Some("文献不存在"));

        let error = ApiError::http_status("u", 500, None);
        assert_eq!(error.server_message(), None);
    }

    #[test]
    fn test_server_message_for_envelope_failure() {
        let error = ApiError::server("u", 1005, "literature not found");
        assert_eq!(error.server_message(), Some("literature not found"));
        assert!(error.to_string().contains("1005"));

        let empty = ApiError::server("u", 500, "");
        assert_eq!(empty.server_message(), None);
    }

    #[test]
    fn test_api_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = ApiError::io(PathBuf::from("/tmp/paper.pdf"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/paper.pdf"), "Expected path in: {msg}");
        assert_eq!(error.server_message(), None);
    }

    #[test]
    fn test_invalid_request_counts_as_message() {
        let error = ApiError::invalid_request("at most 16 files per batch import");
        assert_eq!(
            error.server_message(),
            Some("at most 16 files per batch import")
        );
    }
}
