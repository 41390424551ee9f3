//! Error types for the progress stream transport.

use thiserror::Error;

/// Failures opening or reading a progress stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The stream URL is malformed.
    #[error("invalid stream URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The connection could not be established.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status} opening stream {url}")]
    HttpStatus { url: String, status: u16 },

    /// The connection failed after it was established.
    #[error("stream transport error: {reason}")]
    Transport { reason: String },

    /// The transport client could not be built.
    #[error("failed to build stream client: {reason}")]
    Client { reason: String },
}

impl StreamError {
    /// Creates a transport error from any displayable cause.
    pub fn transport(reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            reason: reason.to_string(),
        }
    }
}
