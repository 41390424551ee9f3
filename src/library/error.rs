//! Error types for library operations.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;

/// The store operation a request error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchList,
    Upload,
    BatchImport,
    Download,
    Detail,
    Delete,
}

impl Operation {
    /// Message shown when the service did not supply one.
    #[must_use]
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::FetchList => "failed to fetch literature list",
            Self::Upload => "literature upload failed",
            Self::BatchImport => "batch import failed",
            Self::Download => "failed to download literature",
            Self::Detail => "failed to fetch literature detail",
            Self::Delete => "failed to delete literature",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FetchList => "fetch_list",
            Self::Upload => "upload",
            Self::BatchImport => "batch_import",
            Self::Download => "download",
            Self::Detail => "detail",
            Self::Delete => "delete",
        };
        write!(f, "{label}")
    }
}

/// Errors surfaced by [`super::LibraryStore`] operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// A call to the literature service failed.
    #[error("{operation}: {message}")]
    Request {
        operation: Operation,
        /// Server-provided message, or the operation's fallback.
        message: String,
        #[source]
        source: ApiError,
    },

    /// The import job reported a terminal `error` event.
    #[error("import {import_id} failed: {message}")]
    ImportRejected { import_id: String, message: String },

    /// The progress stream closed before a terminal event arrived.
    #[error("progress stream for import {import_id} closed before completion")]
    StreamClosed { import_id: String },

    /// The caller cancelled the import, possibly before a job id was issued.
    #[error("import cancelled")]
    Cancelled { import_id: Option<String> },

    /// No terminal event arrived within the configured timeout.
    #[error("import {import_id} timed out after {}s", .timeout.as_secs())]
    TimedOut { import_id: String, timeout: Duration },

    /// The import completed but refreshing the list afterwards failed.
    #[error("import {import_id} completed but the list refresh failed: {source}")]
    Refresh {
        import_id: String,
        #[source]
        source: Box<LibraryError>,
    },

    /// A batch import was requested with no files.
    #[error("no files selected for import")]
    NoFiles,

    /// Writing a downloaded file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LibraryError {
    /// Wraps a service failure, preferring the service's own message.
    pub fn request(operation: Operation, source: ApiError) -> Self {
        let message = source
            .server_message()
            .map_or_else(|| operation.fallback_message().to_string(), ToString::to_string);
        Self::Request {
            operation,
            message,
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The string stored in the cache state's `error` field.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Request { message, .. } | Self::ImportRejected { message, .. } => message.clone(),
            Self::Refresh { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}
