//! Wire models for the literature service.

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::SUCCESS_CODE;
use super::error::ApiError;
use super::filename::content_type_for;

/// A literature entry as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Literature {
    /// Server-assigned identifier.
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_file_name: Option<String>,
    /// File size in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub file_type: Option<String>,
    /// Comma-separated tags.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// AI-generated reading guide.
    #[serde(default)]
    pub reading_guide: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publish_year: Option<i32>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl Literature {
    /// Human-readable file size (`512 B`, `1.5 KB`, `2.0 MB`, ...).
    #[must_use]
    pub fn file_size_readable(&self) -> String {
        let Some(size) = self.file_size else {
            return String::new();
        };
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;
        #[allow(clippy::cast_precision_loss)]
        let value = size as f64;
        if size < KB {
            format!("{size} B")
        } else if size < MB {
            format!("{:.1} KB", value / KB as f64)
        } else if size < GB {
            format!("{:.1} MB", value / MB as f64)
        } else {
            format!("{:.1} GB", value / GB as f64)
        }
    }

    /// Title if present, else the original file name, else the id.
    #[must_use]
    pub fn display_title(&self) -> String {
        self.title
            .as_deref()
            .or(self.original_file_name.as_deref())
            .filter(|s| !s.is_empty())
            .map_or_else(|| format!("#{}", self.id), ToString::to_string)
    }
}

/// One page of list results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiteraturePage {
    /// Records on this page; absent decodes as empty.
    #[serde(default)]
    pub records: Vec<Literature>,
    /// Total number of matching records across all pages.
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub current: Option<u64>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
}

/// Query for the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub category: String,
    pub description: String,
    pub reading_guide: String,
    pub tags: String,
}

impl ListQuery {
    /// Query-string pairs in the order the service documents them.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("category", self.category.clone()),
            ("description", self.description.clone()),
            ("readingGuide", self.reading_guide.clone()),
            ("tags", self.tags.clone()),
        ]
    }
}

/// Acknowledgement of an accepted batch import.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTicket {
    /// Opaque job identifier used to address the progress stream.
    pub import_id: String,
}

/// A downloaded document held in memory.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Name derived from `Content-Disposition` (or the default).
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A file to upload, held in memory.
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Creates an upload from in-memory bytes, guessing the content type from the name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a file from disk into an upload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::io(path, e))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }

    pub(crate) fn to_part(&self) -> Result<reqwest::multipart::Part, ApiError> {
        reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)
            .map_err(|e| ApiError::invalid_request(format!("bad content type: {e}")))
    }
}

// Payload bytes are omitted from Debug output.
impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The service's `{code, message, data, timestamp}` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Decodes a response body that may or may not be wrapped in the envelope.
///
/// An envelope with a non-success code becomes [`ApiError::Server`].
pub(crate) fn decode_body<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::decode(url, e.to_string()))?;

    let payload = if is_envelope(&value) {
        let envelope: Envelope =
            serde_json::from_value(value).map_err(|e| ApiError::decode(url, e.to_string()))?;
        if envelope.code != SUCCESS_CODE {
            return Err(ApiError::server(
                url,
                envelope.code,
                envelope.message.unwrap_or_default(),
            ));
        }
        envelope.data
    } else {
        value
    };

    serde_json::from_value(payload).map_err(|e| ApiError::decode(url, e.to_string()))
}

fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.get("code").is_some_and(Value::is_i64) && map.contains_key("message"))
}

/// Extracts a `message` field from an error response body, if present.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
}
