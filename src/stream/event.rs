//! Typed progress-stream events.
//!
//! The service pushes `{type, payload}` records. [`StreamEvent`] is the closed
//! set of kinds the client understands, each with its own payload struct, plus
//! [`StreamEvent::Unknown`] so new server-side kinds pass through untouched.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Routing key for stream events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Progress,
    FileComplete,
    FileError,
    Complete,
    Error,
    /// Any kind outside the known vocabulary, keyed by its wire name.
    Other(String),
}

impl EventKind {
    /// Maps a wire `type` to its kind.
    ///
    /// `progress_update` is an alias the service uses for counter updates.
    #[must_use]
    pub fn from_wire(name: &str) -> Self {
        match name {
            "progress" | "progress_update" => Self::Progress,
            "file_complete" => Self::FileComplete,
            "file_error" => Self::FileError,
            "complete" => Self::Complete,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    /// Canonical wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Progress => "progress",
            Self::FileComplete => "file_complete",
            Self::FileError => "file_error",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `progress` payload: `{current, total}` counters or a status message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressPayload {
    pub current: Option<u64>,
    pub total: Option<u64>,
    pub message: Option<String>,
}

impl ProgressPayload {
    /// Whether the payload carries a counter rather than only a status message.
    #[must_use]
    pub fn has_counts(&self) -> bool {
        self.current.is_some() || self.total.is_some()
    }
}

/// `file_complete` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileCompletePayload {
    pub file_name: Option<String>,
    pub success: Option<bool>,
    pub literature_id: Option<i64>,
    pub message: Option<String>,
}

/// `file_error` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileErrorPayload {
    pub file_name: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl FileErrorPayload {
    /// Best available description of the failure.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("unknown error")
    }
}

/// `complete` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletePayload {
    pub message: Option<String>,
}

/// `error` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorPayload {
    /// Best available description of the failure.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or("batch import failed")
    }
}

/// Payloads that may arrive as a bare string instead of an object.
trait MessagePayload: DeserializeOwned + Default {
    fn from_message(message: String) -> Self;
}

impl MessagePayload for ProgressPayload {
    fn from_message(message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::default()
        }
    }
}

impl MessagePayload for FileCompletePayload {
    fn from_message(message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::default()
        }
    }
}

impl MessagePayload for FileErrorPayload {
    fn from_message(message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::default()
        }
    }
}

impl MessagePayload for CompletePayload {
    fn from_message(message: String) -> Self {
        Self {
            message: Some(message),
        }
    }
}

impl MessagePayload for ErrorPayload {
    fn from_message(message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::default()
        }
    }
}

fn decode_payload<T: MessagePayload>(payload: Value) -> Result<T, serde_json::Error> {
    match payload {
        Value::Null => Ok(T::default()),
        Value::String(message) => Ok(T::from_message(message)),
        other => serde_json::from_value(other),
    }
}

/// One event received on a progress stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Progress(ProgressPayload),
    FileComplete(FileCompletePayload),
    FileError(FileErrorPayload),
    Complete(CompletePayload),
    Error(ErrorPayload),
    /// A kind this client does not know; the payload is kept as raw JSON.
    Unknown { kind: String, payload: Value },
}

/// Reasons a stream message could not be turned into a [`StreamEvent`].
#[derive(Debug, Error)]
pub enum EventParseError {
    /// The message data is not JSON and the frame carries no event name.
    #[error("message is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The message is JSON but has no string `type` field.
    #[error("message has no `type` field")]
    MissingType,

    /// The payload does not fit the shape of its declared kind.
    #[error("invalid `{kind}` payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StreamEvent {
    /// The routing key for this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Progress(_) => EventKind::Progress,
            Self::FileComplete(_) => EventKind::FileComplete,
            Self::FileError(_) => EventKind::FileError,
            Self::Complete(_) => EventKind::Complete,
            Self::Error(_) => EventKind::Error,
            Self::Unknown { kind, .. } => EventKind::Other(kind.clone()),
        }
    }

    /// True for `complete` and `error`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Error(_))
    }

    /// Builds an event from a wire type name and its raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError::Payload`] when a known kind's payload has the wrong shape.
    pub fn from_parts(kind: &str, payload: Value) -> Result<Self, EventParseError> {
        let wrap = |source| EventParseError::Payload {
            kind: kind.to_string(),
            source,
        };
        let event = match EventKind::from_wire(kind) {
            EventKind::Progress => Self::Progress(decode_payload(payload).map_err(wrap)?),
            EventKind::FileComplete => Self::FileComplete(decode_payload(payload).map_err(wrap)?),
            EventKind::FileError => Self::FileError(decode_payload(payload).map_err(wrap)?),
            EventKind::Complete => Self::Complete(decode_payload(payload).map_err(wrap)?),
            EventKind::Error => Self::Error(decode_payload(payload).map_err(wrap)?),
            EventKind::Other(kind) => Self::Unknown { kind, payload },
        };
        Ok(event)
    }

    /// Parses the data of one stream message.
    ///
    /// The data is normally a JSON `{type, payload}` record. When it is not,
    /// and the frame carried a named event (`event: complete`), the name is
    /// used as the type and the data (JSON if it parses, else the raw text)
    /// as the payload.
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError`] when neither form applies.
    pub fn parse(data: &str, event_name: Option<&str>) -> Result<Self, EventParseError> {
        let parsed = serde_json::from_str::<Value>(data);

        if let Ok(Value::Object(map)) = &parsed {
            if let Some(kind) = map.get("type").and_then(Value::as_str) {
                let payload = map.get("payload").cloned().unwrap_or(Value::Null);
                return Self::from_parts(kind, payload);
            }
        }

        match event_name.filter(|name| !name.is_empty() && *name != "message") {
            Some(name) => {
                let payload = parsed.unwrap_or_else(|_| Value::String(data.to_string()));
                Self::from_parts(name, payload)
            }
            None => match parsed {
                Ok(_) => Err(EventParseError::MissingType),
                Err(e) => Err(EventParseError::InvalidJson(e)),
            },
        }
    }
}
