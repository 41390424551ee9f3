//! Literature Assistant Core Library
//!
//! Client-side core for managing a personal literature library backed by a
//! remote HTTP service: listing, filtering, uploading, downloading and
//! inspecting documents, plus batch imports that report progress over a
//! server-push event stream.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - HTTP client for the literature service
//! - [`stream`] - Progress event streams: decoding, typed events, handler dispatch
//! - [`library`] - Cached list state and the batch import workflow
//! - [`settings`] - Persisted AI-provider credentials

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod library;
pub mod settings;
pub mod stream;
mod user_agent;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, ClientConfig, Literature, UploadFile};
pub use library::{
    FilterUpdate, ImportOptions, ImportOutcome, LibraryError, LibraryStore, ListCacheState,
};
pub use settings::{PersistOutcome, SettingsStore};
pub use stream::{EventChannel, HttpEventSource, ProgressDemux, StreamEvent};
