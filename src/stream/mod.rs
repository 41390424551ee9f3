//! Server-push progress streams.
//!
//! The service reports batch import progress over `text/event-stream`. This
//! module turns that byte stream into typed events and fans them out to
//! registered handlers:
//!
//! - [`sse`] decodes raw chunks into frames
//! - [`event`] parses frame data into [`StreamEvent`]s
//! - [`EventChannel`] owns one connection and its handler registry
//! - [`ProgressDemux`] offers typed subscriptions per event kind
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use literature_core::api::ClientConfig;
//! use literature_core::stream::{EventChannel, HttpEventSource, ProgressDemux};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpEventSource::new(&ClientConfig::default())?;
//! let mut channel = EventChannel::new(Arc::new(source));
//! let demux = ProgressDemux::new(&channel);
//! demux.on_progress_update(|p| println!("{:?}/{:?}", p.current, p.total));
//! demux.on_complete(|_| println!("done"));
//! channel.connect("http://localhost:8081/literature/batch-import/progress/job-1");
//! # Ok(())
//! # }
//! ```

mod channel;
mod demux;
mod error;
pub mod event;
mod registry;
mod source;
pub mod sse;

pub use channel::{EventChannel, ReadyState, StreamHandle};
pub use demux::ProgressDemux;
pub use error::StreamError;
pub use event::{
    CompletePayload, ErrorPayload, EventKind, EventParseError, FileCompletePayload,
    FileErrorPayload, ProgressPayload, StreamEvent,
};
pub use registry::{Callback, CallbackId, CallbackRegistry};
pub use source::{ByteStream, EventSource, HttpEventSource};
