//! Event stream channel: one server-push connection plus its handler registry.
//!
//! # Lifecycle
//!
//! - [`EventChannel::connect`] closes any live connection, then spawns a
//!   reader task for the new URL. Handlers registered before the call stay
//!   registered, so a caller can register everything first and connect last.
//! - [`EventChannel::disconnect`] closes the connection and clears **all**
//!   handlers. It is idempotent.
//! - A transport error or end of stream closes the connection and clears all
//!   handlers, exactly like `disconnect`. There is no automatic reconnect.
//!
//! Each message is parsed into a [`StreamEvent`]; malformed messages are
//! logged and dropped. Handlers for the event's kind run synchronously on the
//! reader task, in registration order.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::event::{EventKind, StreamEvent};
use super::registry::{Callback, CallbackId, CallbackRegistry};
use super::source::EventSource;
use super::sse::{SseFrame, parse_sse_stream};

/// Connection readiness, mirroring the browser `EventSource` states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

impl ReadyState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            _ => Self::Closed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Connecting => 0,
            Self::Open => 1,
            Self::Closed => 2,
        }
    }
}

/// Observer for one connection made by [`EventChannel::connect`].
#[derive(Debug, Clone)]
pub struct StreamHandle {
    url: Arc<str>,
    state: Arc<AtomicU8>,
}

impl StreamHandle {
    fn new(url: &str) -> Self {
        Self {
            url: Arc::from(url),
            state: Arc::new(AtomicU8::new(ReadyState::Connecting.as_u8())),
        }
    }

    /// The endpoint this connection was opened against.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn mark_open(&self) -> bool {
        self.state
            .compare_exchange(
                ReadyState::Connecting.as_u8(),
                ReadyState::Open.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    fn mark_closed(&self) {
        self.state
            .store(ReadyState::Closed.as_u8(), Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Shared {
    registry: Mutex<CallbackRegistry>,
    /// Bumped on every close; a reader task only acts while its generation is current.
    generation: AtomicU64,
}

impl Shared {
    fn registry(&self) -> MutexGuard<'_, CallbackRegistry> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

struct Connection {
    handle: StreamHandle,
    task: JoinHandle<()>,
}

/// A single server-push connection with a registry of named handlers.
///
/// At most one connection is live per channel. Channels are cheap; the import
/// workflow creates one per job so handlers of different jobs never mix.
pub struct EventChannel {
    source: Arc<dyn EventSource>,
    shared: Arc<Shared>,
    connection: Option<Connection>,
}

impl EventChannel {
    /// Creates a disconnected channel that opens connections through `source`.
    #[must_use]
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            shared: Arc::new(Shared::default()),
            connection: None,
        }
    }

    /// Opens a connection to `url`, closing any existing one first.
    ///
    /// Handlers survive a reconnect: calling `connect` again keeps every
    /// registration. Call [`Self::disconnect`] first to start from none.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&mut self, url: &str) -> StreamHandle {
        self.close_connection();

        let generation = self.shared.generation.load(Ordering::SeqCst);
        let handle = StreamHandle::new(url);
        let task = tokio::spawn(read_stream(
            Arc::clone(&self.source),
            handle.clone(),
            Arc::clone(&self.shared),
            generation,
        ));
        info!(url, "connecting progress stream");

        self.connection = Some(Connection {
            handle: handle.clone(),
            task,
        });
        handle
    }

    /// Closes the connection (if any) and clears every registered handler.
    pub fn disconnect(&mut self) {
        self.close_connection();
        self.shared.registry().clear();
    }

    /// True iff a connection exists and it is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.connection
            .as_ref()
            .map_or(ReadyState::Closed, |c| c.handle.ready_state())
    }

    /// Number of handlers currently registered across all kinds.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.shared.registry().len()
    }

    pub(crate) fn on(&self, kind: EventKind, callback: Callback) -> CallbackId {
        self.shared.registry().register(kind, callback)
    }

    pub(crate) fn off(&self, kind: &EventKind, id: CallbackId) -> bool {
        self.shared.registry().remove(kind, id)
    }

    fn close_connection(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(connection) = self.connection.take() {
            connection.task.abort();
            connection.handle.mark_closed();
            debug!(url = connection.handle.url(), "progress stream closed");
        }
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.task.abort();
            connection.handle.mark_closed();
        }
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("url", &self.connection.as_ref().map(|c| c.handle.url()))
            .field("ready_state", &self.ready_state())
            .field("handlers", &self.handler_count())
            .finish()
    }
}

async fn read_stream(
    source: Arc<dyn EventSource>,
    handle: StreamHandle,
    shared: Arc<Shared>,
    generation: u64,
) {
    let body = match source.open(handle.url()).await {
        Ok(body) => body,
        Err(error) => {
            warn!(url = handle.url(), %error, "progress stream connection failed");
            close_after_failure(&shared, &handle, generation);
            return;
        }
    };

    if !handle.mark_open() || !shared.is_current(generation) {
        return;
    }
    debug!(url = handle.url(), "progress stream open");

    let mut frames = parse_sse_stream(body);
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(frame) => {
                if !shared.is_current(generation) {
                    return;
                }
                dispatch(&shared, &frame);
            }
            Err(error) => {
                warn!(url = handle.url(), %error, "progress stream transport error");
                close_after_failure(&shared, &handle, generation);
                return;
            }
        }
    }

    debug!(url = handle.url(), "progress stream ended by server");
    close_after_failure(&shared, &handle, generation);
}

/// Same effect as `disconnect`, unless the channel has already moved on.
fn close_after_failure(shared: &Shared, handle: &StreamHandle, generation: u64) {
    handle.mark_closed();
    if shared.is_current(generation) {
        shared.registry().clear();
    }
}

fn dispatch(shared: &Shared, frame: &SseFrame) {
    let event = match StreamEvent::parse(&frame.data, frame.event.as_deref()) {
        Ok(event) => event,
        Err(error) => {
            warn!(%error, data = %frame.data, "dropping malformed stream message");
            return;
        }
    };

    let kind = event.kind();
    let callbacks = shared.registry().callbacks_for(&kind);
    debug!(%kind, handlers = callbacks.len(), "dispatching stream event");
    for callback in callbacks {
        callback(&event);
    }
}
