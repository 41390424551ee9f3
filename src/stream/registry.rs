//! Callback registry keyed by event kind.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::event::{EventKind, StreamEvent};

/// A registered event handler.
pub type Callback = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

/// Identity of one registration, used to remove it again.
///
/// Registering the same closure twice yields two distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Ordered handlers per event kind. Insertion order is invocation order.
#[derive(Default)]
pub struct CallbackRegistry {
    next_id: u64,
    entries: HashMap<EventKind, Vec<(CallbackId, Callback)>>,
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for `kind`.
    pub fn register(&mut self, kind: EventKind, callback: Callback) -> CallbackId {
        self.next_id += 1;
        let id = CallbackId(self.next_id);
        self.entries.entry(kind).or_default().push((id, callback));
        id
    }

    /// Removes the registration `id` from `kind`. Returns whether it existed.
    pub fn remove(&mut self, kind: &EventKind, id: CallbackId) -> bool {
        let Some(list) = self.entries.get_mut(kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(entry_id, _)| *entry_id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.entries.remove(kind);
        }
        removed
    }

    /// Drops every handler for every kind.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot of the handlers for `kind`, in registration order.
    ///
    /// Returned as owned clones so handlers can run without the registry locked.
    #[must_use]
    pub fn callbacks_for(&self, kind: &EventKind) -> Vec<Callback> {
        self.entries
            .get(kind)
            .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default()
    }

    /// Number of handlers registered for `kind`.
    #[must_use]
    pub fn count(&self, kind: &EventKind) -> usize {
        self.entries.get(kind).map_or(0, Vec::len)
    }

    /// Total number of handlers across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .entries
            .iter()
            .map(|(kind, list)| (kind.as_str(), list.len()))
            .collect();
        f.debug_struct("CallbackRegistry")
            .field("handlers", &counts)
            .finish()
    }
}
