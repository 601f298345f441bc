//! Listener entries and per-event registries.
//!
//! Listeners are grouped by priority bucket: buckets run in descending
//! priority order, and within a bucket listeners run in registration order.
//! Identity and priority are fixed at registration; registering the same
//! callback name again adds another entry rather than replacing one.

use super::event::{BoxError, Event};
use parking_lot::Mutex;
use std::sync::Arc;

/// Priority assigned to listeners registered without an explicit one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Type-erased listener callback.
pub(crate) type ListenerFn = Box<dyn FnMut(&mut dyn Event) -> Result<(), BoxError> + Send>;

/// One registered listener. The callback sits behind its own lock so a
/// dispatch can run callbacks without holding the registry lock, which is
/// what allows a listener to dispatch a different event re-entrantly.
pub(crate) struct ListenerEntry {
    pub(crate) priority: i32,
    pub(crate) seq: usize,
    pub(crate) callback: Mutex<ListenerFn>,
}

/// All listeners registered under one event name, kept in dispatch order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Vec<Arc<ListenerEntry>>,
    next_seq: usize,
}

impl ListenerRegistry {
    /// Insert a listener, keeping entries sorted by descending priority.
    /// Equal priorities stay in registration order.
    pub(crate) fn insert(&mut self, priority: i32, callback: ListenerFn) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let entry = Arc::new(ListenerEntry {
            priority,
            seq,
            callback: Mutex::new(callback),
        });

        let position = self
            .entries
            .iter()
            .position(|existing| existing.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
    }

    /// Snapshot the entry list for a dispatch pass.
    pub(crate) fn snapshot(&self) -> Vec<Arc<ListenerEntry>> {
        self.entries.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
