//! Navigation history abstraction.
//!
//! # Responsibilities
//! - Define the history seam the router state carries
//! - Provide an in-memory history for tests and non-browser hosts
//!
//! # Design Decisions
//! - Browser and hash backends live outside this crate
//! - Listeners are invoked after the internal lock is released

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::state::location::{Location, LocationSource};

/// How the current entry was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryAction {
    Push,
    Replace,
    Pop,
}

/// Callback invoked on every location change.
pub type HistoryListener = Arc<dyn Fn(&Location, HistoryAction) + Send + Sync>;

/// Handle returned by [`History::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A navigation history backend.
pub trait History: LocationSource + fmt::Debug {
    /// The action that produced the current entry.
    fn action(&self) -> HistoryAction;

    /// Navigate to `path`, adding an entry.
    fn push(&self, path: &str);

    /// Navigate to `path`, replacing the current entry.
    fn replace(&self, path: &str);

    /// Move `delta` entries through the stack (negative goes back).
    fn go(&self, delta: isize);

    /// Register a change listener.
    fn listen(&self, listener: HistoryListener) -> ListenerId;

    /// Remove a change listener. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);
}

struct MemoryInner {
    entries: Vec<Location>,
    index: usize,
    action: HistoryAction,
    listeners: Vec<(ListenerId, HistoryListener)>,
}

/// An in-memory history stack.
pub struct MemoryHistory {
    inner: Mutex<MemoryInner>,
    next_listener: AtomicU64,
}

impl MemoryHistory {
    /// Create a history whose only entry is `initial`.
    pub fn new(initial: &str) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                entries: vec![Location::parse(initial)],
                index: 0,
                action: HistoryAction::Pop,
                listeners: Vec::new(),
            }),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Number of entries on the stack.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Record the scroll offset of the current entry, restored on `Pop`.
    pub fn save_scroll_position(&self, x: f64, y: f64) {
        let mut inner = self.lock();
        let index = inner.index;
        inner.entries[index].scroll_position = Some((x, y));
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let (location, action, listeners) = {
            let inner = self.lock();
            let listeners: Vec<HistoryListener> =
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (inner.entries[inner.index].clone(), inner.action, listeners)
        };
        tracing::debug!(pathname = %location.pathname, action = ?action, "History changed");
        for listener in listeners {
            listener(&location, action);
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryHistory")
            .field("entries", &inner.entries.len())
            .field("index", &inner.index)
            .field("action", &inner.action)
            .finish()
    }
}

impl LocationSource for MemoryHistory {
    fn current_location(&self) -> Location {
        let inner = self.lock();
        inner.entries[inner.index].clone()
    }
}

impl History for MemoryHistory {
    fn action(&self) -> HistoryAction {
        self.lock().action
    }

    fn push(&self, path: &str) {
        {
            let mut inner = self.lock();
            let next = inner.index + 1;
            inner.entries.truncate(next);
            inner.entries.push(Location::parse(path));
            inner.index = next;
            inner.action = HistoryAction::Push;
        }
        self.notify();
    }

    fn replace(&self, path: &str) {
        {
            let mut inner = self.lock();
            let index = inner.index;
            inner.entries[index] = Location::parse(path);
            inner.action = HistoryAction::Replace;
        }
        self.notify();
    }

    fn go(&self, delta: isize) {
        {
            let mut inner = self.lock();
            let last = inner.entries.len() as isize - 1;
            let target = (inner.index as isize + delta).clamp(0, last) as usize;
            if target == inner.index {
                return;
            }
            inner.index = target;
            inner.action = HistoryAction::Pop;
        }
        self.notify();
    }

    fn listen(&self, listener: HistoryListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.lock().listeners.push((id, listener));
        id
    }

    fn unlisten(&self, id: ListenerId) {
        self.lock().listeners.retain(|(existing, _)| *existing != id);
    }
}
