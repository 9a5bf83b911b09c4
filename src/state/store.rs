//! Router state store.
//!
//! # Responsibilities
//! - Hold the typed router state (location, history, root, title suffix)
//! - Shallow-merge partial updates
//! - Fall back to the live environment location before the first write
//!
//! # Design Decisions
//! - State is an immutable snapshot swapped atomically (`ArcSwap`)
//! - Readers never block writers; every read sees a consistent snapshot
//! - The fallback is recomputed on every read, never cached

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

use crate::state::history::History;
use crate::state::location::{Location, LocationSource};

/// The router's shared state.
#[derive(Clone, Default)]
pub struct RouterState {
    /// Current location, with the root prefix already removed.
    pub location: Option<Location>,
    /// Navigation history handle.
    pub history: Option<Arc<dyn History>>,
    /// Root prefix the application is mounted under.
    pub root: Option<String>,
    /// Suffix appended to document titles.
    pub title_suffix: Option<String>,
}

impl RouterState {
    /// True when no field has ever been written.
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.history.is_none()
            && self.root.is_none()
            && self.title_suffix.is_none()
    }

    fn merge(&mut self, update: StateUpdate) {
        let StateUpdate {
            location,
            history,
            root,
            title_suffix,
        } = update;
        if location.is_some() {
            self.location = location;
        }
        if history.is_some() {
            self.history = history;
        }
        if root.is_some() {
            self.root = root;
        }
        if title_suffix.is_some() {
            self.title_suffix = title_suffix;
        }
    }
}

impl fmt::Debug for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterState")
            .field("location", &self.location)
            .field("history", &self.history.is_some())
            .field("root", &self.root)
            .field("title_suffix", &self.title_suffix)
            .finish()
    }
}

/// A partial state write. Fields left as `None` keep their previous value.
#[derive(Clone, Default)]
pub struct StateUpdate {
    pub location: Option<Location>,
    pub history: Option<Arc<dyn History>>,
    pub root: Option<String>,
    pub title_suffix: Option<String>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn title_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.title_suffix = Some(suffix.into());
        self
    }
}

impl fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateUpdate")
            .field("location", &self.location)
            .field("history", &self.history.is_some())
            .field("root", &self.root)
            .field("title_suffix", &self.title_suffix)
            .finish()
    }
}

/// Merge-on-write store for [`RouterState`].
pub struct StateStore {
    state: ArcSwap<RouterState>,
    environment: Arc<dyn LocationSource>,
}

impl StateStore {
    /// Create an empty store backed by `environment` for the default location.
    pub fn new(environment: Arc<dyn LocationSource>) -> Self {
        Self {
            state: ArcSwap::from_pointee(RouterState::default()),
            environment,
        }
    }

    /// The whole state, or the environment default if never written.
    pub fn get(&self) -> Arc<RouterState> {
        let current = self.state.load_full();
        if current.is_empty() {
            Arc::new(self.default_state())
        } else {
            current
        }
    }

    /// The current location.
    ///
    /// Falls back to the live environment location whenever the state holds
    /// no location yet.
    pub fn location(&self) -> Location {
        match &self.state.load().location {
            Some(location) => location.clone(),
            None => self.environment.current_location(),
        }
    }

    /// Pathname of [`Self::location`].
    pub fn pathname(&self) -> String {
        self.location().pathname
    }

    pub fn root(&self) -> Option<String> {
        self.state.load().root.clone()
    }

    pub fn title_suffix(&self) -> Option<String> {
        self.state.load().title_suffix.clone()
    }

    pub fn history(&self) -> Option<Arc<dyn History>> {
        self.state.load().history.clone()
    }

    /// Shallow-merge `update` into the state.
    pub fn merge(&self, update: StateUpdate) {
        self.state.rcu(|current| {
            let mut next = RouterState::clone(current);
            next.merge(update.clone());
            next
        });
    }

    fn default_state(&self) -> RouterState {
        RouterState {
            location: Some(self.environment.current_location()),
            ..Default::default()
        }
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state.load())
            .finish()
    }
}
