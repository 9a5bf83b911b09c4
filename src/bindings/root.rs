//! Root binding: connects a history backend to the engine.
//!
//! # Responsibilities
//! - Strip the mount prefix from history locations
//! - Seed the engine state (location, root, title suffix, history)
//! - Subscribe the always-matching root route
//! - Forward history changes to the engine
//! - Fire the readiness signal
//!
//! # Data Flow
//! ```text
//! history.listen ── location ──→ strip_root ──→ engine.set({location})
//!                                              └─→ in-flight passes (flush)
//! initialize ──→ engine.set({location, root, title_suffix, history})
//!            ──→ subscribe(root matcher) ──→ mark_ready ──→ dispatch
//! Drop ──→ unlisten + unsubscribe
//! ```

use std::sync::{Arc, Mutex};

use crate::config::RouterSection;
use crate::router::{
    lock, DispatchHandle, DispatchResult, Listener, RouterEngine, RouterError,
    SubscriptionDescriptor, Unsubscribe,
};
use crate::routing::{MatchResult, Params, RouteMatcher};
use crate::state::{History, HistoryAction, ListenerId, Location, StateUpdate};

/// Remove the mount prefix `root` from `location`.
///
/// Only strips on a segment boundary: with root `/app`, `/app/x` becomes `/x`
/// and `/app` becomes `/`, while `/application` is left alone.
pub fn strip_root(root: &str, mut location: Location) -> Location {
    let base = root.trim_end_matches('/');
    if base.is_empty() {
        return location;
    }
    if location.pathname == base {
        location.pathname = "/".to_string();
    } else if let Some(rest) = location.pathname.strip_prefix(base) {
        if rest.starts_with('/') {
            location.pathname = rest.to_string();
        }
    }
    location
}

/// Matches every pathname; exact only at the root itself.
#[derive(Debug, Clone)]
struct RootMatcher {
    root: String,
}

impl RouteMatcher for RootMatcher {
    fn match_pathname(&self, pathname: &str) -> Option<MatchResult> {
        Some(MatchResult {
            path: self.root.clone(),
            url: self.root.clone(),
            is_exact: pathname == "/",
            params: Params::new(),
        })
    }
}

/// The application's root router. Tears itself down on drop.
pub struct RootRouter {
    engine: RouterEngine,
    root: String,
    history: Arc<dyn History>,
    history_listener: ListenerId,
    subscription: Unsubscribe,
    matched: Arc<Mutex<Option<MatchResult>>>,
    in_flight: Arc<Mutex<Vec<DispatchHandle>>>,
}

impl RootRouter {
    /// Bind `history` to `engine` and run the first dispatch pass.
    pub async fn initialize(
        engine: &RouterEngine,
        section: &RouterSection,
        history: Arc<dyn History>,
    ) -> Result<Self, RouterError> {
        let root = section.root.clone();
        let location = strip_root(&root, history.current_location());
        tracing::info!(
            root = %root,
            pathname = %location.pathname,
            history = ?section.history_type,
            "Root router initializing"
        );

        engine
            .set(
                StateUpdate::new()
                    .location(location.clone())
                    .title_suffix(section.title_suffix.clone())
                    .root(root.clone())
                    .history(history.clone()),
            )
            .finished()
            .await?;

        let matched = Arc::new(Mutex::new(None));
        let sink = matched.clone();
        let subscription = engine.subscribe(SubscriptionDescriptor::new(
            Arc::new(RootMatcher { root: root.clone() }),
            Listener::immediate(move |m| {
                *lock(&sink) = m.cloned();
                Ok(())
            }),
        ))?;

        let in_flight: Arc<Mutex<Vec<DispatchHandle>>> = Arc::new(Mutex::new(Vec::new()));
        let passes = in_flight.clone();
        let forward = engine.clone();
        let prefix = root.clone();
        let history_listener = history.listen(Arc::new(move |location: &Location, action: HistoryAction| {
            let location = strip_root(&prefix, location.clone());
            tracing::trace!(pathname = %location.pathname, action = ?action, "Forwarding history change");
            let handle = forward.set(StateUpdate::new().location(location));
            if !handle.is_finished() {
                let mut passes = lock(&passes);
                passes.retain(|pass| !pass.is_finished());
                passes.push(handle);
            }
        }));

        let router = Self {
            engine: engine.clone(),
            root,
            history,
            history_listener,
            subscription,
            matched,
            in_flight,
        };

        engine.mark_ready(location);
        engine.dispatch().await?;
        Ok(router)
    }

    pub fn engine(&self) -> &RouterEngine {
        &self.engine
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }

    /// The root route's current match.
    pub fn root_match(&self) -> Option<MatchResult> {
        lock(&self.matched).clone()
    }

    /// Wait for every dispatch pass started by a history change to finish.
    ///
    /// Reports the first failure; later passes are still awaited.
    pub async fn flush(&self) -> DispatchResult {
        let passes: Vec<DispatchHandle> = lock(&self.in_flight).drain(..).collect();
        let mut outcome = Ok(());
        for pass in passes {
            if let Err(e) = pass.finished().await {
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }
        outcome
    }

    /// Push a new title suffix into the router state.
    pub fn set_title_suffix(&self, suffix: impl Into<String>) -> DispatchHandle {
        self.engine.set(StateUpdate::new().title_suffix(suffix))
    }
}

impl Drop for RootRouter {
    fn drop(&mut self) {
        self.history.unlisten(self.history_listener);
        self.subscription.unsubscribe();
        tracing::debug!(root = %self.root, "Root router torn down");
    }
}

impl std::fmt::Debug for RootRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootRouter")
            .field("root", &self.root)
            .field("subscription", &self.subscription.id())
            .finish()
    }
}
