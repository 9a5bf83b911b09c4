//! The active router: state, registry and dispatch behind one handle.
//!
//! # Responsibilities
//! - Own the state store and the subscription registry
//! - Run a dispatch pass after every state write
//! - Register and unregister route subscriptions
//! - Expose the readiness signal
//!
//! # Design Decisions
//! - Explicit context object: construct one engine per application root and
//!   pass clones of the handle to collaborators
//! - `set` never waits for listeners: the scan and every notification up to
//!   the first group activation run inline, the rest is spawned on the
//!   current Tokio runtime
//! - No reentrancy guard: a listener calling `set` starts a new pass at once

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;

use crate::config::MatchingConfig;
use crate::lifecycle::ReadySignal;
use crate::router::dispatch::{self, Delivery};
use crate::router::error::{DispatchError, DispatchResult, RouterError};
use crate::router::registry::Registry;
use crate::router::subscription::{Subscription, SubscriptionDescriptor, SubscriptionId};
use crate::routing::MatchResult;
use crate::state::{History, Location, LocationSource, RouterState, StateStore, StateUpdate};

struct EngineInner {
    store: StateStore,
    registry: Registry,
    ready: ReadySignal,
    matching: MatchingConfig,
}

/// Handle to the routing engine. Cheap to clone; all clones share one engine.
#[derive(Clone)]
pub struct RouterEngine {
    inner: Arc<EngineInner>,
}

impl RouterEngine {
    /// Create an engine with default matching settings.
    pub fn new(environment: Arc<dyn LocationSource>) -> Self {
        Self::with_config(environment, MatchingConfig::default())
    }

    /// Create an engine with explicit matching settings.
    pub fn with_config(environment: Arc<dyn LocationSource>, matching: MatchingConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store: StateStore::new(environment),
                registry: Registry::new(matching.group_insertion),
                ready: ReadySignal::new(),
                matching,
            }),
        }
    }

    /// Matching settings this engine was built with.
    pub fn matching(&self) -> &MatchingConfig {
        &self.inner.matching
    }

    // --- State ---

    /// The whole state, or the live-environment default if never written.
    pub fn state(&self) -> Arc<RouterState> {
        self.inner.store.get()
    }

    pub fn location(&self) -> Location {
        self.inner.store.location()
    }

    pub fn root(&self) -> Option<String> {
        self.inner.store.root()
    }

    pub fn title_suffix(&self) -> Option<String> {
        self.inner.store.title_suffix()
    }

    pub fn history(&self) -> Option<Arc<dyn History>> {
        self.inner.store.history()
    }

    /// Merge `update` into the state and start a dispatch pass.
    ///
    /// Returns once the pass has either finished or reached its first group
    /// activation. The returned handle reports the outcome of the whole pass;
    /// dropping it does not cancel anything.
    pub fn set(&self, update: StateUpdate) -> DispatchHandle {
        tracing::debug!(update = ?update, "Router state update");
        self.inner.store.merge(update);

        let mut delivery = self.scan();
        match delivery.advance() {
            Ok(None) => DispatchHandle::completed(Ok(())),
            Err(e) => {
                tracing::warn!(error = %e, "Dispatch pass failed");
                DispatchHandle::completed(Err(e))
            }
            Ok(Some((id, signal))) => {
                let rest = async move {
                    let result = match signal.wait().await {
                        Ok(()) => delivery.deliver().await,
                        Err(_) => Err(DispatchError::Abandoned(id)),
                    };
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, "Dispatch pass failed");
                    }
                    result
                };
                match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => DispatchHandle::spawned(runtime.spawn(rest)),
                    Err(_) => {
                        tracing::warn!(
                            subscription = %id,
                            "No Tokio runtime; remaining notifications run when the handle is awaited"
                        );
                        DispatchHandle::pending(Box::pin(rest))
                    }
                }
            }
        }
    }

    /// Run a full dispatch pass against the current state.
    pub async fn dispatch(&self) -> DispatchResult {
        self.scan().deliver().await
    }

    fn scan(&self) -> Delivery {
        let pathname = self.inner.store.pathname();
        dispatch::scan(&self.inner.registry.snapshot(), &pathname)
    }

    // --- Subscriptions ---

    /// Register a route.
    ///
    /// The listener is notified once, synchronously, with the match for the
    /// current pathname before the route joins the registry. If that
    /// notification fails the route is not registered.
    pub fn subscribe(&self, descriptor: SubscriptionDescriptor) -> Result<Unsubscribe, RouterError> {
        let id = self.inner.registry.next_id();
        let pathname = self.inner.store.pathname();
        let initial = descriptor.matcher.match_pathname(&pathname);

        // A deferred listener's signal is not waited on at registration.
        let _ = descriptor.listener.notify(initial.as_ref())?;

        tracing::debug!(
            subscription = %id,
            group = ?descriptor.group,
            pathname = %pathname,
            matched = initial.is_some(),
            "Route subscribed"
        );
        self.inner
            .registry
            .insert(Arc::new(Subscription::new(id, descriptor, initial)));

        Ok(Unsubscribe {
            engine: Arc::downgrade(&self.inner),
            id,
            active: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Number of registered routes.
    pub fn subscription_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Registered routes in dispatch order.
    pub fn subscription_order(&self) -> Vec<SubscriptionId> {
        self.inner.registry.ids()
    }

    /// The match a route was last notified with.
    pub fn last_match(&self, id: SubscriptionId) -> Option<MatchResult> {
        self.inner
            .registry
            .snapshot()
            .into_iter()
            .find(|s| s.id == id)
            .and_then(|s| s.last_match())
    }

    // --- Readiness ---

    /// Fire the one-time readiness event. Returns false if it already fired.
    pub fn mark_ready(&self, location: Location) -> bool {
        self.inner.ready.fire(location)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.is_ready()
    }

    /// Wait for the readiness event and return the initial location.
    pub async fn wait_ready(&self) -> Location {
        self.inner.ready.wait().await
    }
}

impl std::fmt::Debug for RouterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterEngine")
            .field("state", &self.inner.store)
            .field("subscriptions", &self.inner.registry.len())
            .field("ready", &self.inner.ready.is_ready())
            .finish()
    }
}

/// Removes a subscription. Clones share the same "still subscribed" flag.
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    engine: Weak<EngineInner>,
    id: SubscriptionId,
    active: Arc<AtomicBool>,
}

impl Unsubscribe {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Remove the subscription. Only the first call has an effect.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(engine) = self.engine.upgrade() {
            engine.registry.remove(self.id);
            tracing::debug!(subscription = %self.id, "Route unsubscribed");
        }
    }
}

type PendingPass = Pin<Box<dyn Future<Output = DispatchResult> + Send>>;

enum HandleState {
    Finished(DispatchResult),
    Spawned(JoinHandle<DispatchResult>),
    Pending(PendingPass),
}

/// Outcome of the dispatch pass started by [`RouterEngine::set`].
pub struct DispatchHandle {
    state: HandleState,
}

impl DispatchHandle {
    fn completed(result: DispatchResult) -> Self {
        Self {
            state: HandleState::Finished(result),
        }
    }

    fn spawned(handle: JoinHandle<DispatchResult>) -> Self {
        Self {
            state: HandleState::Spawned(handle),
        }
    }

    fn pending(pass: PendingPass) -> Self {
        Self {
            state: HandleState::Pending(pass),
        }
    }

    /// True when every notification of the pass has already been delivered.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Finished(_) => true,
            HandleState::Spawned(handle) => handle.is_finished(),
            HandleState::Pending(_) => false,
        }
    }

    /// Wait for the pass to complete and return its outcome.
    pub async fn finished(self) -> DispatchResult {
        match self.state {
            HandleState::Finished(result) => result,
            HandleState::Spawned(handle) => handle.await?,
            HandleState::Pending(pass) => pass.await,
        }
    }
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            HandleState::Finished(Ok(())) => "finished",
            HandleState::Finished(Err(_)) => "failed",
            HandleState::Spawned(_) => "spawned",
            HandleState::Pending(_) => "pending",
        };
        f.debug_struct("DispatchHandle").field("state", &state).finish()
    }
}
