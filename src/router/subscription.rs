//! Route subscriptions.
//!
//! # Responsibilities
//! - Describe what a UI collaborator registers: matcher, listener, group
//! - Hold the engine-owned `last_match` of each registered route
//!
//! # Design Decisions
//! - Listeners are an explicit two-variant type instead of inspecting a
//!   returned value: `Immediate` never suspends a pass, `Deferred` returns a
//!   completion signal the engine may wait on
//! - Listeners are shared `Fn`s, so a listener may start a new pass that
//!   notifies itself again; mutable listener state needs its own lock
//! - `last_match` is only touched by the registry and the dispatch scan

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::router::error::ListenerError;
use crate::router::lock;
use crate::router::rendezvous::RenderSignal;
use crate::routing::{MatchResult, RouteMatcher};

/// Stable identity of a registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type ImmediateFn = dyn Fn(Option<&MatchResult>) -> Result<(), ListenerError> + Send + Sync;
type DeferredFn = dyn Fn(Option<&MatchResult>) -> Result<RenderSignal, ListenerError> + Send + Sync;

/// Receives match changes for one route.
#[derive(Clone)]
pub enum Listener {
    /// Notified and forgotten.
    Immediate(Arc<ImmediateFn>),
    /// Notified, then returns a signal that settles once the UI caught up.
    Deferred(Arc<DeferredFn>),
}

impl Listener {
    pub fn immediate<F>(f: F) -> Self
    where
        F: Fn(Option<&MatchResult>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Listener::Immediate(Arc::new(f))
    }

    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(Option<&MatchResult>) -> Result<RenderSignal, ListenerError> + Send + Sync + 'static,
    {
        Listener::Deferred(Arc::new(f))
    }

    /// Deliver `matched`. Returns the completion signal of a deferred listener.
    pub(crate) fn notify(&self, matched: Option<&MatchResult>) -> Result<Option<RenderSignal>, ListenerError> {
        match self {
            Listener::Immediate(f) => f(matched).map(|()| None),
            Listener::Deferred(f) => f(matched).map(Some),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Listener::Immediate(_) => "immediate",
            Listener::Deferred(_) => "deferred",
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.kind()).finish()
    }
}

/// Membership of a mutually exclusive route group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    /// Group name; routes sharing it are mutually exclusive.
    pub id: String,
    /// Position inside the group; lower wins. `None` keeps registration order.
    pub index: Option<u32>,
}

impl RouteGroup {
    pub fn new(id: impl Into<String>, index: Option<u32>) -> Self {
        Self {
            id: id.into(),
            index,
        }
    }
}

/// What a collaborator hands to [`crate::RouterEngine::subscribe`].
pub struct SubscriptionDescriptor {
    pub matcher: Arc<dyn RouteMatcher>,
    pub listener: Listener,
    pub group: Option<RouteGroup>,
}

impl SubscriptionDescriptor {
    pub fn new(matcher: Arc<dyn RouteMatcher>, listener: Listener) -> Self {
        Self {
            matcher,
            listener,
            group: None,
        }
    }

    /// Place the route in group `id` at position `index`.
    pub fn in_group(mut self, id: impl Into<String>, index: Option<u32>) -> Self {
        self.group = Some(RouteGroup::new(id, index));
        self
    }
}

impl fmt::Debug for SubscriptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionDescriptor")
            .field("listener", &self.listener)
            .field("group", &self.group)
            .finish()
    }
}

/// A registered route.
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) matcher: Arc<dyn RouteMatcher>,
    pub(crate) listener: Listener,
    pub(crate) group: Option<RouteGroup>,
    pub(crate) last_match: Mutex<Option<MatchResult>>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        descriptor: SubscriptionDescriptor,
        initial: Option<MatchResult>,
    ) -> Self {
        Self {
            id,
            matcher: descriptor.matcher,
            listener: descriptor.listener,
            group: descriptor.group,
            last_match: Mutex::new(initial),
        }
    }

    pub(crate) fn group_id(&self) -> Option<&str> {
        self.group.as_ref().map(|g| g.id.as_str())
    }

    pub(crate) fn last_match(&self) -> Option<MatchResult> {
        lock(&self.last_match).clone()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("group", &self.group)
            .field("last_match", &self.last_match())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::rendezvous::RenderSignal;

    #[test]
    fn test_immediate_listener_returns_no_signal() {
        let listener = Listener::immediate(|_| Ok(()));
        assert!(listener.notify(None).unwrap().is_none());
    }

    #[test]
    fn test_deferred_listener_returns_signal() {
        let listener = Listener::deferred(|_| Ok(RenderSignal::settled()));
        assert!(listener.notify(None).unwrap().is_some());
        assert_eq!(format!("{:?}", listener), "Listener(\"deferred\")");
    }

    #[test]
    fn test_listener_errors_propagate() {
        let listener = Listener::immediate(|_| Err(ListenerError::new("nope")));
        assert_eq!(listener.notify(None).unwrap_err().to_string(), "nope");
    }
}
