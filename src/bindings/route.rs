//! Route binding: a declared route plus its headless view state.
//!
//! # Responsibilities
//! - Compute a route's match (always strict)
//! - Register the route with the engine as a deferred listener
//! - Track the match, group activation and pending render of a mounted route
//! - Report where to scroll once a grouped route becomes active
//!
//! # Design Decisions
//! - The host renders; this module only records what it must render and
//!   settles the render signal when told the render happened
//! - A mounted route unsubscribes when dropped

use std::sync::{Arc, Mutex};

use crate::config::RouteConfig;
use crate::router::{
    lock, rendezvous, Listener, RenderDone, RouteGroup, RouterEngine, RouterError,
    SubscriptionDescriptor, SubscriptionId, Unsubscribe,
};
use crate::routing::{match_path, MatchOptions, MatchResult, PathSpec, PatternError};
use crate::state::{History, HistoryAction};

/// A route as declared by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDeclaration {
    pub url: PathSpec,
    pub exact: bool,
    pub sensitive: bool,
    pub group: Option<RouteGroup>,
    /// Scroll to this vertical offset when the route becomes active in its
    /// group. `None` disables scrolling.
    pub scroll_top_offset: Option<f64>,
}

impl RouteDeclaration {
    pub fn new(url: impl Into<PathSpec>) -> Self {
        Self {
            url: url.into(),
            exact: false,
            sensitive: false,
            group: None,
            scroll_top_offset: None,
        }
    }

    /// Build from a configured route.
    pub fn from_config(route: &RouteConfig, sensitive: bool) -> Self {
        let mut declaration = Self::new(route.url.clone())
            .exact(route.exact)
            .sensitive(sensitive);
        if let Some(group) = &route.group {
            declaration = declaration.group(group.clone(), route.group_index);
        }
        declaration
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    pub fn group(mut self, id: impl Into<String>, index: Option<u32>) -> Self {
        self.group = Some(RouteGroup::new(id, index));
        self
    }

    pub fn scroll_top_offset(mut self, offset: f64) -> Self {
        self.scroll_top_offset = Some(offset);
        self
    }

    fn options(&self) -> MatchOptions {
        MatchOptions::new(self.url.clone())
            .exact(self.exact)
            .strict(true)
            .sensitive(self.sensitive)
    }

    /// Match `pathname` against this route.
    pub fn compute_match(&self, pathname: &str) -> Result<Option<MatchResult>, PatternError> {
        let matched = match_path(pathname, &self.options())?;
        tracing::trace!(url = ?self.url, pathname, matched = matched.is_some(), "Route match computed");
        Ok(matched)
    }

    /// Compile the route into a subscription for `listener`.
    pub fn descriptor(&self, listener: Listener) -> Result<SubscriptionDescriptor, PatternError> {
        let matcher = self.options().compile()?;
        let mut descriptor = SubscriptionDescriptor::new(Arc::new(matcher), listener);
        descriptor.group = self.group.clone();
        Ok(descriptor)
    }

    /// Register the route with `engine` and return its view.
    pub fn mount(&self, engine: &RouterEngine) -> Result<MountedRoute, RouterError> {
        let view = RouteView::new(self.group.is_some());
        let unsubscribe = engine.subscribe(self.descriptor(view.listener())?)?;
        Ok(MountedRoute {
            engine: engine.clone(),
            view,
            unsubscribe,
            scroll_top_offset: self.scroll_top_offset,
        })
    }
}

/// Where the host should scroll the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTarget {
    pub x: f64,
    pub y: f64,
}

impl ScrollTarget {
    /// Restore a popped entry's saved position, else scroll to `offset`.
    pub fn resolve(offset: Option<f64>, history: Option<&dyn History>) -> Option<Self> {
        let offset = offset?;
        let history = history?;
        if history.action() == HistoryAction::Pop {
            if let Some((x, y)) = history.current_location().scroll_position {
                return Some(Self { x, y });
            }
        }
        Some(Self { x: 0.0, y: offset })
    }
}

#[derive(Default)]
struct ViewState {
    matched: Option<MatchResult>,
    active_in_group: bool,
    pending: Option<RenderDone>,
    scroll_on_next_render: bool,
}

/// Headless view state of one mounted route.
#[derive(Clone)]
pub struct RouteView {
    state: Arc<Mutex<ViewState>>,
    grouped: bool,
}

impl RouteView {
    pub fn new(grouped: bool) -> Self {
        Self {
            state: Arc::default(),
            grouped,
        }
    }

    /// A deferred listener feeding this view.
    ///
    /// Each notification stores the match and hands the engine a signal that
    /// settles on the next [`RouteView::did_render`].
    pub fn listener(&self) -> Listener {
        let state = self.state.clone();
        Listener::deferred(move |matched| {
            let (done, signal) = rendezvous();
            let mut state = lock(&state);
            state.matched = matched.cloned();
            if let Some(previous) = state.pending.replace(done) {
                previous.settle();
            }
            Ok(signal)
        })
    }

    pub fn matched(&self) -> Option<MatchResult> {
        lock(&self.state).matched.clone()
    }

    pub fn is_active_in_group(&self) -> bool {
        lock(&self.state).active_in_group
    }

    /// Whether the host should display the route.
    pub fn is_visible(&self) -> bool {
        let state = lock(&self.state);
        state.matched.is_some() && (!self.grouped || state.active_in_group)
    }

    /// Tell the view the host finished rendering.
    ///
    /// Settles a pending render signal and updates the group activation. A
    /// route that became active asks for a scroll on the following render.
    pub fn did_render(&self) -> RenderEffect {
        let mut state = lock(&self.state);
        match state.pending.take() {
            Some(done) => {
                done.settle();
                state.active_in_group = state.matched.is_some();
                state.scroll_on_next_render = state.active_in_group;
                RenderEffect::Settled
            }
            None if state.scroll_on_next_render => {
                state.scroll_on_next_render = false;
                RenderEffect::Scroll
            }
            None => RenderEffect::None,
        }
    }
}

impl std::fmt::Debug for RouteView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("RouteView")
            .field("grouped", &self.grouped)
            .field("matched", &state.matched)
            .field("active_in_group", &state.active_in_group)
            .field("pending", &state.pending.is_some())
            .finish()
    }
}

/// What a completed render means for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEffect {
    /// Nothing to do.
    None,
    /// A pending notification was acknowledged.
    Settled,
    /// The route became active on the previous render; scroll now.
    Scroll,
}

/// A route registered with an engine. Unsubscribes on drop.
#[derive(Debug)]
pub struct MountedRoute {
    engine: RouterEngine,
    view: RouteView,
    unsubscribe: Unsubscribe,
    scroll_top_offset: Option<f64>,
}

impl MountedRoute {
    pub fn id(&self) -> SubscriptionId {
        self.unsubscribe.id()
    }

    pub fn view(&self) -> &RouteView {
        &self.view
    }

    pub fn matched(&self) -> Option<MatchResult> {
        self.view.matched()
    }

    pub fn is_visible(&self) -> bool {
        self.view.is_visible()
    }

    /// Acknowledge a host render. Returns a scroll target when one is due.
    pub fn did_render(&self) -> Option<ScrollTarget> {
        match self.view.did_render() {
            RenderEffect::Scroll => {
                let history = self.engine.history();
                ScrollTarget::resolve(self.scroll_top_offset, history.as_deref())
            }
            RenderEffect::Settled | RenderEffect::None => None,
        }
    }

    /// Unsubscribe the route now. Dropping the handle does the same.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for MountedRoute {
    fn drop(&mut self) {
        self.unsubscribe.unsubscribe();
    }
}
