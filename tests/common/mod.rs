//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use active_router::router::{rendezvous, Listener, RenderDone, RouterEngine};
use active_router::state::MemoryHistory;

/// One notification seen by a recording listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub route: &'static str,
    pub url: Option<String>,
}

/// Shared notification log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An immediate listener logging under `route`.
    pub fn immediate(&self, route: &'static str) -> Listener {
        let seen = self.seen.clone();
        Listener::immediate(move |m| {
            seen.lock().unwrap().push(Seen {
                route,
                url: m.map(|m| m.url.clone()),
            });
            Ok(())
        })
    }

    /// A deferred listener logging under `route` whose signals settle at once.
    pub fn settled(&self, route: &'static str) -> Listener {
        let seen = self.seen.clone();
        Listener::deferred(move |m| {
            seen.lock().unwrap().push(Seen {
                route,
                url: m.map(|m| m.url.clone()),
            });
            Ok(active_router::router::RenderSignal::settled())
        })
    }

    /// A deferred listener whose settling halves are parked in `gate`.
    pub fn gated(&self, route: &'static str, gate: &Gate) -> Listener {
        let seen = self.seen.clone();
        let parked = gate.parked.clone();
        Listener::deferred(move |m| {
            seen.lock().unwrap().push(Seen {
                route,
                url: m.map(|m| m.url.clone()),
            });
            let (done, signal) = rendezvous();
            parked.lock().unwrap().push(done);
            Ok(signal)
        })
    }

    pub fn take(&self) -> Vec<Seen> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }

    /// Route names in notification order, draining the log.
    pub fn order(&self) -> Vec<&'static str> {
        self.take().into_iter().map(|s| s.route).collect()
    }
}

/// Holds render completions until the test releases them.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    parked: Arc<Mutex<Vec<RenderDone>>>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parked(&self) -> usize {
        self.parked.lock().unwrap().len()
    }

    /// Settle every parked render.
    pub fn release(&self) {
        for done in self.parked.lock().unwrap().drain(..) {
            done.settle();
        }
    }
}

pub fn seen(route: &'static str, url: Option<&str>) -> Seen {
    Seen {
        route,
        url: url.map(str::to_string),
    }
}

/// An engine whose default location is `initial`.
pub fn engine_at(initial: &str) -> (RouterEngine, Arc<MemoryHistory>) {
    let history = Arc::new(MemoryHistory::new(initial));
    (RouterEngine::new(history.clone()), history)
}

/// Let spawned dispatch tasks run.
pub async fn settle_tasks() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
