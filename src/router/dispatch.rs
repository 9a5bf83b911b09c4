//! Dispatch pass: change detection and ordered delivery.
//!
//! # Responsibilities
//! - Recompute matches for every subscription under group exclusivity
//! - Diff against the previous match and queue the changes
//! - Deliver the queued changes in order, waiting on group activations
//!
//! # Ordering
//! ```text
//! scan (registry order):
//!     group already matched this pass → None, matcher not consulted
//!     otherwise                       → matcher(pathname)
//!     changed, first match of its group → front of the queue
//!     changed, anything else            → back of the queue
//!     last_match = result (always)
//!
//! deliver (queue order):
//!     grouped + Some(match) → notify, then wait for the render signal
//!     otherwise             → notify, do not wait
//! ```
//!
//! # Design Decisions
//! - Scan is synchronous; only delivery can suspend
//! - Listener failures are not caught: the pass stops and reports the error
//! - A subscription removed mid-pass still receives its queued notification

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;
use crate::router::error::{DispatchError, DispatchResult};
use crate::router::lock;
use crate::router::rendezvous::RenderSignal;
use crate::router::subscription::{Subscription, SubscriptionId};
use crate::routing::MatchResult;

struct Change {
    subscription: Arc<Subscription>,
    matched: Option<MatchResult>,
}

impl Change {
    fn awaited(&self) -> bool {
        self.subscription.group.is_some() && self.matched.is_some()
    }
}

/// The notifications produced by one scan, not yet (fully) delivered.
pub struct Delivery {
    pathname: String,
    changes: VecDeque<Change>,
    started: Instant,
}

/// Run the scan half of a dispatch pass against `subscriptions`.
pub(crate) fn scan(subscriptions: &[Arc<Subscription>], pathname: &str) -> Delivery {
    let started = Instant::now();
    let mut matched_groups: HashSet<&str> = HashSet::new();
    let mut changes = VecDeque::new();

    for subscription in subscriptions {
        let group_id = subscription.group_id();
        let group_taken = group_id.is_some_and(|g| matched_groups.contains(g));

        let matched = if group_taken {
            None
        } else {
            subscription.matcher.match_pathname(pathname)
        };

        let mut last = lock(&subscription.last_match);
        if *last != matched {
            let first_in_group = group_id.is_some() && !group_taken && matched.is_some();
            let change = Change {
                subscription: Arc::clone(subscription),
                matched: matched.clone(),
            };
            if first_in_group {
                changes.push_front(change);
            } else {
                changes.push_back(change);
            }
        }
        if let (Some(group), Some(_)) = (group_id, &matched) {
            matched_groups.insert(group);
        }
        *last = matched;
    }

    tracing::debug!(
        pathname,
        subscriptions = subscriptions.len(),
        changes = changes.len(),
        "Dispatch scan complete"
    );
    metrics::record_dispatch(changes.len());

    Delivery {
        pathname: pathname.to_string(),
        changes,
        started,
    }
}

impl Delivery {
    /// Number of notifications still queued.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Pathname the pass was computed for.
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Deliver queued notifications without suspending.
    ///
    /// Stops right after notifying the first change that must be waited on and
    /// returns its signal; returns `None` once the queue is drained.
    pub(crate) fn advance(&mut self) -> Result<Option<(SubscriptionId, RenderSignal)>, DispatchError> {
        while let Some(change) = self.changes.pop_front() {
            let id = change.subscription.id;
            let awaited = change.awaited();
            let signal = change
                .subscription
                .listener
                .notify(change.matched.as_ref())
                .map_err(|source| DispatchError::Listener { id, source })?;
            tracing::debug!(
                subscription = %id,
                matched = change.matched.is_some(),
                awaited,
                "Delivered route notification"
            );
            metrics::record_notification(if awaited { "awaited" } else { "immediate" });

            if awaited {
                if let Some(signal) = signal {
                    return Ok(Some((id, signal)));
                }
            }
        }
        Ok(None)
    }

    /// Deliver everything, waiting on each group activation in turn.
    pub async fn deliver(mut self) -> DispatchResult {
        while let Some((id, signal)) = self.advance()? {
            signal.wait().await.map_err(|_| DispatchError::Abandoned(id))?;
        }
        tracing::trace!(
            pathname = %self.pathname,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "Dispatch pass delivered"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("pathname", &self.pathname)
            .field("pending", &self.changes.len())
            .finish()
    }
}
