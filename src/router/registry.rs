//! Subscription registry.
//!
//! # Responsibilities
//! - Keep registered routes in dispatch order
//! - Insert grouped routes ahead of ungrouped ones, ordered by group index
//! - Remove routes by identity
//!
//! # Ordering
//! ```text
//! ungrouped, or group without index, or empty list → append
//! otherwise scan from the front and insert before:
//!     the first ungrouped entry, or
//!     the first same-group entry positioned after the new one
//! nothing found → append
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::GroupInsertion;
use crate::router::lock;
use crate::router::subscription::{Subscription, SubscriptionId};

#[derive(Debug)]
pub(crate) struct Registry {
    entries: Mutex<Vec<Arc<Subscription>>>,
    next_id: AtomicU64,
    insertion: GroupInsertion,
}

impl Registry {
    pub(crate) fn new(insertion: GroupInsertion) -> Self {
        if insertion != GroupInsertion::default() {
            tracing::warn!(
                policy = ?insertion,
                "Non-default group insertion policy selected; equal group indices order differently"
            );
        }
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            insertion,
        }
    }

    pub(crate) fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn insert(&self, subscription: Arc<Subscription>) {
        let mut entries = lock(&self.entries);
        let position = match &subscription.group {
            Some(group) if !entries.is_empty() => group
                .index
                .and_then(|index| find_slot(&entries, &group.id, index, self.insertion)),
            _ => None,
        };
        match position {
            Some(at) => entries.insert(at, subscription),
            None => entries.push(subscription),
        }
        crate::observability::metrics::set_subscription_count(entries.len());
    }

    /// Remove by identity. Returns whether an entry was removed.
    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|s| s.id != id);
        crate::observability::metrics::set_subscription_count(entries.len());
        entries.len() != before
    }

    /// Current entries in dispatch order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Subscription>> {
        lock(&self.entries).clone()
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub(crate) fn ids(&self) -> Vec<SubscriptionId> {
        lock(&self.entries).iter().map(|s| s.id).collect()
    }
}

fn find_slot(
    entries: &[Arc<Subscription>],
    group_id: &str,
    index: u32,
    insertion: GroupInsertion,
) -> Option<usize> {
    entries.iter().position(|entry| match &entry.group {
        None => true,
        Some(group) if group.id == group_id => match (group.index, insertion) {
            (Some(existing), GroupInsertion::BeforeFirstGreater) => existing > index,
            (Some(existing), GroupInsertion::BeforeFirstEqualOrGreater) => existing >= index,
            (None, _) => false,
        },
        Some(_) => false,
    })
}
