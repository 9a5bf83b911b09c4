//! Metrics collection.
//!
//! # Metrics
//! - `router_dispatch_passes_total` (counter): dispatch scans run
//! - `router_dispatch_changes` (histogram): notifications queued per scan
//! - `router_notifications_total` (counter): delivered notifications by kind
//! - `router_subscriptions` (gauge): registered routes
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; exposition belongs to the host

/// Record one dispatch scan that queued `changes` notifications.
pub fn record_dispatch(changes: usize) {
    metrics::counter!("router_dispatch_passes_total").increment(1);
    metrics::histogram!("router_dispatch_changes").record(changes as f64);
}

/// Record one delivered notification; `kind` is "awaited" or "immediate".
pub fn record_notification(kind: &'static str) {
    metrics::counter!("router_notifications_total", "kind" => kind).increment(1);
}

pub fn set_subscription_count(count: usize) {
    metrics::gauge!("router_subscriptions").set(count as f64);
}
