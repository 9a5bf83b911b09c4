//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine, registry, dispatch:
//!     → tracing events (subscription ids, pathnames, change counts)
//!     → logging.rs (subscriber setup, level from config or RUST_LOG)
//!     → metrics.rs (counters, gauges, histograms via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or a metrics recorder is
//!   left to the binary
//! - Metrics are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
