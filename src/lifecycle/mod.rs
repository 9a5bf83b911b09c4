//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build engine → Initialize root binding
//!     → first location stored → ReadySignal fired (ready.rs)
//!
//! Teardown:
//!     Root binding dropped → history listener removed
//! ```
//!
//! # Design Decisions
//! - Readiness fires at most once per engine
//! - Late waiters observe the event immediately

pub mod ready;

pub use ready::ReadySignal;
