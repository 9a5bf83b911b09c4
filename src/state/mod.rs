//! Router state subsystem.
//!
//! # Data Flow
//! ```text
//! History backend (push/replace/pop)
//!     → history.rs listener
//!     → StateUpdate { location, .. }
//!     → store.rs (shallow merge, atomic swap)
//!     → dispatch reads the current pathname
//!
//! Before the first write:
//!     store.rs → location.rs LocationSource (live environment location)
//! ```
//!
//! # Design Decisions
//! - Typed state: unknown keys cannot be written
//! - One store per engine, no module-level globals

pub mod history;
pub mod location;
pub mod store;

pub use history::{History, HistoryAction, HistoryListener, ListenerId, MemoryHistory};
pub use location::{FixedLocation, Location, LocationSource};
pub use store::{RouterState, StateStore, StateUpdate};
