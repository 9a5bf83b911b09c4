//! Active router subsystem.
//!
//! # Data Flow
//! ```text
//! RouterEngine::set(update)
//!     → state store merge (state::store)
//!     → registry snapshot (registry.rs)
//!     → scan: group exclusivity + change detection (dispatch.rs)
//!     → delivery: notify listeners in queue order
//!         → deferred listener returns a RenderSignal (rendezvous.rs)
//!         → engine waits before the next notification
//!
//! RouterEngine::subscribe(descriptor)
//!     → initial match + one notification
//!     → ordered insert into the registry
//!     → Unsubscribe handle (idempotent removal)
//! ```
//!
//! # Design Decisions
//! - No engine lock is held while a listener runs, so listeners may call
//!   `set` or `subscribe`
//! - Poisoned locks are recovered; a panicking listener must not wedge routing

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod rendezvous;
pub(crate) mod registry;
pub mod subscription;

pub use engine::{DispatchHandle, RouterEngine, Unsubscribe};
pub use error::{DispatchError, DispatchResult, ListenerError, RouterError};
pub use rendezvous::{rendezvous, RenderDone, RenderSignal};
pub use subscription::{Listener, RouteGroup, SubscriptionDescriptor, SubscriptionId};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
