//! One-time readiness signal.
//!
//! Fired by the root binding once the engine holds its first location.
//! Waiters that arrive after the event see it immediately.

use tokio::sync::watch;

use crate::state::Location;

/// Coordinator for the "router ready" event.
///
/// Backed by a watch channel so late subscribers still observe the value.
pub struct ReadySignal {
    tx: watch::Sender<Option<Location>>,
}

impl ReadySignal {
    /// Create an unfired signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Fire the event. Returns false if it had already fired.
    pub fn fire(&self, location: Location) -> bool {
        let mut location = Some(location);
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = location.take();
            true
        })
    }

    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Wait for the event and return the location it carried.
    pub async fn wait(&self) -> Location {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(location) = rx.borrow_and_update().clone() {
                return location;
            }
            // The sender lives in `self`, so the channel cannot close here.
            if rx.changed().await.is_err() {
                return Location::default();
            }
        }
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadySignal")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_waiter_before_fire_is_woken() {
        let signal = Arc::new(ReadySignal::new());
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::task::yield_now().await;
        assert!(signal.fire(Location::new("/home")));
        assert_eq!(waiter.await.unwrap().pathname, "/home");
    }

    #[tokio::test]
    async fn test_second_fire_is_ignored() {
        let signal = ReadySignal::new();
        assert!(signal.fire(Location::new("/a")));
        assert!(!signal.fire(Location::new("/b")));
        assert!(signal.is_ready());
        assert_eq!(signal.wait().await.pathname, "/a");
    }
}
