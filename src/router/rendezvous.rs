//! One-shot render rendezvous.
//!
//! A deferred listener hands the engine a [`RenderSignal`] and keeps the
//! matching [`RenderDone`]. The engine waits on the signal before delivering
//! the next notification of the pass; the UI side settles it once the
//! re-render triggered by the notification has finished.

use tokio::sync::oneshot;

/// Create a connected completion pair.
pub fn rendezvous() -> (RenderDone, RenderSignal) {
    let (tx, rx) = oneshot::channel();
    (RenderDone(tx), RenderSignal(rx))
}

/// The settling half, held by the UI collaborator.
#[derive(Debug)]
pub struct RenderDone(oneshot::Sender<()>);

impl RenderDone {
    /// Mark the render as settled. A no-op if nobody is waiting any more.
    pub fn settle(self) {
        let _ = self.0.send(());
    }
}

/// The waiting half, returned to the engine.
#[derive(Debug)]
pub struct RenderSignal(oneshot::Receiver<()>);

impl RenderSignal {
    /// A signal that is already settled.
    pub fn settled() -> Self {
        let (done, signal) = rendezvous();
        done.settle();
        signal
    }

    /// Wait until settled. Fails if the settling half was dropped unsettled.
    pub async fn wait(self) -> Result<(), oneshot::error::RecvError> {
        self.0.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settle_wakes_waiter() {
        let (done, signal) = rendezvous();
        let waiter = tokio::spawn(signal.wait());
        done.settle();
        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_done_fails_waiter() {
        let (done, signal) = rendezvous();
        drop(done);
        assert!(signal.wait().await.is_err());
    }

    #[tokio::test]
    async fn test_settled_signal_is_ready() {
        assert!(RenderSignal::settled().wait().await.is_ok());
    }
}
