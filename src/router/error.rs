//! Router error definitions.

use std::error::Error as StdError;
use thiserror::Error;

use crate::router::subscription::SubscriptionId;
use crate::routing::PatternError;

/// A listener refused or failed to handle a notification.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error.
    pub fn from_source(message: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors raised while registering routes or setting up a root binding.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The route pattern is malformed.
    #[error("invalid route pattern: {0}")]
    Pattern(#[from] PatternError),

    /// The initial notification failed; the subscription was not registered.
    #[error("initial notification failed: {0}")]
    Listener(#[from] ListenerError),

    /// A dispatch pass started during setup failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Errors surfaced by a dispatch pass.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A listener failed; the remaining notifications of the pass were skipped.
    #[error("listener for subscription {id} failed: {source}")]
    Listener {
        id: SubscriptionId,
        #[source]
        source: ListenerError,
    },

    /// A deferred listener dropped its completion signal without settling it.
    #[error("render signal for subscription {0} was dropped before it settled")]
    Abandoned(SubscriptionId),

    /// The task delivering the notifications panicked or was aborted.
    #[error("dispatch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for dispatch passes.
pub type DispatchResult = Result<(), DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DispatchError::Abandoned(SubscriptionId(7));
        assert_eq!(
            err.to_string(),
            "render signal for subscription #7 was dropped before it settled"
        );

        let err = DispatchError::Listener {
            id: SubscriptionId(3),
            source: ListenerError::new("render exploded"),
        };
        assert!(err.to_string().contains("render exploded"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_listener_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ListenerError::from_source("could not persist", io);
        assert_eq!(err.to_string(), "could not persist");
        assert!(err.source().unwrap().to_string().contains("disk gone"));
    }
}
