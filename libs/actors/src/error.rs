//! Runtime Error Types
//!
//! Two families of errors live here:
//!
//! - [`ActorError`]: everything that can go wrong while handling one event.
//!   These are collected into the in-flight effect (or reported directly for
//!   queue-level conditions) and handed to the [`ErrorSink`](crate::ErrorSink).
//!   They never unwind across a dispatch.
//! - [`RuntimeError`]: failures of runtime-level operations that return a
//!   `Result` to the caller, such as spawning dispatch workers or loading
//!   configuration.

use crate::registry::ActorId;
use thiserror::Error;

/// Boxed application error carried by [`ActorError::Signaled`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for runtime-level operations
pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

/// Errors produced while dispatching events
#[derive(Debug, Error)]
pub enum ActorError {
    /// `dispatch()` was called with nothing queued
    #[error("no events to dispatch")]
    EmptyQueue,

    /// A behavior called `become` more than once in a single handling
    #[error("actor {actor}: behavior can be set once only during message handling")]
    DuplicateBecome { actor: ActorId },

    /// Application-raised error via `signal`
    #[error("actor {actor}: {source}")]
    Signaled {
        actor: ActorId,
        #[source]
        source: BoxError,
    },

    /// The behavior panicked; the handling was rolled back
    #[error("actor {actor}: behavior panicked: {message}")]
    Panicked { actor: ActorId, message: String },

    /// The event targets an identifier this runtime never issued
    #[error("actor {actor} is not registered in this runtime")]
    UnknownActor { actor: ActorId },

    /// A reference mutated an actor that is not handling an event on the
    /// calling thread
    #[error("actor {actor} is not handling an event")]
    NotHandling { actor: ActorId },
}

impl ActorError {
    /// Create a signaled error for `actor`
    pub fn signaled(actor: ActorId, source: impl Into<BoxError>) -> Self {
        ActorError::Signaled {
            actor,
            source: source.into(),
        }
    }

    /// Actor the error is attributed to, if any
    pub fn actor(&self) -> Option<ActorId> {
        match self {
            ActorError::EmptyQueue => None,
            ActorError::DuplicateBecome { actor }
            | ActorError::Signaled { actor, .. }
            | ActorError::Panicked { actor, .. }
            | ActorError::UnknownActor { actor }
            | ActorError::NotHandling { actor } => Some(*actor),
        }
    }

    /// Check if this error was raised by application code
    pub fn is_signaled(&self) -> bool {
        matches!(self, ActorError::Signaled { .. })
    }
}

/// Errors returned by fallible runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A dispatch worker thread could not be started
    #[error("failed to spawn dispatch worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// A dispatch worker panicked outside of a behavior
    #[error("dispatch worker {0} panicked")]
    WorkerPanicked(String),

    /// Configuration sources could not be read or deserialized
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration was read but holds invalid values
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ActorError::EmptyQueue.to_string(), "no events to dispatch");

        let err = ActorError::DuplicateBecome {
            actor: ActorId::from_raw(3),
        };
        assert_eq!(
            err.to_string(),
            "actor 3: behavior can be set once only during message handling"
        );
    }

    #[test]
    fn test_signaled_keeps_source() {
        let err = ActorError::signaled(ActorId::from_raw(7), "disk on fire");
        assert!(err.is_signaled());
        assert_eq!(err.actor(), Some(ActorId::from_raw(7)));
        assert_eq!(err.to_string(), "actor 7: disk on fire");

        let source = std::error::Error::source(&err).expect("source attached");
        assert_eq!(source.to_string(), "disk on fire");
    }

    #[test]
    fn test_empty_queue_has_no_actor() {
        assert_eq!(ActorError::EmptyQueue.actor(), None);
    }
}
