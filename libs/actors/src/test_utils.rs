//! Test Sinks
//!
//! Collecting implementations of [`ErrorSink`] and [`TraceSink`] for tests
//! and examples. Clones share storage, so keep one handle and give a clone
//! to the [`RuntimeBuilder`](crate::RuntimeBuilder).

use crate::error::ActorError;
use crate::event::Event;
use crate::reference::ActorRef;
use crate::sink::{ErrorSink, TraceSink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Error sink that keeps every reported error
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Arc<Mutex<Vec<ActorError>>>,
    reports: Arc<Mutex<usize>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of errors collected so far
    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    /// Number of `report` calls (one per failed dispatch step)
    pub fn reports(&self) -> usize {
        *self.reports.lock()
    }

    /// Rendered errors, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.errors.lock().iter().map(ToString::to_string).collect()
    }

    /// Drain collected errors
    pub fn take(&self) -> Vec<ActorError> {
        std::mem::take(&mut *self.errors.lock())
    }
}

impl ErrorSink for ErrorCollector {
    fn report(&self, errors: &[ActorError]) {
        *self.reports.lock() += 1;
        let mut collected = self.errors.lock();
        for err in errors {
            collected.push(match err {
                ActorError::EmptyQueue => ActorError::EmptyQueue,
                ActorError::DuplicateBecome { actor } => ActorError::DuplicateBecome { actor: *actor },
                ActorError::Signaled { actor, source } => {
                    ActorError::signaled(*actor, source.to_string())
                }
                ActorError::Panicked { actor, message } => ActorError::Panicked {
                    actor: *actor,
                    message: message.clone(),
                },
                ActorError::UnknownActor { actor } => ActorError::UnknownActor { actor: *actor },
                ActorError::NotHandling { actor } => ActorError::NotHandling { actor: *actor },
            });
        }
    }
}

/// Trace sink that records `STAGE subject` lines
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    lines: Arc<Mutex<Vec<String>>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    fn push(&self, stage: &str, subject: &dyn std::fmt::Display) {
        self.lines.lock().push(format!("{} {}", stage, subject));
    }
}

impl TraceSink for TraceRecorder {
    fn created(&self, actor: &ActorRef) {
        self.push("CREATED", actor);
    }

    fn dispatching(&self, event: &Event) {
        self.push("DISPATCHING", event);
    }

    fn dispatched(&self, event: &Event) {
        self.push("DISPATCHED", event);
    }
}
