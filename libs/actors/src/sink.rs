//! Error and Trace Sinks
//!
//! Aborted handlings, empty dispatches and misused references are handed to
//! an [`ErrorSink`]; when tracing is enabled, actor creation and dispatch
//! progress go to a [`TraceSink`]. Both are injected through
//! [`RuntimeBuilder`](crate::RuntimeBuilder). The defaults write to the
//! console: [`ConsoleErrorSink`] to stderr and [`ConsoleTrace`] to stdout.
//! Services that install a `tracing` subscriber usually swap in
//! [`LogErrorSink`].

use crate::error::ActorError;
use crate::event::Event;
use crate::reference::ActorRef;
use tracing::error;

/// Receives the errors of one failed dispatch step, in the order recorded
pub trait ErrorSink: Send + Sync {
    fn report(&self, errors: &[ActorError]);

    /// Name shown in runtime logs and `Debug` output
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> ErrorSink for F
where
    F: Fn(&[ActorError]) + Send + Sync,
{
    fn report(&self, errors: &[ActorError]) {
        self(errors)
    }
}

/// Default error sink: one `ERRORS: [ ... ]` line on stderr per report
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleErrorSink;

impl ConsoleErrorSink {
    fn line(errors: &[ActorError]) -> String {
        let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
        format!("ERRORS: [{}]", rendered.join(", "))
    }
}

impl ErrorSink for ConsoleErrorSink {
    fn report(&self, errors: &[ActorError]) {
        eprintln!("{}", Self::line(errors));
    }
}

/// Structured error sink: one `tracing` error event per reported error
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, errors: &[ActorError]) {
        for err in errors {
            match err.actor() {
                Some(actor) => error!(actor_id = %actor, error = %err, "Dispatch error"),
                None => error!(error = %err, "Dispatch error"),
            }
        }
    }
}

/// Diagnostic hook for runtime progress
pub trait TraceSink: Send + Sync {
    fn created(&self, actor: &ActorRef);

    fn dispatching(&self, event: &Event);

    fn dispatched(&self, event: &Event);

    /// Name shown in runtime logs and `Debug` output
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Default trace sink: writes `[trace]` lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTrace;

impl ConsoleTrace {
    fn line(stage: &str, subject: &dyn std::fmt::Display) -> String {
        format!("[trace] {:<11} {}", stage, subject)
    }
}

impl TraceSink for ConsoleTrace {
    fn created(&self, actor: &ActorRef) {
        println!("{}", Self::line("CREATED", actor));
    }

    fn dispatching(&self, event: &Event) {
        println!("{}", Self::line("DISPATCHING", event));
    }

    fn dispatched(&self, event: &Event) {
        println!("{}", Self::line("DISPATCHED", event));
    }
}
