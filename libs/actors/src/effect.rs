//! Effects
//!
//! An [`Effect`] is the transaction log of a single handling: the requested
//! behavior replacement, the outgoing events and the errors, in call order.
//! Nothing in it is visible to the rest of the runtime until the dispatch loop
//! resolves it with [`Effect::into_outcome`] and either commits or discards
//! the whole thing.

use crate::behavior::Behavior;
use crate::error::ActorError;
use crate::event::Event;
use crate::registry::ActorId;

/// In-flight record of one behavior invocation
#[derive(Debug, Default)]
pub struct Effect {
    replacement: Option<Behavior>,
    events: Vec<Event>,
    errors: Vec<ActorError>,
}

/// How an effect resolves once the behavior returns
#[derive(Debug)]
pub enum EffectOutcome {
    /// No errors: apply the replacement (if any) and publish the events
    Commit {
        replacement: Option<Behavior>,
        events: Vec<Event>,
    },
    /// At least one error: discard everything else
    Abort { errors: Vec<ActorError> },
}

impl Effect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a behavior replacement
    ///
    /// Only the first request per handling is kept; any further request is
    /// recorded as [`ActorError::DuplicateBecome`], which aborts the handling.
    pub fn become_behavior(&mut self, actor: ActorId, behavior: Behavior) {
        if self.replacement.is_some() {
            self.errors.push(ActorError::DuplicateBecome { actor });
        } else {
            self.replacement = Some(behavior);
        }
    }

    pub fn send(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn signal(&mut self, error: ActorError) {
        self.errors.push(error);
    }

    pub fn replacement(&self) -> Option<&Behavior> {
        self.replacement.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn errors(&self) -> &[ActorError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_outcome(self) -> EffectOutcome {
        if self.errors.is_empty() {
            EffectOutcome::Commit {
                replacement: self.replacement,
                events: self.events,
            }
        } else {
            EffectOutcome::Abort {
                errors: self.errors,
            }
        }
    }
}
