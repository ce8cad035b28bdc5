//! Events
//!
//! An [`Event`] is a message addressed to one actor, stamped with an
//! identifier from the owning runtime's monotonic counter. Events are never
//! mutated after creation; deferral re-queues the same value.

use crate::message::Message;
use crate::reference::ActorRef;
use std::fmt;

/// Runtime-unique, strictly increasing event identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl EventId {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable, identified message addressed to a target actor
#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    target: ActorRef,
    message: Message,
}

impl Event {
    pub(crate) fn new(id: EventId, target: ActorRef, message: Message) -> Self {
        Self {
            id,
            target,
            message,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn target(&self) -> &ActorRef {
        &self.target
    }

    /// Reference to the actor handling this event
    ///
    /// Behaviors use it to `send`, `become_behavior` and `signal`.
    pub fn self_ref(&self) -> ActorRef {
        self.target.clone()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{event: {}, target: {}, message: {}}}",
            self.id, self.target, self.message
        )
    }
}
