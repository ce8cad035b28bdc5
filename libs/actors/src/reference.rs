//! Actor References
//!
//! An [`ActorRef`] is the copyable handle behaviors use to address themselves
//! and other actors. It holds the actor identifier and a non-owning pointer
//! back to the runtime, so references captured inside behaviors never keep
//! the runtime alive.
//!
//! `become_behavior`, `send` and `signal` only ever touch the in-flight
//! effect of the referenced actor. They are meant to be called synchronously
//! from inside that actor's current handling. A call made anywhere else is
//! not applied and [`ActorError::NotHandling`] is reported to the error sink.
//! That covers an idle actor and an actor handling on another thread.

use crate::behavior::Behavior;
use crate::error::{ActorError, BoxError};
use crate::message::Message;
use crate::registry::ActorId;
use crate::system::RuntimeState;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use tracing::warn;

/// Handle to an actor registered in a runtime
#[derive(Debug, Clone)]
pub struct ActorRef {
    id: ActorId,
    runtime: Weak<RuntimeState>,
}

impl ActorRef {
    pub(crate) fn new(id: ActorId, runtime: Weak<RuntimeState>) -> Self {
        Self { id, runtime }
    }

    /// Reference that belongs to no runtime
    #[cfg(test)]
    pub(crate) fn detached(id: ActorId) -> Self {
        Self::new(id, Weak::new())
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Request that this actor handle future events with `behavior`
    ///
    /// Takes effect only if the current handling commits. A second request
    /// within the same handling aborts it.
    pub fn become_behavior(&self, behavior: impl Into<Behavior>) {
        let behavior = behavior.into();
        if let Some(runtime) = self.upgrade() {
            runtime.record(self.id, |effect| effect.become_behavior(self.id, behavior));
        }
    }

    /// Queue `message` for `target` as part of this actor's effect
    pub fn send(&self, target: &ActorRef, message: impl Into<Message>) {
        if let Some(runtime) = self.upgrade() {
            let event = runtime.event(target.clone(), message.into());
            runtime.record(self.id, |effect| effect.send(event));
        }
    }

    /// Record an application error; the current handling will be rolled back
    pub fn signal(&self, error: impl Into<BoxError>) {
        let error = ActorError::signaled(self.id, error);
        if let Some(runtime) = self.upgrade() {
            runtime.record(self.id, |effect| effect.signal(error));
        }
    }

    /// Create a new actor in the same runtime
    ///
    /// Creation is immediate and is not part of the effect. Returns `None`
    /// once the runtime has been dropped.
    pub fn create(&self, behavior: impl Into<Behavior>) -> Option<ActorRef> {
        self.upgrade().map(|runtime| runtime.create(behavior.into()))
    }

    /// Check whether both references point into the same runtime
    pub fn same_runtime(&self, other: &ActorRef) -> bool {
        Weak::ptr_eq(&self.runtime, &other.runtime)
    }

    pub(crate) fn belongs_to(&self, runtime: &RuntimeState) -> bool {
        std::ptr::eq(self.runtime.as_ptr(), runtime)
    }

    fn upgrade(&self) -> Option<Arc<RuntimeState>> {
        let runtime = self.runtime.upgrade();
        if runtime.is_none() {
            warn!(actor_id = %self.id, "Runtime dropped, ignoring actor reference call");
        }
        runtime
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.same_runtime(other)
    }
}

impl Eq for ActorRef {}

impl Hash for ActorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{actor: {}}}", self.id)
    }
}
