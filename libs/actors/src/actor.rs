//! Actor Cells
//!
//! An [`Actor`] is an immutable snapshot: identifier plus committed behavior.
//! The only mutable parts are the busy flag and the in-flight effect slot,
//! both owned by whichever dispatcher won the test-and-set. The slot remembers
//! that dispatcher's thread, and only that thread may record into it.
//!
//! A successful commit never edits an actor in place. The dispatcher builds a
//! [`successor`](Actor::successor) and swaps it into the table, so the
//! superseded value stays busy forever and can never begin another handling.

use crate::behavior::Behavior;
use crate::effect::Effect;
use crate::registry::ActorId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

#[derive(Debug)]
struct Handling {
    owner: ThreadId,
    effect: Effect,
}

#[derive(Debug)]
pub(crate) struct Actor {
    id: ActorId,
    behavior: Behavior,
    busy: AtomicBool,
    handling: Mutex<Option<Handling>>,
}

impl Actor {
    pub(crate) fn new(id: ActorId, behavior: Behavior) -> Self {
        Self {
            id,
            behavior,
            busy: AtomicBool::new(false),
            handling: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the actor for one handling on the calling thread and install a
    /// fresh effect
    ///
    /// Returns `false` if another handling already owns it.
    pub(crate) fn try_begin(&self) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        *self.handling.lock() = Some(Handling {
            owner: thread::current().id(),
            effect: Effect::new(),
        });
        true
    }

    /// Apply `record` to the in-flight effect
    ///
    /// `None` unless a handling is running on the calling thread.
    pub(crate) fn record<R>(&self, record: impl FnOnce(&mut Effect) -> R) -> Option<R> {
        let current = thread::current().id();
        match self.handling.lock().as_mut() {
            Some(handling) if handling.owner == current => Some(record(&mut handling.effect)),
            _ => None,
        }
    }

    /// Detach the in-flight effect once the behavior has returned
    pub(crate) fn finish(&self) -> Effect {
        self.handling
            .lock()
            .take()
            .map(|handling| handling.effect)
            .unwrap_or_default()
    }

    /// Drop any in-flight effect and clear the busy flag
    pub(crate) fn release(&self) {
        self.handling.lock().take();
        self.busy.store(false, Ordering::Release);
    }

    /// Fresh, idle actor with the same identifier and `behavior`
    pub(crate) fn successor(&self, behavior: Behavior) -> Actor {
        Actor::new(self.id, behavior)
    }
}
