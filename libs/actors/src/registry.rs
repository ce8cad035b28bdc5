//! Actor Registry
//!
//! Identifier allocation and the actor table. The table maps each identifier
//! to the currently committed [`Actor`] snapshot; commits replace the whole
//! entry under the write lock, so readers observe either the old or the new
//! actor and never a mix.

use crate::actor::Actor;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique actor identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier source, starting at 1
#[derive(Debug)]
pub(crate) struct IdCounter(AtomicU64);

impl IdCounter {
    pub(crate) fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Table of committed actors keyed by identifier
#[derive(Debug, Default)]
pub(crate) struct ActorTable {
    actors: RwLock<HashMap<ActorId, Arc<Actor>>>,
}

impl ActorTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a newly created actor
    pub(crate) fn register(&self, actor: Actor) {
        let id = actor.id();
        tracing::trace!(actor_id = %id, "Registering actor");
        self.actors.write().insert(id, Arc::new(actor));
    }

    /// Swap in the successor produced by a commit
    pub(crate) fn publish(&self, actor: Actor) {
        self.actors.write().insert(actor.id(), Arc::new(actor));
    }

    pub(crate) fn find(&self, id: ActorId) -> Option<Arc<Actor>> {
        self.actors.read().get(&id).cloned()
    }

    pub(crate) fn contains(&self, id: ActorId) -> bool {
        self.actors.read().contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.actors.read().len()
    }

    /// Identifiers of all registered actors, ascending
    pub(crate) fn ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self.actors.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
