//! Actor Behaviors
//!
//! A [`Behavior`] is the handler currently governing how an actor reacts to
//! events. It is an immutable, shareable function: everything it wants to
//! change is requested through the actor's reference and lands in the
//! in-flight [`Effect`](crate::Effect), never in shared state directly.

use crate::event::Event;
use std::fmt;
use std::sync::Arc;

type Handler = dyn Fn(&Event) + Send + Sync + 'static;

/// Shareable event handler, optionally named for diagnostics
#[derive(Clone)]
pub struct Behavior {
    handler: Arc<Handler>,
    name: Option<Arc<str>>,
}

impl Behavior {
    /// Wrap a handler function
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            name: None,
        }
    }

    /// Wrap a handler function with a name shown in logs and `Debug` output
    pub fn named<F>(name: impl Into<Arc<str>>, handler: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            name: Some(name.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the handler
    pub fn call(&self, event: &Event) {
        (self.handler)(event)
    }

    /// Check whether both values wrap the same handler allocation
    pub fn same_as(&self, other: &Behavior) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.handler) as *const (),
            Arc::as_ptr(&other.handler) as *const (),
        )
    }
}

impl<F> From<F> for Behavior
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Behavior::new(handler)
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Behavior({})", name),
            None => write!(f, "Behavior({:p})", Arc::as_ptr(&self.handler) as *const ()),
        }
    }
}
