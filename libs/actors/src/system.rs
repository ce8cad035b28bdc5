//! Actor Runtime Core
//!
//! Owns the actor table, the global FIFO event queue and the identifier
//! counters, and drives the dispatch loop.
//!
//! # Dispatch
//!
//! One [`Runtime::dispatch`] step pops the queue head and looks up the target.
//! If the target is already handling an event the popped event goes back to
//! the tail unchanged. Otherwise the dispatcher claims the actor, runs its
//! behavior synchronously against a fresh [`Effect`](crate::Effect), and then:
//!
//! - **commit** (no errors): append every event the behavior sent, in order,
//!   then swap in a successor actor carrying the requested behavior. The
//!   actor's next handling therefore always queues behind this one's events;
//! - **abort** (any error): release the actor with its previous behavior,
//!   drop every event the behavior sent, and report the errors.
//!
//! # Threading
//!
//! [`Runtime`] is `Clone + Send + Sync`. Any number of threads may call
//! `dispatch` at once; the busy flag guarantees at most one handling per
//! actor, while different actors run in parallel. [`Runtime::run_workers`]
//! packages that as a scoped worker pool.
//!
//! # Lock Ordering
//!
//! The actor table lock and the queue lock are never held together, and no
//! lock is held while a behavior runs.
//!
//! # Ordering
//!
//! Events from one handling are appended together and in call order. An event
//! whose target is busy goes back to the tail, so with several dispatchers it
//! can end up behind events queued after it.
//!
//! # Panics
//!
//! A panicking behavior aborts its handling. A panic anywhere else in a
//! dispatch step (a sink, for instance) unwinds out of `dispatch`, but the
//! in-flight count and the actor's busy flag are still restored on the way.

use crate::actor::Actor;
use crate::behavior::Behavior;
use crate::config::RuntimeConfig;
use crate::effect::{Effect, EffectOutcome};
use crate::error::{ActorError, Result, RuntimeError};
use crate::event::{Event, EventId};
use crate::message::Message;
use crate::metrics::{RuntimeMetrics, RuntimeStats};
use crate::reference::ActorRef;
use crate::registry::{ActorId, ActorTable, IdCounter};
use crate::sink::{ConsoleErrorSink, ConsoleTrace, ErrorSink, TraceSink};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, trace, warn};

/// Result of one dispatch step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing was queued; an `EmptyQueue` error was reported
    Empty,
    /// The behavior ran and its effect was applied
    Committed {
        event: EventId,
        actor: ActorId,
        /// Number of events the effect appended to the queue
        sent: usize,
        /// Whether the actor's behavior was replaced
        became: bool,
    },
    /// The behavior ran and its effect was discarded
    Aborted {
        event: EventId,
        actor: ActorId,
        errors: usize,
    },
    /// The target was busy; the event moved to the queue tail
    Deferred { event: EventId, actor: ActorId },
    /// The target is not registered; the event was discarded
    Dropped { event: EventId, actor: ActorId },
}

impl Dispatch {
    pub fn is_committed(&self) -> bool {
        matches!(self, Dispatch::Committed { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Dispatch::Aborted { .. })
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Dispatch::Deferred { .. })
    }

    /// Whether a behavior was invoked in this step
    pub fn is_handled(&self) -> bool {
        self.is_committed() || self.is_aborted()
    }

    pub fn event(&self) -> Option<EventId> {
        match self {
            Dispatch::Empty => None,
            Dispatch::Committed { event, .. }
            | Dispatch::Aborted { event, .. }
            | Dispatch::Deferred { event, .. }
            | Dispatch::Dropped { event, .. } => Some(*event),
        }
    }
}

/// Shared state behind every [`Runtime`] handle and [`ActorRef`]
pub(crate) struct RuntimeState {
    actors: ActorTable,
    queue: Mutex<VecDeque<Event>>,
    /// Events popped but not yet resolved; guarded by the queue lock on increment
    in_flight: AtomicUsize,
    next_actor_id: IdCounter,
    next_event_id: IdCounter,
    config: RuntimeConfig,
    error_sink: Box<dyn ErrorSink>,
    trace_sink: Box<dyn TraceSink>,
    metrics: RuntimeMetrics,
}

impl RuntimeState {
    pub(crate) fn create(self: &Arc<Self>, behavior: Behavior) -> ActorRef {
        let id = ActorId::from_raw(self.next_actor_id.next());
        debug!(actor_id = %id, behavior = ?behavior, "Creating actor");
        self.actors.register(Actor::new(id, behavior));
        self.metrics.record_created();

        let actor_ref = ActorRef::new(id, Arc::downgrade(self));
        if self.config.trace {
            self.trace_sink.created(&actor_ref);
        }
        actor_ref
    }

    /// Stamp a new event with the next identifier
    pub(crate) fn event(&self, target: ActorRef, message: Message) -> Event {
        let id = EventId::from_raw(self.next_event_id.next());
        Event::new(id, target, message)
    }

    /// Apply `record` to the in-flight effect of `actor`
    pub(crate) fn record(&self, actor: ActorId, record: impl FnOnce(&mut Effect)) {
        let Some(cell) = self.actors.find(actor) else {
            warn!(actor_id = %actor, "Actor reference points at an unknown actor");
            self.report(vec![ActorError::UnknownActor { actor }]);
            return;
        };
        if cell.record(record).is_none() {
            warn!(actor_id = %actor, "Actor reference used outside of a handling");
            self.report(vec![ActorError::NotHandling { actor }]);
        }
    }

    fn enqueue(&self, event: Event) {
        trace!(event_id = %event.id(), actor_id = %event.target().id(), "Enqueueing event");
        self.queue.lock().push_back(event);
    }

    fn pop(&self) -> Option<(Event, InFlight<'_>)> {
        let mut queue = self.queue.lock();
        let event = queue.pop_front()?;
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        Some((event, InFlight(&self.in_flight)))
    }

    /// True when nothing is queued and no popped event is still being resolved
    fn is_idle(&self) -> bool {
        let queue = self.queue.lock();
        queue.is_empty() && self.in_flight.load(Ordering::Acquire) == 0
    }

    fn report(&self, errors: Vec<ActorError>) {
        if !errors.is_empty() {
            self.error_sink.report(&errors);
        }
    }

    /// One dispatch step; `None` if the queue was empty
    fn try_dispatch(&self) -> Option<Dispatch> {
        let (event, in_flight) = self.pop()?;
        let outcome = self.handle(&event);
        drop(in_flight);
        if self.config.trace {
            self.trace_sink.dispatched(&event);
        }
        Some(outcome)
    }

    fn handle(&self, event: &Event) -> Dispatch {
        let event_id = event.id();
        let actor_id = event.target().id();

        let actor = match self.actors.find(actor_id) {
            Some(actor) if event.target().belongs_to(self) => actor,
            _ => {
                warn!(event_id = %event_id, actor_id = %actor_id, "Dropping event for unknown actor");
                self.metrics.record_dropped();
                self.report(vec![ActorError::UnknownActor { actor: actor_id }]);
                return Dispatch::Dropped {
                    event: event_id,
                    actor: actor_id,
                };
            }
        };

        let Some(claim) = Claim::begin(&actor) else {
            debug!(event_id = %event_id, actor_id = %actor_id, "Actor busy, deferring event");
            self.metrics.record_deferral();
            self.enqueue(event.clone());
            return Dispatch::Deferred {
                event: event_id,
                actor: actor_id,
            };
        };

        if self.config.trace {
            self.trace_sink.dispatching(event);
        }

        let invocation = panic::catch_unwind(AssertUnwindSafe(|| actor.behavior().call(event)));
        if let Err(payload) = invocation {
            let message = panic_message(payload.as_ref());
            actor.record(|effect| {
                effect.signal(ActorError::Panicked {
                    actor: actor_id,
                    message,
                })
            });
        }

        match actor.finish().into_outcome() {
            EffectOutcome::Commit {
                replacement,
                events,
            } => {
                let became = replacement.is_some();
                let sent = events.len();
                let behavior = replacement.unwrap_or_else(|| actor.behavior().clone());
                self.queue.lock().extend(events);
                self.metrics.record_commit(sent);
                self.actors.publish(actor.successor(behavior));
                claim.keep();
                debug!(
                    event_id = %event_id,
                    actor_id = %actor_id,
                    sent,
                    became,
                    "Committed effect"
                );
                Dispatch::Committed {
                    event: event_id,
                    actor: actor_id,
                    sent,
                    became,
                }
            }
            EffectOutcome::Abort { errors } => {
                drop(claim);
                self.metrics.record_abort();
                warn!(
                    event_id = %event_id,
                    actor_id = %actor_id,
                    errors = errors.len(),
                    "Aborted effect"
                );
                let count = errors.len();
                self.report(errors);
                Dispatch::Aborted {
                    event: event_id,
                    actor: actor_id,
                    errors: count,
                }
            }
        }
    }
}

/// Counts one popped event as in flight until dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Busy claim on an actor; released on drop unless the handling committed
struct Claim<'a> {
    actor: &'a Actor,
    committed: bool,
}

impl<'a> Claim<'a> {
    fn begin(actor: &'a Actor) -> Option<Self> {
        actor.try_begin().then(|| Self {
            actor,
            committed: false,
        })
    }

    /// Leave the superseded actor busy for good
    fn keep(mut self) {
        self.committed = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.actor.release();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Builder for a [`Runtime`] with custom sinks or configuration
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    error_sink: Box<dyn ErrorSink>,
    trace_sink: Box<dyn TraceSink>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            error_sink: Box::new(ConsoleErrorSink),
            trace_sink: Box::new(ConsoleTrace),
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable trace notifications
    pub fn trace(mut self, enabled: bool) -> Self {
        self.config.trace = enabled;
        self
    }

    pub fn error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.error_sink = Box::new(sink);
        self
    }

    pub fn trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace_sink = Box::new(sink);
        self
    }

    pub fn build(self) -> Runtime {
        info!(
            trace = self.config.trace,
            workers = self.config.workers,
            error_sink = self.error_sink.name(),
            trace_sink = self.trace_sink.name(),
            "Creating actor runtime"
        );
        Runtime {
            state: Arc::new(RuntimeState {
                actors: ActorTable::new(),
                queue: Mutex::new(VecDeque::new()),
                in_flight: AtomicUsize::new(0),
                next_actor_id: IdCounter::new(),
                next_event_id: IdCounter::new(),
                config: self.config,
                error_sink: self.error_sink,
                trace_sink: self.trace_sink,
                metrics: RuntimeMetrics::default(),
            }),
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Actor registry, event queue and dispatch loop
#[derive(Clone)]
pub struct Runtime {
    state: Arc<RuntimeState>,
}

impl Runtime {
    /// Runtime with default configuration and sinks
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Register a new idle actor governed by `behavior`
    pub fn create(&self, behavior: impl Into<Behavior>) -> ActorRef {
        self.state.create(behavior.into())
    }

    /// Append an event for `target` to the queue tail
    pub fn send(&self, target: &ActorRef, message: impl Into<Message>) {
        let event = self.state.event(target.clone(), message.into());
        self.state.metrics.record_submitted();
        self.state.enqueue(event);
    }

    pub fn has_events(&self) -> bool {
        !self.state.queue.lock().is_empty()
    }

    pub fn pending_events(&self) -> usize {
        self.state.queue.lock().len()
    }

    /// Run one dispatch step
    ///
    /// On an empty queue this reports [`ActorError::EmptyQueue`] to the error
    /// sink and returns [`Dispatch::Empty`] without touching any actor.
    pub fn dispatch(&self) -> Dispatch {
        match self.state.try_dispatch() {
            Some(outcome) => outcome,
            None => {
                self.state.metrics.record_empty();
                self.state.report(vec![ActorError::EmptyQueue]);
                Dispatch::Empty
            }
        }
    }

    /// Dispatch on the calling thread until the queue is empty
    ///
    /// Returns the number of dispatch steps taken.
    pub fn run_until_idle(&self) -> usize {
        let mut steps = 0;
        while self.state.try_dispatch().is_some() {
            steps += 1;
        }
        steps
    }

    /// Dispatch on `workers` threads until the queue is drained
    ///
    /// Workers stop once the queue is empty and no handling is in flight.
    /// Returns the number of events whose behavior ran.
    pub fn run_workers(&self, workers: usize) -> Result<usize> {
        if workers == 0 {
            return Err(RuntimeError::InvalidConfig(
                "at least one dispatch worker is required".to_string(),
            ));
        }

        let handled = AtomicUsize::new(0);
        thread::scope(|scope| -> Result<()> {
            let mut handles = Vec::with_capacity(workers);
            for index in 0..workers {
                let name = format!("dispatch-{}", index);
                let handled = &handled;
                let handle = thread::Builder::new()
                    .name(name.clone())
                    .spawn_scoped(scope, move || self.worker_loop(handled))?;
                handles.push((name, handle));
            }
            let mut failed = None;
            for (name, handle) in handles {
                if handle.join().is_err() {
                    warn!(worker = %name, "Dispatch worker panicked");
                    failed.get_or_insert(name);
                }
            }
            match failed {
                Some(name) => Err(RuntimeError::WorkerPanicked(name)),
                None => Ok(()),
            }
        })?;

        let handled = handled.into_inner();
        debug!(workers, handled, "Dispatch workers finished");
        Ok(handled)
    }

    fn worker_loop(&self, handled: &AtomicUsize) {
        loop {
            match self.state.try_dispatch() {
                Some(outcome) if outcome.is_handled() => {
                    handled.fetch_add(1, Ordering::Relaxed);
                }
                // Busy target or dropped event; give the owning thread room to finish
                Some(_) => thread::yield_now(),
                None if self.state.is_idle() => break,
                None => thread::yield_now(),
            }
        }
    }

    /// Committed behavior of `actor`, if it is registered here
    pub fn behavior_of(&self, actor: &ActorRef) -> Option<Behavior> {
        if !actor.belongs_to(&self.state) {
            return None;
        }
        self.state
            .actors
            .find(actor.id())
            .map(|cell| cell.behavior().clone())
    }

    /// Whether `actor` is currently handling an event
    pub fn is_busy(&self, actor: &ActorRef) -> bool {
        if !actor.belongs_to(&self.state) {
            return false;
        }
        self.state
            .actors
            .find(actor.id())
            .is_some_and(|cell| cell.is_busy())
    }

    pub fn actor_count(&self) -> usize {
        self.state.actors.len()
    }

    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.state.actors.ids()
    }

    pub fn contains(&self, actor: &ActorRef) -> bool {
        actor.belongs_to(&self.state) && self.state.actors.contains(actor.id())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.state.config
    }

    pub fn stats(&self) -> RuntimeStats {
        self.state.metrics.snapshot()
    }

    /// Non-owning handle to the shared state, for references minted outside
    /// a `create` call
    #[cfg(test)]
    pub(crate) fn downgrade(&self) -> std::sync::Weak<RuntimeState> {
        Arc::downgrade(&self.state)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("actors", &self.actor_count())
            .field("pending_events", &self.pending_events())
            .field("config", &self.state.config)
            .field("error_sink", &self.state.error_sink.name())
            .field("trace_sink", &self.state.trace_sink.name())
            .finish()
    }
}
