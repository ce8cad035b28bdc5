//! Effect-Committing Actor Runtime
//!
//! Single-process actor substrate with one global event queue. Each actor
//! handles one event at a time, and everything a handling does (replace the
//! actor's behavior, send events, raise errors) is collected into an
//! [`Effect`] that is committed or discarded as a unit.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Runtime                          │
//! │                                                          │
//! │  send ──► ┌────────────────────┐   pop   ┌────────────┐  │
//! │           │  event queue (FIFO)│ ──────► │  dispatch  │  │
//! │           └────────────────────┘         └─────┬──────┘  │
//! │                     ▲                          │         │
//! │                     │ commit: append events    ▼         │
//! │                     │                  behavior(event)   │
//! │           ┌─────────┴──────────┐               │         │
//! │           │  actor table       │ ◄─────────────┘         │
//! │           │  id → Arc<Actor>   │  commit: swap successor │
//! │           └────────────────────┘  abort: report errors   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - **Atomic handling**: a handling that records any error leaves the
//!   actor's behavior unchanged and publishes none of its events.
//! - **Single writer per actor**: an atomic busy flag keeps concurrent
//!   dispatchers from handling the same actor twice at once.
//! - **Unique identifiers**: actor and event ids come from monotonic counters
//!   and are never reused.
//!
//! # Examples
//!
//! ```rust
//! use actor_runtime::{message, Behavior, Event, Runtime};
//!
//! fn print(event: &Event) {
//!     for word in event.message().strings() {
//!         println!("{}", word);
//!     }
//! }
//!
//! fn change(event: &Event) {
//!     let me = event.self_ref();
//!     for _ in 0..2 {
//!         me.send(&me, event.message().clone());
//!     }
//!     me.become_behavior(Behavior::named("print", print));
//!     for _ in 0..2 {
//!         me.send(&me, event.message().clone());
//!     }
//! }
//!
//! let runtime = Runtime::new();
//! let actor = runtime.create(Behavior::named("change", change));
//! runtime.send(&actor, message!["foo"]);
//!
//! while runtime.has_events() {
//!     runtime.dispatch();
//! }
//! assert_eq!(runtime.behavior_of(&actor).unwrap().name(), Some("print"));
//! ```

mod actor;
pub mod behavior;
pub mod config;
pub mod effect;
pub mod error;
pub mod event;
pub mod message;
pub mod metrics;
pub mod reference;
pub mod registry;
pub mod sink;
pub mod system;
pub mod test_utils;

pub use behavior::Behavior;
pub use config::RuntimeConfig;
pub use effect::{Effect, EffectOutcome};
pub use error::{ActorError, BoxError, Result, RuntimeError};
pub use event::{Event, EventId};
pub use message::{Message, Value};
pub use metrics::{RuntimeMetrics, RuntimeStats};
pub use reference::ActorRef;
pub use registry::ActorId;
pub use sink::{ConsoleErrorSink, ConsoleTrace, ErrorSink, LogErrorSink, TraceSink};
pub use system::{Dispatch, Runtime, RuntimeBuilder};
