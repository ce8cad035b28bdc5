//! Dispatch semantics: atomic commit, single become, ordering, deferral and
//! empty dispatch, driven on a single thread.

use actor_runtime::test_utils::ErrorCollector;
use actor_runtime::{message, ActorError, Behavior, Dispatch, Event, Runtime, Value};
use parking_lot::Mutex;
use std::sync::Arc;

fn idle(_event: &Event) {}

fn runtime_with(errors: &ErrorCollector) -> Runtime {
    Runtime::builder().error_sink(errors.clone()).build()
}

/// Shared log of `(label, first message value)` pairs
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<(String, i64)>>>);

impl Journal {
    fn recorder(&self, label: &str) -> Behavior {
        let journal = self.clone();
        let label = label.to_string();
        Behavior::named(label.clone(), move |event: &Event| {
            let value = event.message().first().and_then(Value::as_int).unwrap_or(-1);
            journal.0.lock().push((label.clone(), value));
        })
    }

    fn entries(&self) -> Vec<(String, i64)> {
        self.0.lock().clone()
    }
}

#[test]
fn test_signal_rolls_back_become_and_sends() {
    let errors = ErrorCollector::new();
    let runtime = runtime_with(&errors);
    let journal = Journal::default();
    let observer = runtime.create(journal.recorder("observer"));

    let original = Behavior::named("original", {
        let observer = observer.clone();
        move |event: &Event| {
            let me = event.self_ref();
            me.send(&observer, message![1]);
            me.become_behavior(Behavior::named("replacement", idle));
            me.send(&me, message![2]);
            me.signal("refusing this message");
        }
    });
    let actor = runtime.create(original.clone());

    runtime.send(&actor, message!["go"]);
    let outcome = runtime.dispatch();

    assert!(matches!(outcome, Dispatch::Aborted { errors: 1, .. }));
    assert!(runtime.behavior_of(&actor).unwrap().same_as(&original));
    assert!(!runtime.has_events());
    assert!(!runtime.is_busy(&actor));
    assert!(journal.entries().is_empty());
    assert_eq!(errors.messages(), vec![format!("actor {}: refusing this message", actor.id())]);
}

#[test]
fn test_errors_reported_in_call_order() {
    let errors = ErrorCollector::new();
    let runtime = runtime_with(&errors);
    let actor = runtime.create(|event: &Event| {
        let me = event.self_ref();
        me.signal("first");
        me.become_behavior(idle);
        me.become_behavior(idle);
        me.signal("last");
    });

    runtime.send(&actor, message![]);
    runtime.dispatch();

    let reported = errors.take();
    assert_eq!(errors.reports(), 1);
    assert_eq!(reported.len(), 3);
    assert!(reported[0].to_string().ends_with("first"));
    assert!(matches!(reported[1], ActorError::DuplicateBecome { .. }));
    assert!(reported[2].to_string().ends_with("last"));
}

#[test]
fn test_double_become_keeps_original_behavior() {
    let errors = ErrorCollector::new();
    let runtime = runtime_with(&errors);
    let original = Behavior::named("original", |event: &Event| {
        let me = event.self_ref();
        me.become_behavior(Behavior::named("first", idle));
        me.become_behavior(Behavior::named("second", idle));
    });
    let actor = runtime.create(original.clone());

    runtime.send(&actor, message![]);
    assert!(runtime.dispatch().is_aborted());

    let current = runtime.behavior_of(&actor).unwrap();
    assert!(current.same_as(&original));
    assert_eq!(current.name(), Some("original"));

    let reported = errors.take();
    assert_eq!(reported.len(), 1);
    assert!(matches!(
        reported[0],
        ActorError::DuplicateBecome { actor: id } if id == actor.id()
    ));
}

#[test]
fn test_commit_appends_events_in_order() {
    let runtime = Runtime::new();
    let journal = Journal::default();
    let sink = runtime.create(journal.recorder("sink"));

    let fanout = runtime.create({
        let sink = sink.clone();
        move |event: &Event| {
            let me = event.self_ref();
            for n in 1..=3 {
                me.send(&sink, message![n]);
            }
        }
    });

    runtime.send(&fanout, message![]);
    assert!(matches!(runtime.dispatch(), Dispatch::Committed { sent: 3, became: false, .. }));
    assert_eq!(runtime.pending_events(), 3);

    runtime.run_until_idle();
    let values: Vec<i64> = journal.entries().into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_events_to_free_actor_dispatch_in_submission_order() {
    let runtime = Runtime::new();
    let journal = Journal::default();
    let actor = runtime.create(journal.recorder("a"));

    for n in 1..=3 {
        runtime.send(&actor, message![n]);
    }
    assert_eq!(runtime.run_until_idle(), 3);

    let values: Vec<i64> = journal.entries().into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_busy_target_event_moves_to_tail() {
    let runtime = Runtime::new();
    let journal = Journal::default();
    let other = runtime.create(journal.recorder("other"));

    // While handling its first event, the actor dispatches once more; the
    // next queued event targets the actor itself and must be deferred.
    let nested: Arc<Mutex<Vec<Dispatch>>> = Arc::default();
    let actor = runtime.create({
        let runtime = runtime.clone();
        let journal = journal.clone();
        let nested = Arc::clone(&nested);
        move |event: &Event| {
            let value = event.message().first().and_then(Value::as_int).unwrap_or(-1);
            journal.0.lock().push(("actor".to_string(), value));
            if value == 1 {
                nested.lock().push(runtime.dispatch());
            }
        }
    });

    runtime.send(&actor, message![1]);
    runtime.send(&actor, message![2]);
    runtime.send(&other, message![3]);

    assert!(runtime.dispatch().is_committed());

    let nested = nested.lock().clone();
    assert_eq!(nested.len(), 1);
    assert!(nested[0].is_deferred());
    assert_eq!(runtime.pending_events(), 2);
    assert_eq!(runtime.stats().deferrals, 1);

    runtime.run_until_idle();
    assert_eq!(
        journal.entries(),
        vec![
            ("actor".to_string(), 1),
            ("other".to_string(), 3),
            ("actor".to_string(), 2),
        ]
    );
}

#[test]
fn test_deferred_event_keeps_identity() {
    let runtime = Runtime::new();
    let seen: Arc<Mutex<Vec<u64>>> = Arc::default();
    let nested: Arc<Mutex<Option<Dispatch>>> = Arc::default();

    let actor = runtime.create({
        let runtime = runtime.clone();
        let seen = Arc::clone(&seen);
        let nested = Arc::clone(&nested);
        move |event: &Event| {
            seen.lock().push(event.id().as_u64());
            let mut slot = nested.lock();
            if slot.is_none() {
                *slot = Some(runtime.dispatch());
            }
        }
    });

    runtime.send(&actor, message!["a"]);
    runtime.send(&actor, message!["b"]);
    runtime.run_until_idle();

    let deferred = nested.lock().expect("nested dispatch ran");
    assert!(deferred.is_deferred());
    assert_eq!(deferred.event().map(|id| id.as_u64()), Some(2));
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn test_empty_dispatch_leaves_table_unchanged() {
    let errors = ErrorCollector::new();
    let runtime = runtime_with(&errors);
    let a = runtime.create(Behavior::named("a", idle));
    let b = runtime.create(Behavior::named("b", idle));
    let before = runtime.actor_ids();

    assert_eq!(runtime.dispatch(), Dispatch::Empty);

    assert_eq!(errors.reports(), 1);
    assert!(matches!(errors.take().as_slice(), [ActorError::EmptyQueue]));
    assert_eq!(runtime.actor_ids(), before);
    assert_eq!(runtime.behavior_of(&a).unwrap().name(), Some("a"));
    assert_eq!(runtime.behavior_of(&b).unwrap().name(), Some("b"));
}

#[test]
fn test_aborted_actor_accepts_later_events() {
    let errors = ErrorCollector::new();
    let runtime = runtime_with(&errors);
    let journal = Journal::default();
    let actor = runtime.create({
        let journal = journal.clone();
        move |event: &Event| {
            let value = event.message().first().and_then(Value::as_int).unwrap_or(-1);
            if value < 0 {
                event.self_ref().signal("negative");
                return;
            }
            journal.0.lock().push(("actor".to_string(), value));
        }
    });

    runtime.send(&actor, message![-1]);
    runtime.send(&actor, message![7]);
    runtime.run_until_idle();

    assert_eq!(journal.entries(), vec![("actor".to_string(), 7)]);
    assert_eq!(errors.len(), 1);
    let stats = runtime.stats();
    assert_eq!(stats.aborts, 1);
    assert_eq!(stats.commits, 1);
}

#[test]
fn test_create_inside_handling_is_immediate() {
    let runtime = Runtime::new();
    let journal = Journal::default();
    let spawner = runtime.create({
        let recorder = journal.recorder("child");
        move |event: &Event| {
            let me = event.self_ref();
            if let Some(child) = me.create(recorder.clone()) {
                me.send(&child, message![42]);
            }
        }
    });

    runtime.send(&spawner, message![]);
    runtime.dispatch();
    assert_eq!(runtime.actor_count(), 2);

    runtime.run_until_idle();
    assert_eq!(journal.entries(), vec![("child".to_string(), 42)]);
}

#[test]
fn test_references_travel_in_messages() {
    let runtime = Runtime::new();
    let journal = Journal::default();
    let listener = runtime.create(journal.recorder("listener"));

    let replier = runtime.create(|event: &Event| {
        if let Some(reply_to) = event.message().first().and_then(Value::as_actor) {
            event.self_ref().send(reply_to, message![99]);
        }
    });

    runtime.send(&replier, message![&listener]);
    runtime.run_until_idle();
    assert_eq!(journal.entries(), vec![("listener".to_string(), 99)]);
}
