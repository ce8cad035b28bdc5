//! Dispatch throughput benchmarks
//!
//! Measures the cost of one commit cycle and of draining a queue with
//! one versus several dispatch workers.

use actor_runtime::{message, Behavior, Event, Runtime};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn absorb(_event: &Event) {}

fn relay(event: &Event) {
    let Some(hops) = event.message().first().and_then(|v| v.as_int()) else {
        return;
    };
    if hops > 0 {
        let me = event.self_ref();
        me.send(&me, message![hops - 1]);
    }
}

fn bench_single_commit(c: &mut Criterion) {
    let runtime = Runtime::new();
    let actor = runtime.create(Behavior::named("absorb", absorb));

    c.bench_function("send_and_commit", |b| {
        b.iter(|| {
            runtime.send(&actor, message![criterion::black_box(1)]);
            criterion::black_box(runtime.dispatch())
        })
    });
}

fn bench_relay_chain(c: &mut Criterion) {
    c.bench_function("relay_chain_1000_hops", |b| {
        b.iter(|| {
            let runtime = Runtime::new();
            let actor = runtime.create(Behavior::named("relay", relay));
            runtime.send(&actor, message![1000]);
            criterion::black_box(runtime.run_until_idle())
        })
    });
}

fn bench_worker_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_64_actors");
    for workers in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.iter(|| {
                let runtime = Runtime::new();
                for _ in 0..64 {
                    let actor = runtime.create(Behavior::named("relay", relay));
                    runtime.send(&actor, message![50]);
                }
                criterion::black_box(runtime.run_workers(workers).unwrap_or_default())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_commit, bench_relay_chain, bench_worker_fanout);
criterion_main!(benches);
