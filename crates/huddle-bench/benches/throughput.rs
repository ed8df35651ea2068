//! Throughput benchmarks for Huddle.
//!
//! Measures the draft store under contention and hub fan-out.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use huddle_bench::catalog_of;
use huddle_core::{DraftEvent, DraftStateStore, HubConfig, NotificationHub};
use std::time::Instant;

const PLAYERS: u64 = 1000;

/// Draft every player once from a single thread.
fn bench_store_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let catalog = catalog_of(PLAYERS);

    group.throughput(Throughput::Elements(PLAYERS));
    group.bench_function("draft_all_sequential", |b| {
        b.iter_batched(
            || DraftStateStore::new(catalog.clone()),
            |store| {
                for id in 1..=PLAYERS {
                    let _ = black_box(store.attempt_draft(id));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("list_available_half_drafted", |b| {
        let store = DraftStateStore::new(catalog.clone());
        for id in (1..=PLAYERS).step_by(2) {
            let _ = store.attempt_draft(id);
        }
        b.iter(|| black_box(store.list_available()));
    });

    group.finish();
}

/// Several threads race to draft the same players.
fn bench_store_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");
    let catalog = catalog_of(PLAYERS);

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements(PLAYERS * threads as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &threads| {
                b.iter_batched(
                    || DraftStateStore::new(catalog.clone()),
                    |store| {
                        std::thread::scope(|s| {
                            for _ in 0..threads {
                                s.spawn(|| {
                                    for id in 1..=PLAYERS {
                                        let _ = store.attempt_draft(id);
                                    }
                                });
                            }
                        });
                        assert_eq!(store.drafted_count(), PLAYERS as usize);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Publish one event to many observers and drain every queue.
fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");

    for size in [1usize, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_custom(|iters| {
                let hub = NotificationHub::with_config(HubConfig { observer_buffer: 16 });
                let mut subs: Vec<_> = (0..size).map(|_| hub.subscribe()).collect();

                let start = Instant::now();
                for i in 0..iters {
                    let report = hub.publish(&DraftEvent::new(i % PLAYERS, i));
                    debug_assert_eq!(report.dropped, 0);
                    for sub in &mut subs {
                        black_box(sub.try_recv());
                    }
                }
                start.elapsed()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_store_sequential,
    bench_store_contention,
    bench_fanout,
);
criterion_main!(benches);
