use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use seqflake::{
    DefaultSequencer, GlobalSequencer, Sequencer, SequencerConfig, SnowflakeExt, SystemClock,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

fn fixed_clock() -> u64 {
    1
}

// Number of IDs generated per benchmark iteration (split across threads for
// contended runs). One full millisecond of a single machine's sequence
// space, so a fixed clock never has to advance.
const TOTAL_IDS: usize = 4096;

/// Benchmarks one caller pulling IDs one at a time.
fn bench_sequencer<G>(c: &mut Criterion, group_name: &str, sequencer_factory: impl Fn() -> G)
where
    G: Sequencer,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let sequencer = sequencer_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(sequencer.next_sequence().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one caller taking all IDs in a single batch.
fn bench_sequencer_batch<G>(c: &mut Criterion, group_name: &str, sequencer_factory: impl Fn() -> G)
where
    G: Sequencer,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let sequencer = sequencer_factory();
                for id in sequencer.next_ids(TOTAL_IDS).unwrap() {
                    black_box(id.unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a shared sequencer across threads.
fn bench_sequencer_contended<G>(
    c: &mut Criterion,
    group_name: &str,
    sequencer_factory: impl Fn() -> G,
) where
    G: Sequencer + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{TOTAL_IDS}/threads/{thread_count}"),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let sequencer = Arc::new(sequencer_factory());
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let sequencer = Arc::clone(&sequencer);
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(sequencer.next_sequence().unwrap());
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

// --- Fixed clock ---
fn benchmark_mock_sequential_default(c: &mut Criterion) {
    bench_sequencer(c, "mock/sequential/default", || {
        DefaultSequencer::new(1, fixed_clock)
    });
}

fn benchmark_mock_sequential_global(c: &mut Criterion) {
    bench_sequencer(c, "mock/sequential/global", || GlobalSequencer::new(fixed_clock));
}

fn benchmark_mock_batch_default(c: &mut Criterion) {
    bench_sequencer_batch(c, "mock/batch/default", || {
        DefaultSequencer::new(1, fixed_clock)
    });
}

fn benchmark_mock_batch_global(c: &mut Criterion) {
    bench_sequencer_batch(c, "mock/batch/global", || GlobalSequencer::new(fixed_clock));
}

fn benchmark_mock_contended_default(c: &mut Criterion) {
    bench_sequencer_contended(c, "mock/contended/default", || {
        DefaultSequencer::new(1, fixed_clock)
    });
}

fn benchmark_mock_contended_global(c: &mut Criterion) {
    bench_sequencer_contended(c, "mock/contended/global", || {
        GlobalSequencer::new(fixed_clock)
    });
}

// --- System clock (may wait for the next millisecond) ---
fn benchmark_system_sequential_default(c: &mut Criterion) {
    bench_sequencer(c, "system/sequential/default", || {
        DefaultSequencer::new(1, SystemClock::default())
    });
}

fn benchmark_system_contended_default(c: &mut Criterion) {
    bench_sequencer_contended(c, "system/contended/default", || {
        DefaultSequencer::with_config(1, SystemClock::default(), SequencerConfig::default())
    });
}

fn benchmark_system_contended_global(c: &mut Criterion) {
    bench_sequencer_contended(c, "system/contended/global", || {
        GlobalSequencer::new(SystemClock::default())
    });
}

criterion_group!(
    benches,
    // Fixed clock
    benchmark_mock_sequential_default,
    benchmark_mock_sequential_global,
    benchmark_mock_batch_default,
    benchmark_mock_batch_global,
    benchmark_mock_contended_default,
    benchmark_mock_contended_global,
    // System clock
    benchmark_system_sequential_default,
    benchmark_system_contended_default,
    benchmark_system_contended_global,
);
criterion_main!(benches);
