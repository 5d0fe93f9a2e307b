//! Basic benchmarks for the `ring_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use many_cpus::ProcessorSet;
use new_zealand::nz;
use par_bench::{Run, ThreadPool};
use ring_pool::RingPool;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

static FOUR_PROCESSORS: LazyLock<Option<ProcessorSet>> =
    LazyLock::new(|| ProcessorSet::builder().take(nz!(4)));

type TestItem = [u8; 64];
const CAPACITY: usize = 64;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("rp_basic");

    let allocs_op = allocs.operation("rent_empty");
    group.bench_function("rent_empty", |b| {
        let pool = RingPool::<TestItem>::new(CAPACITY).unwrap();

        b.iter_custom(|iters| {
            let _span = allocs_op.measure_process().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.try_rent());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("return_then_rent");
    group.bench_function("return_then_rent", |b| {
        let pool = RingPool::<TestItem>::new(CAPACITY).unwrap();
        let mut item = Some(Box::new([0; 64]));

        b.iter_custom(|iters| {
            let _span = allocs_op.measure_process().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                pool.return_item(black_box(item.take().unwrap()));
                item = pool.try_rent();
            }

            start.elapsed()
        });
    });

    group.bench_function("return_full", |b| {
        let pool = RingPool::<TestItem>::new(1).unwrap();
        pool.return_item(Box::new([0; 64]));

        b.iter_custom(|iters| {
            let items = (0..iters).map(|_| Box::new([1; 64])).collect::<Vec<_>>();

            let start = Instant::now();

            for item in items {
                pool.return_item(black_box(item));
            }

            start.elapsed()
        });
    });

    group.finish();

    contended(c);

    allocs.print_to_stdout();
}

fn contended(c: &mut Criterion) {
    let Some(four_threads) = FOUR_PROCESSORS.as_ref().map(ThreadPool::new) else {
        return;
    };

    let mut group = c.benchmark_group("rp_basic::four-threaded");

    let pool = Arc::new(RingPool::<TestItem>::new(CAPACITY).unwrap());

    Run::new()
        .prepare_thread(|_| Arc::clone(&pool))
        .iter(|args| {
            let pool = args.thread_state();

            let item = pool.rent_or_else(|| [0; 64]);
            pool.return_item(black_box(item));
        })
        .execute_criterion_on(&four_threads, &mut group, "rent_then_return");

    group.finish();
}
