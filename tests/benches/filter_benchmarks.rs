//! # Loaded Filter Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | `LoadedFileFilter::might_contain` | < 1µs |
//! | `FilterManager::is_result_set_empty` (50 files) | < 10µs |
//! | No-op refresh (50 files) | < 1ms |
//! | Cold build of one 10k-subject file | < 10ms |

use std::time::Duration;

use bfd_loaded_filters::domain::store_fetchers;
use bfd_loaded_filters::{build_new_filters, FilterManager, InMemoryBatchStore, LoadedBatchStore};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{DateRange, LoadedBatch, LoadedFile, Timestamp};

fn at(secs: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + ChronoDuration::seconds(secs)
}

/// `files` files, each with `batches` batches of `subjects` random subjects.
fn seeded_store(files: i64, batches: i64, subjects: usize) -> InMemoryBatchStore {
    let mut rng = rand::thread_rng();
    let store = InMemoryBatchStore::new();
    let mut batch_id = 0;
    for file_id in 1..=files {
        let base = file_id * 1_000;
        store.insert_file(LoadedFile::new(file_id, "BENEFICIARY", at(base)));
        for b in 0..batches {
            batch_id += 1;
            let ids = (0..subjects)
                .map(|_| format!("{}", -rng.gen_range(0..100_000_000i64)))
                .collect();
            store.insert_batch(LoadedBatch::new(batch_id, file_id, ids, at(base + b + 1)));
        }
    }
    store
}

fn bench_might_contain(c: &mut Criterion) {
    let mut group = c.benchmark_group("loaded-file-filter");

    let store = seeded_store(1, 10, 1_000);
    let tuples = store.fetch_all_filter_tuples().unwrap();
    let filters = build_new_filters(&tuples, &store_fetchers(&store), 0.01).unwrap();
    let filter = &filters[0];

    group.bench_function("might_contain_random", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let subject = format!("{}", -rng.gen_range(0..100_000_000i64));
            black_box(filter.might_contain(&subject))
        })
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter-build");
    group.measurement_time(Duration::from_secs(10));

    for subjects in [100usize, 1_000, 10_000] {
        let store = seeded_store(1, 1, subjects);
        let tuples = store.fetch_all_filter_tuples().unwrap();
        group.throughput(Throughput::Elements(subjects as u64));
        group.bench_with_input(BenchmarkId::new("cold_build", subjects), &subjects, |b, _| {
            b.iter(|| black_box(build_new_filters(&tuples, &store_fetchers(&store), 0.01).unwrap()))
        });
    }

    group.finish();
}

fn bench_manager(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter-manager");

    let store = seeded_store(50, 4, 200);
    let manager = FilterManager::default();
    manager.refresh_as_of(&store, at(100_000)).unwrap();

    let recent = DateRange::between(at(45_000), at(100_000));
    let everything = DateRange::until(at(100_000));

    group.bench_function("is_result_set_empty_recent", |b| {
        b.iter(|| black_box(manager.is_result_set_empty("1", &recent)))
    });

    group.bench_function("is_result_set_empty_all_files", |b| {
        b.iter(|| black_box(manager.is_result_set_empty("1", &everything)))
    });

    group.bench_function("noop_refresh", |b| {
        b.iter(|| black_box(manager.refresh_as_of(&store, at(100_000)).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_might_contain, bench_build, bench_manager);
criterion_main!(benches);
