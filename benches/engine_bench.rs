//! TESSERA - Performance Benchmarks
//! Measures throughput of the skip list, memtable and bloom filter using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera::config::Config;
use tessera::engine::hash::hash;
use tessera::engine::{EntryIterator, Filter, MemTable, SkipList};
use tessera::types::Entry;

fn entries(n: usize) -> Vec<Entry> {
    (0..n)
        .map(|i| Entry::new(format!("key_{:06}", i), format!("value_{:06}", i)))
        .collect()
}

fn filled_list(n: usize) -> SkipList {
    let list = SkipList::new(1 << 20);
    for e in entries(n) {
        list.insert(&e);
    }
    list
}

fn bench_skiplist_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist");
    let batch = entries(1000);

    // Benchmark: Sequential inserts
    group.bench_function("insert_1000", |b| {
        b.iter(|| {
            let list = SkipList::new(1 << 20);
            for e in &batch {
                list.insert(black_box(e));
            }
        });
    });

    // Benchmark: Overwrites of existing keys
    group.bench_function("update_1000", |b| {
        let list = filled_list(1000);
        b.iter(|| {
            for e in &batch {
                list.insert(black_box(e));
            }
        });
    });

    // Benchmark: Point lookups
    group.bench_function("search_hit", |b| {
        let list = filled_list(1000);
        b.iter(|| {
            black_box(list.search(b"key_000500"));
        });
    });

    // Benchmark: Point lookup miss
    group.bench_function("search_miss", |b| {
        let list = filled_list(1000);
        b.iter(|| {
            black_box(list.search(b"nonexistent_key"));
        });
    });

    // Benchmark: Full iteration
    group.bench_function("iterate_1000", |b| {
        let list = filled_list(1000);
        b.iter(|| {
            black_box(list.new_iterator().entries().count());
        });
    });

    group.finish();
}

fn bench_bloom_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("bloom_filter");
    let keys: Vec<u32> = (0..1000)
        .map(|i| hash(format!("key_{:06}", i).as_bytes()))
        .collect();

    group.bench_function("build_1000", |b| {
        b.iter(|| {
            black_box(Filter::new(black_box(&keys), 10));
        });
    });

    let filter = Filter::new(&keys, 10);

    group.bench_function("lookup_hit", |b| {
        b.iter(|| {
            black_box(filter.may_contain_key(b"key_000500"));
        });
    });

    group.bench_function("lookup_miss", |b| {
        b.iter(|| {
            black_box(filter.may_contain_key(b"definitely_not_here"));
        });
    });

    group.bench_function("hash_16b", |b| {
        b.iter(|| {
            black_box(hash(black_box(b"0123456789abcdef")));
        });
    });

    group.finish();
}

fn bench_memtable_e2e(c: &mut Criterion) {
    let mut group = c.benchmark_group("memtable_e2e");

    for size in [100, 500, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("set_get_flush_cycle", size),
            size,
            |b, &size| {
                b.iter(|| {
                    let table = MemTable::new(Config::new(1 << 20)).unwrap();

                    for i in 0..size {
                        let key = format!("key_{:06}", i);
                        let value = format!("value_{:06}", i);
                        table.set(&Entry::new(key, value)).unwrap();
                    }

                    for i in 0..size {
                        let key = format!("key_{:06}", i);
                        black_box(table.get_value(key.as_bytes()));
                    }

                    black_box(table.build_filter());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_skiplist_operations,
    bench_bloom_filter,
    bench_memtable_e2e
);
criterion_main!(benches);
