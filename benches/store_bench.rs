use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use notes::{InMemoryNoteStore, Note, NoteStore};
use tokio::runtime::Runtime;

fn populated_store(rt: &Runtime, size: usize) -> InMemoryNoteStore {
    let store = InMemoryNoteStore::new();
    rt.block_on(async {
        for i in 0..size {
            let content = if i % 10 == 0 {
                format!("Welcome note number {i}")
            } else {
                format!("Ordinary note body {i}")
            };
            store
                .insert(Note::create(format!("Note {i}"), content))
                .await
                .expect("insert should succeed");
        }
    });
    store
}

/// Benchmark newest-first listing
fn bench_list_all(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("list_all");

    for size in [100, 1_000, 10_000] {
        let store = populated_store(&rt, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("in_memory_{size}"), |b| {
            b.iter(|| rt.block_on(store.list_all()).expect("list should succeed"));
        });
    }

    group.finish();
}

/// Benchmark case-insensitive substring search
fn bench_search(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("search");

    for size in [100, 1_000, 10_000] {
        let store = populated_store(&rt, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("in_memory_{size}"), |b| {
            b.iter(|| {
                rt.block_on(store.search(black_box("WELCOME")))
                    .expect("search should succeed")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_list_all, bench_search);
criterion_main!(benches);
