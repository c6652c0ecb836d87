//! Store reconciliation benchmarks
//!
//! Measures the local cost of applying registry responses: namespace
//! switches, confirmed writes, and snapshots, against an in-memory registry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bridge_benchmarks::{criterion_config, InMemoryRegistry};
use bridge_core::types::{Namespace, ResourceFields, ResourceUpdate};
use bridge_store::Store;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build benchmark runtime")
}

fn bench_namespace_switch(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("select_namespace");

    for size in [100usize, 1_000, 10_000] {
        let store = Store::new(InMemoryRegistry::seeded(&["a", "b"], size));
        rt.block_on(store.initialize()).expect("initialize");

        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| {
                rt.block_on(async {
                    store.select_namespace(Namespace::new("a")).await.expect("select a");
                    store.select_namespace(Namespace::new("b")).await.expect("select b");
                });
                black_box(store.snapshot().epoch)
            })
        });
    }

    group.finish();
}

fn bench_confirmed_writes(c: &mut Criterion) {
    let rt = runtime();
    let store = Store::new(InMemoryRegistry::seeded(&["prod"], 1_000));
    rt.block_on(store.initialize()).expect("initialize");

    c.bench_function("add_then_delete", |b| {
        b.iter(|| {
            rt.block_on(async {
                let created = store
                    .add_resource(ResourceFields::new("bench-entry").arn("arn:bridge:bench"))
                    .await
                    .expect("add");
                store.delete_resource(&created.name).await.expect("delete");
            })
        })
    });

    c.bench_function("update_existing", |b| {
        b.iter(|| {
            rt.block_on(store.update_resource("db-00000", ResourceUpdate::default().value("v2")))
                .expect("update")
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let rt = runtime();
    let store = Store::new(InMemoryRegistry::seeded(&["prod"], 5_000));
    rt.block_on(store.initialize()).expect("initialize");

    c.bench_function("snapshot_5000", |b| b.iter(|| black_box(store.snapshot().resources.len())));
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_namespace_switch, bench_confirmed_writes, bench_snapshot
}
criterion_main!(benches);
