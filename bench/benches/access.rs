use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use mimalloc::MiMalloc;
use na_vpack::{Builder, SharedSlice, Value};
use std::hint::black_box;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn document(keys: usize) -> SharedSlice {
    let mut builder = Builder::new();
    builder.open_object().unwrap();
    for i in 0..keys {
        builder.add_key(&format!("key{i:04}")).unwrap();
        builder.open_array().unwrap();
        builder.add(Value::Int(i as i64)).unwrap();
        builder.add(Value::String("payload")).unwrap();
        builder.close().unwrap();
    }
    builder.close().unwrap();
    builder.into_shared_slice().unwrap()
}

fn lookup(c: &mut Criterion) {
    let shared = document(1000);
    let mut group = c.benchmark_group("lookup");
    group.bench_function("slice", |b| {
        let slice = shared.slice();
        b.iter(|| slice.get(black_box("key0500")).unwrap());
    });
    group.bench_function("shared", |b| {
        b.iter(|| shared.get(black_box("key0500")).unwrap());
    });
}

fn iterate(c: &mut Criterion) {
    let shared = document(1000);
    let mut group = c.benchmark_group("iterate");
    group.bench_function("slice", |b| {
        let slice = shared.slice();
        b.iter(|| {
            slice
                .object_iter()
                .unwrap()
                .map(|pair| pair.unwrap().1.at(0).unwrap().get_int().unwrap())
                .sum::<i64>()
        });
    });
    group.bench_function("shared", |b| {
        b.iter(|| {
            shared
                .object_iter()
                .unwrap()
                .map(|pair| pair.unwrap().value.at(0).unwrap().get_int().unwrap())
                .sum::<i64>()
        });
    });
}

fn handles(c: &mut Criterion) {
    let shared = document(10);
    let mut group = c.benchmark_group("handles");
    group.bench_function("clone", |b| {
        b.iter(|| black_box(&shared).clone());
    });
    group.bench_function("string_payload", |b| {
        let value = shared.get("key0003").unwrap().unwrap().at(1).unwrap();
        b.iter(|| value.get_string().unwrap());
    });
    group.bench_function("take", |b| {
        b.iter_batched(
            || shared.clone(),
            |mut handle| handle.take(),
            BatchSize::SmallInput,
        );
    });
}

fn build(c: &mut Criterion) {
    c.bench_function("build_1000", |b| b.iter(|| document(black_box(1000))));
}

criterion_group!(benches, lookup, iterate, handles, build);
criterion_main!(benches);
