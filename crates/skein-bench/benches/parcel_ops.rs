//! Criterion micro-benchmarks for parcel typed I/O and snapshots.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skein_bench::{mixed_parcel, read_mixed, sample_bundle};
use skein_parcel::{CreatorRegistry, Parcel};
use skein_test_utils::{fixture_registry, Account};

/// Benchmark: Write 1K mixed rows into a fresh parcel.
fn bench_write_mixed_1k(c: &mut Criterion) {
    c.bench_function("parcel_write_mixed_1k", |b| {
        b.iter(|| {
            let parcel = mixed_parcel(1_000).unwrap();
            black_box(parcel.data_size());
        });
    });
}

/// Benchmark: Read 1K mixed rows back through the span checks.
fn bench_read_mixed_1k(c: &mut Criterion) {
    let mut parcel = mixed_parcel(1_000).unwrap();

    c.bench_function("parcel_read_mixed_1k", |b| {
        b.iter(|| {
            black_box(read_mixed(&mut parcel, 1_000).unwrap());
        });
    });
}

/// Benchmark: Overwrite every int in place with a populated span table.
fn bench_overwrite_in_place(c: &mut Criterion) {
    let mut parcel = Parcel::new();
    for i in 0..1_000 {
        parcel.write_int(i).unwrap();
    }

    c.bench_function("parcel_overwrite_in_place_1k", |b| {
        b.iter(|| {
            parcel.set_data_position(0);
            for i in 0..1_000 {
                parcel.write_int(black_box(-i)).unwrap();
            }
        });
    });
}

/// Benchmark: Marshall 1K rows and unmarshall into a reused parcel.
fn bench_marshall_round_trip(c: &mut Criterion) {
    let parcel = mixed_parcel(1_000).unwrap();
    let mut target = Parcel::new();

    c.bench_function("parcel_marshall_unmarshall_1k", |b| {
        b.iter(|| {
            let bytes = parcel.marshall();
            target.unmarshall(&bytes, 0, bytes.len()).unwrap();
            black_box(target.data_size());
        });
    });
}

/// Benchmark: Write and read a 64-entry bundle.
fn bench_bundle_round_trip(c: &mut Criterion) {
    let bundle = sample_bundle(64);
    let registry = CreatorRegistry::new();

    c.bench_function("parcel_bundle_round_trip_64", |b| {
        b.iter(|| {
            let mut parcel = Parcel::new();
            parcel.write_bundle(Some(&bundle)).unwrap();
            parcel.set_data_position(0);
            black_box(parcel.read_bundle(&registry).unwrap());
        });
    });
}

/// Benchmark: Registry lookup plus construction of a tagged object.
fn bench_parcelable_lookup(c: &mut Criterion) {
    let registry = fixture_registry();
    let mut parcel = Parcel::new();
    for _ in 0..100 {
        parcel
            .write_parcelable(Some(&Account::new("bench", "skein")))
            .unwrap();
    }

    c.bench_function("parcel_read_parcelable_100", |b| {
        b.iter(|| {
            parcel.set_data_position(0);
            for _ in 0..100 {
                black_box(parcel.read_parcelable(&registry).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_write_mixed_1k,
    bench_read_mixed_1k,
    bench_overwrite_in_place,
    bench_marshall_round_trip,
    bench_bundle_round_trip,
    bench_parcelable_lookup
);
criterion_main!(benches);
