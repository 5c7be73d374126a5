//! Benchmarks for the CPU-bound stages of registration
//!
//! Key derivation dominates: PBKDF2 runs 100 000 iterations per call, so
//! `encrypt` is measured both end to end and with a pre-derived key.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use storyproof::crypto::{encrypt, DerivedKey};
use storyproof::hashing::{commitment, digest};

const SIZES: [usize; 3] = [1024, 64 * 1024, 1024 * 1024];

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    for size in SIZES {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| digest(black_box(data)))
        });
    }
    group.finish();
}

fn bench_commitment(c: &mut Criterion) {
    let address = digest(b"hello");
    c.bench_function("commitment", |b| {
        b.iter(|| commitment(black_box(&address), black_box("0xabc")))
    });
}

fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_derivation");
    group.sample_size(10);
    group.bench_function("pbkdf2", |b| b.iter(|| DerivedKey::derive(black_box("0xabc"))));
    group.finish();
}

fn bench_seal(c: &mut Criterion) {
    let key = DerivedKey::derive("0xabc");
    let mut group = c.benchmark_group("seal");
    for size in SIZES {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| key.seal(black_box(data)).unwrap())
        });
    }
    group.finish();
}

fn bench_encrypt(c: &mut Criterion) {
    let data = vec![0x5Au8; 64 * 1024];
    let mut group = c.benchmark_group("encrypt");
    group.sample_size(10);
    group.bench_function("64KiB", |b| {
        b.iter(|| encrypt(black_box(&data), black_box("0xabc")).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_digest,
    bench_commitment,
    bench_key_derivation,
    bench_seal,
    bench_encrypt
);
criterion_main!(benches);
