//! Criterion benchmarks for positional edits.
//!
//! Run with: cargo bench --bench tree_bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use treebuffer::Config;
use treebuffer::TreeBuffer;

fn content(size: usize) -> Vec<u8> {
    return (0..size).map(|i| b'a' + (i % 26) as u8).collect();
}

// =============================================================================
// Typing
// =============================================================================

fn bench_sequential_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_typing");

    for size in [1_000, 10_000, 100_000] {
        let text = content(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("TreeBuffer", size), &text, |b, text| {
            b.iter(|| {
                let mut buf: TreeBuffer<u8> = TreeBuffer::new();
                for (i, byte) in text.iter().enumerate() {
                    buf.insert(i, &[*byte]).unwrap();
                }
                black_box(buf.size())
            });
        });
        group.bench_with_input(BenchmarkId::new("Vec", size), &text, |b, text| {
            b.iter(|| {
                let mut buf: Vec<u8> = Vec::new();
                for (i, byte) in text.iter().enumerate() {
                    buf.insert(i, *byte);
                }
                black_box(buf.len())
            });
        });
    }
    group.finish();
}

fn bench_random_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_inserts");

    for size in [1_000, 10_000, 100_000] {
        let text = content(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("TreeBuffer", size), &text, |b, text| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                let mut buf: TreeBuffer<u8> = TreeBuffer::new();
                for byte in text.iter() {
                    let pos = rng.gen_range(0..=buf.size());
                    buf.insert(pos, &[*byte]).unwrap();
                }
                black_box(buf.size())
            });
        });
        group.bench_with_input(BenchmarkId::new("Vec", size), &text, |b, text| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                let mut buf: Vec<u8> = Vec::new();
                for byte in text.iter() {
                    let pos = rng.gen_range(0..=buf.len());
                    buf.insert(pos, *byte);
                }
                black_box(buf.len())
            });
        });
    }
    group.finish();
}

fn bench_bulk_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_insert");

    for size in [100_000, 200_000, 400_000] {
        let text = content(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("append", size), &text, |b, text| {
            b.iter(|| {
                let mut buf: TreeBuffer<u8> = TreeBuffer::with_config(Config::new(4, 16));
                buf.append(text);
                black_box(buf.size())
            });
        });
        group.bench_with_input(BenchmarkId::new("insert", size), &text, |b, text| {
            b.iter(|| {
                let mut buf: TreeBuffer<u8> = TreeBuffer::with_config(Config::new(4, 16));
                buf.append(b"[]");
                buf.insert(1, text).unwrap();
                black_box(buf.size())
            });
        });
    }
    group.finish();
}

// =============================================================================
// Removal
// =============================================================================

fn bench_random_removes(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_removes");

    for size in [10_000, 100_000, 1_000_000] {
        let text = content(size);
        group.throughput(Throughput::Elements(1_000));
        group.bench_with_input(BenchmarkId::new("TreeBuffer", size), &text, |b, text| {
            let base = TreeBuffer::from(&text[..]);
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                let mut buf = base.clone();
                for _ in 0..1_000 {
                    let from = rng.gen_range(0..buf.size());
                    let to = (from + rng.gen_range(1..16)).min(buf.size());
                    buf.remove(from, to).unwrap();
                }
                black_box(buf.size())
            });
        });
    }
    group.finish();
}

// =============================================================================
// Reads
// =============================================================================

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [10_000, 1_000_000] {
        let buf = TreeBuffer::from(&content(size)[..]);
        group.bench_with_input(BenchmarkId::new("at", size), &buf, |b, buf| {
            let mut rng = StdRng::seed_from_u64(3);
            b.iter(|| {
                let pos = rng.gen_range(0..buf.size());
                black_box(buf.at(pos).unwrap())
            });
        });
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("iter", size), &buf, |b, buf| {
            b.iter(|| black_box(buf.iter().fold(0u64, |acc, &x| acc + x as u64)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_typing,
    bench_random_inserts,
    bench_bulk_insert,
    bench_random_removes,
    bench_lookup,
);

criterion_main!(benches);
