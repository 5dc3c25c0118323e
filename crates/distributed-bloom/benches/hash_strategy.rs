//! # Distributed Bloom Benchmarks
//!
//! - Index derivation: one 128-bit hash plus O(k) arithmetic per element
//! - Filter operations: O(k) store round-trips, measured against the
//!   in-memory store so only client overhead shows up
//! - Adversarial inputs sharing a long common prefix

use std::sync::Arc;
use std::time::Duration;

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use distributed_bloom::domain::{murmur_hash128, optimal_num_of_bits};
use distributed_bloom::{
    DistributedBloomFilter, FilterConfig, FilterIdentity, HashStrategy, InMemoryBitStore,
    StringFunnel,
};
use rand::Rng;
use tokio::runtime::Runtime;

/// Random 20-byte account identifiers
fn generate_elements(count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut element = vec![0u8; 20];
            rng.fill(&mut element[..]);
            element
        })
        .collect()
}

/// Elements differing only in their last four bytes
fn generate_adversarial_elements(count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    let prefix: [u8; 16] = rng.gen();

    (0..count)
        .map(|i| {
            let mut element = vec![0u8; 20];
            element[..16].copy_from_slice(&prefix);
            element[16..20].copy_from_slice(&(i as u32).to_le_bytes());
            element
        })
        .collect()
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn bench_index_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("distributed-bloom/indices");
    group.measurement_time(Duration::from_secs(5));

    let element = generate_elements(1).remove(0);
    group.bench_function("murmur3_x64_128", |b| {
        b.iter(|| murmur_hash128(black_box(&element)))
    });

    for strategy in [HashStrategy::Murmur128Mitz32, HashStrategy::Murmur128Mitz64] {
        for k in [4usize, 7, 13] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", strategy), k),
                &k,
                |b, &k| b.iter(|| strategy.bit_indices(black_box(&element), k, 1 << 20)),
            );
        }
    }

    let adversarial = generate_adversarial_elements(1000);
    group.throughput(Throughput::Elements(1000));
    group.bench_function("adversarial_prefix_1000", |b| {
        b.iter(|| {
            for element in &adversarial {
                black_box(HashStrategy::Murmur128Mitz64.bit_indices(element, 7, 1 << 20));
            }
        })
    });

    group.finish();
}

fn bench_filter_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("distributed-bloom/filter");
    group.measurement_time(Duration::from_secs(5));

    let rt = runtime();
    let bits = optimal_num_of_bits(10_000, 0.01);
    let filter = rt
        .block_on(DistributedBloomFilter::<str, _, _>::new(
            Arc::new(InMemoryBitStore::new()),
            FilterIdentity::new("bench", "filter").unwrap(),
            FilterConfig::new(7, bits).unwrap(),
            StringFunnel,
        ))
        .unwrap();

    let elements: Vec<String> = (0..1000).map(|i| format!("element-{}", i)).collect();

    group.throughput(Throughput::Elements(elements.len() as u64));
    group.bench_function("put_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                for element in &elements {
                    black_box(filter.put(element).await.unwrap());
                }
            })
        })
    });

    group.bench_function("might_contain_1000_present", |b| {
        b.iter(|| {
            rt.block_on(async {
                for element in &elements {
                    black_box(filter.might_contain(element).await.unwrap());
                }
            })
        })
    });

    let absent: Vec<String> = (0..1000).map(|i| format!("absent-{}", i)).collect();
    group.bench_function("might_contain_1000_absent", |b| {
        b.iter(|| {
            rt.block_on(async {
                for element in &absent {
                    black_box(filter.might_contain(element).await.unwrap());
                }
            })
        })
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = bench_index_derivation, bench_filter_operations
);
criterion_main!(benches);
