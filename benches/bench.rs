#![allow(missing_docs)]

use alloy_primitives::keccak256;
use criterion::{
    criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, Criterion,
};
use merkle_patricia_trie::{verify_proof, Trie};
use std::{hint::black_box, time::Duration};

/// Benchmarks building a trie and computing its root hash.
pub fn trie_root(c: &mut Criterion) {
    let counts = [100u64, 1000];

    let mut g = group(c, "trie_root");
    for count in counts {
        let data = entries(count);

        g.throughput(criterion::Throughput::Elements(count));
        let id = criterion::BenchmarkId::new("keys", count);
        g.bench_function(id, |b| {
            b.iter(|| {
                let mut trie = Trie::new();
                for (key, value) in &data {
                    trie.put(key, value.clone());
                }
                black_box(trie.root_hash())
            })
        });
    }
}

/// Benchmarks proving a key and verifying the proof.
pub fn prove_and_verify(c: &mut Criterion) {
    let counts = [100u64, 1000];

    let mut g = group(c, "prove_and_verify");
    for count in counts {
        let data = entries(count);
        let mut trie = Trie::new();
        for (key, value) in &data {
            trie.put(key, value.clone());
        }
        let root = trie.root_hash();
        let (target, _) = &data[data.len() / 2];

        g.throughput(criterion::Throughput::Elements(1));
        let id = criterion::BenchmarkId::new("keys", count);
        g.bench_function(id, |b| {
            b.iter(|| {
                let proof = trie.prove(target).unwrap();
                black_box(verify_proof(root, target, &proof).unwrap())
            })
        });
    }
}

fn entries(count: u64) -> Vec<([u8; 32], Vec<u8>)> {
    (0..count)
        .map(|i| (keccak256(i.to_be_bytes()).0, i.to_be_bytes().to_vec()))
        .collect()
}

fn group<'c>(c: &'c mut Criterion, name: &str) -> BenchmarkGroup<'c, WallTime> {
    let mut g = c.benchmark_group(name);
    g.warm_up_time(Duration::from_secs(1));
    g.noise_threshold(0.02);
    g
}

criterion_group!(benches, trie_root, prove_and_verify);
criterion_main!(benches);
