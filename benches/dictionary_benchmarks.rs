//! Construction and lookup benchmarks across the dictionary backends.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lexitrie::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

fn random_words(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut words = BTreeSet::new();
    while words.len() < count {
        let len = rng.gen_range(3..12);
        let word: String = (0..len)
            .map(|_| rng.gen_range(b'a'..=b'z') as char)
            .collect();
        words.insert(word);
    }
    words.into_iter().collect()
}

fn bench_construction(c: &mut Criterion) {
    let words = random_words(10_000, 42);

    let mut group = c.benchmark_group("construction");
    group.bench_function("dawg_10k", |b| {
        b.iter(|| {
            let mut builder = DawgBuilder::new();
            for (i, word) in words.iter().enumerate() {
                builder.insert(word.as_bytes(), i as i32 + 1).unwrap();
            }
            black_box(builder.build())
        })
    });
    group.bench_function("double_array_10k", |b| {
        b.iter(|| {
            let mut builder = DoubleArrayTrieBuilder::new();
            for (i, word) in words.iter().enumerate() {
                builder.insert(word.as_bytes(), i as i32 + 1).unwrap();
            }
            black_box(builder.build())
        })
    });
    group.finish();
}

fn bench_traversal(c: &mut Criterion) {
    let words = random_words(10_000, 42);
    let probes: Vec<&String> = words.iter().step_by(100).collect();

    let mut dawg_builder = DawgBuilder::new();
    let mut trie_builder = DoubleArrayTrieBuilder::new();
    for (i, word) in words.iter().enumerate() {
        dawg_builder.insert(word.as_bytes(), i as i32 + 1).unwrap();
        trie_builder.insert(word.as_bytes(), i as i32 + 1).unwrap();
    }
    let dawg = dawg_builder.build();
    let trie = trie_builder.build();

    let mut bytes = Vec::new();
    trie.save(&mut bytes, &CompactSerializer).unwrap();
    let loaded = CompactDoubleArrayTrie::load(&bytes[..]).unwrap();

    let mut group = c.benchmark_group("traversal");
    group.bench_function("dawg", |b| {
        b.iter(|| {
            for word in &probes {
                black_box(dawg.traverse(word.as_bytes()));
            }
        })
    });
    group.bench_function("double_array", |b| {
        b.iter(|| {
            for word in &probes {
                black_box(trie.traverse(word.as_bytes()));
            }
        })
    });
    group.bench_function("packed", |b| {
        b.iter(|| {
            for word in &probes {
                black_box(loaded.traverse(word.as_bytes()));
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_construction, bench_traversal);
criterion_main!(benches);
