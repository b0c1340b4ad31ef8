#[macro_use]
extern crate criterion;
extern crate threaded_btree;

use criterion::{black_box, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use threaded_btree::Tree;

fn shuffled(num: usize) -> Vec<usize> {
    let mut values = (0..num).collect::<Vec<_>>();
    values.shuffle(&mut Pcg64::seed_from_u64(17));
    values
}

fn build(max_elements: usize, values: &[usize]) -> Tree<usize> {
    let mut tree = Tree::with_max_elements(max_elements).unwrap();
    tree.extend(values.iter().cloned());
    tree
}

pub fn insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let nums: Vec<usize> = vec![1_000, 10_000, 100_000];
    for num in nums {
        let values = shuffled(num);
        for &max_elements in &[4, 40] {
            group.bench_with_input(
                BenchmarkId::new(format!("Tree({})", max_elements), num),
                &values,
                |b, values| b.iter(|| build(max_elements, values)),
            );
        }
        group.bench_with_input(BenchmarkId::new("BTreeSet", num), &values, |b, values| {
            b.iter(|| values.iter().cloned().collect::<std::collections::BTreeSet<_>>())
        });
    }
}

pub fn find_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    let nums: Vec<usize> = vec![1_000, 10_000, 100_000];
    for num in nums {
        let values = shuffled(num);
        let tree = build(40, &values);
        group.bench_with_input(BenchmarkId::new("Tree(40)", num), &values, |b, values| {
            b.iter(|| {
                for value in values.iter().take(1_000) {
                    assert!(!tree.find(black_box(value)).is_end());
                }
            })
        });
    }
}

pub fn traversal_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    let nums: Vec<usize> = vec![1_000, 10_000, 100_000];
    for num in nums {
        let tree = build(40, &shuffled(num));
        group.bench_with_input(BenchmarkId::new("iter", num), &tree, |b, tree| {
            b.iter(|| tree.iter().sum::<usize>())
        });
        group.bench_with_input(BenchmarkId::new("clone", num), &tree, |b, tree| {
            b.iter(|| tree.clone())
        });
    }
}

criterion_group!(
    benches,
    insert_benchmark,
    find_benchmark,
    traversal_benchmark
);
criterion_main!(benches);
