use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use avl_index::{Lexicographic, Tree};

fn key(k: u32) -> [u8; 4] {
    k.to_be_bytes()
}

/// Helper to bench a function on a tree.
/// It creates a group for the given name and closure and runs it against trees of various
/// sizes before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut Tree<Lexicographic>, u32)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11, 15] {
        let num_nodes = 2u32.pow(num_levels) - 1;
        let largest_key_in_tree = num_nodes - 1;
        let id = BenchmarkId::new("avl", largest_key_in_tree);

        group.bench_function(id, |b| {
            b.iter_batched_ref(
                || {
                    let mut tree = Tree::with_capacity(Lexicographic, num_nodes as usize + 1);
                    for x in 0..num_nodes {
                        tree.insert(&key(x), &key(x)).unwrap();
                    }
                    tree
                },
                |tree| f(tree, black_box(largest_key_in_tree)),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "find", |tree, i| {
        let _value = black_box(tree.find(&key(i)));
    });
    bench_helper(c, "remove", |tree, i| {
        let _ = tree.remove(&key(i));
    });

    bench_helper(c, "insert", |tree, i| {
        let _ = tree.insert(&key(i + 1), &key(i + 1));
    });

    bench_helper(c, "find-miss", |tree, i| {
        let _value = black_box(tree.find(&key(i + 1)));
    });
    bench_helper(c, "remove-miss", |tree, i| {
        let _ = tree.remove(&key(i + 1));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
