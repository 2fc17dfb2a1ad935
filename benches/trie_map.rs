use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use std::collections::HashMap as StdHashMap;
use std::hash::Hash;
use std::hint::black_box;
use std::iter::FromIterator;
use std::sync::Arc;

use tracking_trie::{AtomicTrieMap, MapPatch, TrackingTrieMap, TrieMap};

mod utils;
use utils::*;

// Trait to abstract over the persistent map and the std baseline
trait BenchMap<K, V>: Clone + FromIterator<(K, V)>
where
    K: Clone + Hash + Eq,
    V: Clone + PartialEq,
{
    const PERSISTENT: bool = true;

    fn new() -> Self;
    fn set_item(&self, k: K, v: V) -> Self;
    fn insert(&mut self, k: K, v: V);
    fn remove(&self, k: &K) -> Self;
    fn find(&self, k: &K) -> Option<&V>;
    fn for_each<F: FnMut(&K, &V)>(&self, f: F);
}

impl<K, V> BenchMap<K, V> for TrieMap<K, V>
where
    K: Clone + Hash + Eq,
    V: Clone + PartialEq,
{
    fn new() -> Self {
        TrieMap::new()
    }

    fn set_item(&self, k: K, v: V) -> Self {
        TrieMap::set_item(self, k, v)
    }

    fn insert(&mut self, k: K, v: V) {
        TrieMap::insert(self, k, v);
    }

    fn remove(&self, k: &K) -> Self {
        TrieMap::remove(self, k)
    }

    fn find(&self, k: &K) -> Option<&V> {
        TrieMap::find(self, k)
    }

    fn for_each<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (k, v) in self.iter() {
            f(k, v)
        }
    }
}

impl<K, V> BenchMap<K, V> for StdHashMap<K, V>
where
    K: Clone + Hash + Eq,
    V: Clone + PartialEq,
{
    const PERSISTENT: bool = false;

    fn new() -> Self {
        StdHashMap::new()
    }

    fn set_item(&self, k: K, v: V) -> Self {
        let mut ret = self.clone();
        StdHashMap::insert(&mut ret, k, v);
        ret
    }

    fn insert(&mut self, k: K, v: V) {
        StdHashMap::insert(self, k, v);
    }

    fn remove(&self, k: &K) -> Self {
        let mut ret = self.clone();
        StdHashMap::remove(&mut ret, k);
        ret
    }

    fn find(&self, k: &K) -> Option<&V> {
        self.get(k)
    }

    fn for_each<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (k, v) in self.iter() {
            f(k, v)
        }
    }
}

fn bench_find<M, K, V>(b: &mut Bencher, size: usize)
where
    M: BenchMap<K, V>,
    K: TestData,
    V: TestData,
{
    let keys = K::generate(size);
    let values = V::generate(size);
    let order = reorder(&keys);
    let m: M = keys.into_iter().zip(values).collect();
    b.iter(|| {
        for k in &order {
            black_box(m.find(k));
        }
    })
}

fn bench_find_absent<M, K, V>(b: &mut Bencher, size: usize)
where
    M: BenchMap<K, V>,
    K: TestData,
    V: TestData,
{
    let keys = K::generate(size * 2);
    let values = V::generate(size);
    let order = reorder(&keys[size..]);
    let m: M = keys.into_iter().zip(values).collect();
    b.iter(|| {
        for k in &order {
            black_box(m.find(k));
        }
    })
}

fn bench_set_item<M, K, V>(b: &mut Bencher, size: usize)
where
    M: BenchMap<K, V>,
    K: TestData,
    V: TestData,
{
    let keys = K::generate(size);
    let values = V::generate(size);
    b.iter(|| {
        let mut m = M::new();
        for (k, v) in keys.clone().into_iter().zip(values.clone()) {
            m = m.set_item(k, v);
        }
        m
    })
}

fn bench_insert_mut<M, K, V>(b: &mut Bencher, size: usize)
where
    M: BenchMap<K, V>,
    K: TestData,
    V: TestData,
{
    let keys = K::generate(size);
    let values = V::generate(size);
    b.iter(|| {
        let mut m = M::new();
        for (k, v) in keys.clone().into_iter().zip(values.clone()) {
            m.insert(k, v);
        }
        m
    })
}

fn bench_remove<M, K, V>(b: &mut Bencher, size: usize)
where
    M: BenchMap<K, V>,
    K: TestData,
    V: TestData,
{
    let keys = K::generate(size);
    let values = V::generate(size);
    let order = reorder(&keys);
    let map: M = keys.into_iter().zip(values).collect();
    b.iter(|| {
        let mut m = map.clone();
        for k in &order {
            m = m.remove(k);
        }
        m
    })
}

fn bench_iter<M, K, V>(b: &mut Bencher, size: usize)
where
    M: BenchMap<K, V>,
    K: TestData,
    V: TestData,
{
    let keys = K::generate(size);
    let values = V::generate(size);
    let m: M = keys.into_iter().zip(values).collect();
    b.iter(|| {
        m.for_each(|k, v| {
            black_box((k, v));
        })
    })
}

fn bench_group<M, K, V>(c: &mut Criterion, group_name: &str)
where
    M: BenchMap<K, V>,
    K: TestData,
    V: TestData,
{
    let mut group = c.benchmark_group(group_name);

    for size in &[100, 1000, 10000, 100000] {
        group.bench_function(&format!("find_{}", size), |b| {
            bench_find::<M, K, V>(b, *size)
        });
    }

    for size in &[10000, 100000] {
        group.bench_function(&format!("find_absent_{}", size), |b| {
            bench_find_absent::<M, K, V>(b, *size)
        });
    }

    for size in &[100, 1000, 10000, 100000] {
        group.bench_function(&format!("insert_mut_{}", size), |b| {
            bench_insert_mut::<M, K, V>(b, *size)
        });
    }

    for size in &[1000, 10000] {
        group.bench_function(&format!("iter_{}", size), |b| {
            bench_iter::<M, K, V>(b, *size)
        });
    }

    if M::PERSISTENT {
        for size in &[100, 1000, 10000] {
            group.bench_function(&format!("set_item_{}", size), |b| {
                bench_set_item::<M, K, V>(b, *size)
            });

            group.bench_function(&format!("remove_{}", size), |b| {
                bench_remove::<M, K, V>(b, *size)
            });
        }
    }

    group.finish();
}

// Change tracking on top of the plain map
fn bench_tracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking_i64");

    for size in &[100, 1000, 10000] {
        let keys = i64::generate(*size);
        let base: TrieMap<i64, i64> = keys.iter().map(|k| (*k, *k)).collect();
        let order = reorder(&keys);

        group.bench_function(&format!("set_item_tracked_{}", size), |b| {
            b.iter(|| {
                let mut m = base.clone();
                for k in &order {
                    let (next, change) = m.set_item_tracked(*k, k.wrapping_add(1));
                    black_box(change);
                    m = next;
                }
                m
            })
        });

        group.bench_function(&format!("tracking_map_{}", size), |b| {
            b.iter(|| {
                let mut m = TrackingTrieMap::from(base.clone());
                for k in &order {
                    m = m.set_item(*k, k.wrapping_add(1));
                }
                m
            })
        });

        let changed: TrieMap<i64, i64> = order
            .iter()
            .take(size / 10)
            .fold(base.clone(), |m, k| m.set_item(*k, 0));
        group.bench_function(&format!("patch_between_{}", size), |b| {
            b.iter(|| black_box(MapPatch::between(base.clone(), changed.clone()).len()))
        });
    }

    for size in &[1000, 10000] {
        let keys = i64::generate(*size);
        let order = reorder(&keys);
        group.bench_function(&format!("atomic_set_item_{}", size), |b| {
            b.iter(|| {
                let cell = AtomicTrieMap::new();
                for k in &order {
                    black_box(cell.set_item(*k, *k));
                }
                cell.len()
            })
        });
    }

    group.finish();
}

fn trie_map_benches(c: &mut Criterion) {
    bench_group::<TrieMap<i64, i64>, i64, i64>(c, "triemap_i64");
    bench_group::<TrieMap<Arc<String>, Arc<String>>, Arc<String>, Arc<String>>(c, "triemap_str");
    bench_tracking(c);

    if std::env::var("BENCH_STD").is_ok() {
        bench_group::<StdHashMap<i64, i64>, i64, i64>(c, "stdhashmap_i64");
        bench_group::<StdHashMap<Arc<String>, Arc<String>>, Arc<String>, Arc<String>>(
            c,
            "stdhashmap_str",
        );
    }
}

criterion_group!(benches, trie_map_benches);
criterion_main!(benches);
