#![allow(dead_code)]
use rand::seq::SliceRandom;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

const SEED: u64 = 0x7472_6965;

/// Key and value types the benches are run with. Generated data is
/// distinct and the same on every run.
pub trait TestData: Clone + Debug + Ord + Eq + Hash {
    fn generate(size: usize) -> Vec<Self>;
}

fn distinct<A: Eq + Hash + Clone>(size: usize, mut next: impl FnMut(&mut SmallRng) -> A) -> Vec<A> {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut seen = HashSet::with_capacity(size);
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let item = next(&mut rng);
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

impl TestData for i64 {
    fn generate(size: usize) -> Vec<Self> {
        distinct(size, |rng| rng.random::<i64>())
    }
}

impl TestData for String {
    fn generate(size: usize) -> Vec<Self> {
        distinct(size, |rng| {
            let len = rng.random_range(5..20);
            (0..len)
                .map(|_| rng.random_range(b'a'..=b'z') as char)
                .collect()
        })
    }
}

impl<T> TestData for Arc<T>
where
    T: TestData + 'static,
{
    fn generate(size: usize) -> Vec<Self> {
        T::generate(size).into_iter().map(Arc::new).collect()
    }
}

/// The same items in a fixed shuffled order, so lookups don't follow
/// insertion order.
pub fn reorder<A: Clone>(items: &[A]) -> Vec<A> {
    let mut rng = SmallRng::seed_from_u64(SEED.rotate_left(17));
    let mut out = items.to_vec();
    out.shuffle(&mut rng);
    out
}
