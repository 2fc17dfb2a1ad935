// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parallel iterators.
//!
//! These are only available when using the `rayon` feature flag.

use ::rayon::iter::plumbing::{bridge_unindexed, Folder, UnindexedConsumer, UnindexedProducer};
use ::rayon::iter::{
    FromParallelIterator, IntoParallelIterator, IntoParallelRefIterator, ParallelExtend,
    ParallelIterator,
};

use crate::hashable::Hashable;
use crate::nodes::hamt::Node;
use crate::shared_ptr::SharedPointerKind;
use crate::triemap::GenericTrieMap;

impl<'a, K, V, H, P> IntoParallelRefIterator<'a> for GenericTrieMap<K, V, H, P>
where
    K: Send + Sync + 'a,
    V: Send + Sync + 'a,
    H: 'a,
    P: SharedPointerKind + Send + Sync + 'a,
{
    type Item = (&'a K, &'a V);
    type Iter = ParIter<'a, K, V, P>;

    fn par_iter(&'a self) -> Self::Iter {
        ParIter {
            root: self.root_node(),
        }
    }
}

/// A parallel iterator over the entries of a [`TrieMap`][TrieMap].
///
/// Work is split along the branches of the trie, so a thread ends up
/// with whole subtrees.
///
/// [TrieMap]: ../triemap/type.TrieMap.html
pub struct ParIter<'a, K, V, P: SharedPointerKind> {
    root: Option<&'a Node<K, V, P>>,
}

impl<'a, K, V, P> ParallelIterator for ParIter<'a, K, V, P>
where
    K: Send + Sync + 'a,
    V: Send + Sync + 'a,
    P: SharedPointerKind + Send + Sync + 'a,
{
    type Item = (&'a K, &'a V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge_unindexed(
            NodeProducer {
                nodes: self.root.map_or_else(Vec::new, |root| vec![root]),
            },
            consumer,
        )
    }
}

struct NodeProducer<'a, K, V, P: SharedPointerKind> {
    nodes: Vec<&'a Node<K, V, P>>,
}

impl<'a, K, V, P> UnindexedProducer for NodeProducer<'a, K, V, P>
where
    K: Send + Sync + 'a,
    V: Send + Sync + 'a,
    P: SharedPointerKind + Send + Sync + 'a,
{
    type Item = (&'a K, &'a V);

    fn split(mut self) -> (Self, Option<Self>) {
        // A lone branch is opened up, so there's something to share.
        if let [node] = self.nodes[..] {
            let mut node = node;
            while let [only] = node.children() {
                node = only;
            }
            if node.children().is_empty() {
                return (self, None);
            }
            self.nodes = node.children().iter().collect();
        }
        if self.nodes.len() < 2 {
            return (self, None);
        }
        let right = self.nodes.split_off(self.nodes.len() / 2);
        (self, Some(NodeProducer { nodes: right }))
    }

    fn fold_with<F>(self, mut folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        for node in self.nodes {
            folder = fold_node(node, folder);
            if folder.full() {
                break;
            }
        }
        folder
    }
}

fn fold_node<'a, K, V, P, F>(node: &'a Node<K, V, P>, mut folder: F) -> F
where
    P: SharedPointerKind,
    F: Folder<(&'a K, &'a V)>,
{
    folder = folder.consume_iter(node.pairs());
    for child in node.children() {
        if folder.full() {
            break;
        }
        folder = fold_node(child, folder);
    }
    folder
}

/// Later pairs win over earlier ones with the same key, as with
/// [`FromIterator`][FromIterator].
///
/// [FromIterator]: https://doc.rust-lang.org/std/iter/trait.FromIterator.html
impl<K, V, H, P> FromParallelIterator<(K, V)> for GenericTrieMap<K, V, H, P>
where
    K: Clone + Send + Sync,
    V: Clone + PartialEq + Send + Sync,
    H: Hashable<K> + Default + Clone + Send,
    P: SharedPointerKind + Send + Sync,
{
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        par_iter
            .into_par_iter()
            .fold(Self::default, |map, (key, value)| map.set_item(key, value))
            .reduce(Self::default, |earlier, later| later.union(earlier))
    }
}

impl<K, V, H, P> ParallelExtend<(K, V)> for GenericTrieMap<K, V, H, P>
where
    K: Clone + Send + Sync,
    V: Clone + PartialEq + Send + Sync,
    H: Hashable<K> + Default + Clone + Send,
    P: SharedPointerKind + Send + Sync,
{
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        let later: Self = Self::from_par_iter(par_iter);
        *self = later.union(self.clone());
    }
}

#[cfg(test)]
mod test {
    use crate::proptest::trie_map;
    use crate::test::LolHasher;
    use crate::{GenericTrieMap, TrieMap};
    use ::proptest::collection::vec;
    use ::proptest::num::{i16, i32};
    use ::proptest::proptest;
    use ::rayon::iter::{
        IntoParallelIterator, IntoParallelRefIterator, ParallelExtend, ParallelIterator,
    };
    use archery::ArcK;
    use std::hash::BuildHasherDefault;

    type TinyMap = GenericTrieMap<i16, i16, BuildHasherDefault<LolHasher<5>>, ArcK>;

    #[test]
    fn par_iter_empty() {
        let map: TrieMap<i32, i32> = TrieMap::new();
        assert_eq!(0, map.par_iter().count());
    }

    #[test]
    fn par_iter_reaches_collisions() {
        // Five hash bits for a thousand keys: every slot is a collision list.
        let map: TinyMap = (0..1000).map(|i| (i, i)).collect();
        let sum: i64 = map.par_iter().map(|(_, v)| i64::from(*v)).sum();
        assert_eq!((0..1000i64).sum::<i64>(), sum);
        assert_eq!(1000, map.par_iter().count());
    }

    #[test]
    fn later_pairs_win() {
        let map: TrieMap<i32, i32> = (0..1000)
            .into_par_iter()
            .map(|i| (i % 10, i))
            .collect();
        let expected: TrieMap<i32, i32> = (0..1000).map(|i| (i % 10, i)).collect();
        assert_eq!(expected, map);
    }

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn par_iter(ref input in trie_map(i32::ANY, i32::ANY, 0..10000)) {
            assert_eq!(input.iter().max(), input.par_iter().max());
            assert_eq!(input.len(), input.par_iter().count());
        }

        #[cfg_attr(miri, ignore)]
        #[test]
        fn par_collect(ref input in vec((i16::ANY, i16::ANY), 0..1000)) {
            let expected: TrieMap<i16, i16> = input.iter().cloned().collect();
            let map: TrieMap<i16, i16> = input.clone().into_par_iter().collect();
            map.check_invariants().unwrap();
            assert_eq!(expected, map);
        }

        #[cfg_attr(miri, ignore)]
        #[test]
        fn par_extend(ref start in trie_map(i16::ANY, i16::ANY, 0..100),
                      ref input in vec((i16::ANY, i16::ANY), 0..1000)) {
            let mut expected = start.clone();
            expected.extend(input.iter().cloned());
            let mut map = start.clone();
            map.par_extend(input.clone());
            assert_eq!(expected, map);
        }
    }
}
