// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A record of a map being changed.
//!
//! A [`MapPatch`][MapPatch] holds the map before a change, the map after
//! it, and the [`Change`][Change] for every key which differs between the
//! two. Both maps are plain persistent maps, so holding on to them costs
//! no more than a couple of pointer copies.
//!
//! [MapPatch]: ./struct.MapPatch.html
//! [Change]: ../enum.Change.html

use std::borrow::Borrow;
use std::fmt::{Debug, Display, Error, Formatter};

use archery::SharedPointerKind;

use crate::change::Change;
use crate::hash::map::GenericTrieMap;
use crate::hashable::Hashable;

enum PatchChanges<K, V, H, P: SharedPointerKind> {
    Single(K, Change<V>),
    Many(GenericTrieMap<K, Change<V>, H, P>),
}

/// The difference between two versions of a map.
///
/// Patches made by single key mutations store just the one key and its
/// change, and only build a map of changes if you ask for one.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate tracking_trie;
/// # use tracking_trie::{Change, MapPatch};
/// let from = triemap!{"a" => 1, "b" => 2};
/// let to = from.set_item("b", 3).remove("a");
/// let patch = MapPatch::between(from.clone(), to.clone());
/// assert_eq!(&from, patch.from());
/// assert_eq!(&to, patch.to());
/// assert_eq!(Some(&Change::EntryRemoved(1)), patch.change("a"));
/// assert_eq!(Some(&Change::EntryMapped(2, 3)), patch.change("b"));
/// ```
pub struct MapPatch<K, V, H, P: SharedPointerKind> {
    from: GenericTrieMap<K, V, H, P>,
    to: GenericTrieMap<K, V, H, P>,
    changes: PatchChanges<K, V, H, P>,
}

impl<K, V, H, P> MapPatch<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Clone,
    P: SharedPointerKind,
{
    /// Construct a patch for a single key's change.
    #[must_use]
    pub fn single(
        from: GenericTrieMap<K, V, H, P>,
        to: GenericTrieMap<K, V, H, P>,
        key: K,
        change: Change<V>,
    ) -> Self {
        MapPatch {
            from,
            to,
            changes: PatchChanges::Single(key, change),
        }
    }

    /// Construct a patch from a map of changes already worked out.
    ///
    /// Keys whose change is [`NoChange`][Change::NoChange] are dropped.
    #[must_use]
    pub fn many(
        from: GenericTrieMap<K, V, H, P>,
        to: GenericTrieMap<K, V, H, P>,
        changes: GenericTrieMap<K, Change<V>, H, P>,
    ) -> Self {
        MapPatch {
            from,
            to,
            changes: PatchChanges::Many(changes.filter(|_, change| change.has_changed())),
        }
    }

    /// Construct a patch by comparing two maps.
    ///
    /// Time: O(n log m + m log n)
    #[must_use]
    pub fn between(from: GenericTrieMap<K, V, H, P>, to: GenericTrieMap<K, V, H, P>) -> Self {
        let changes = from.diff(&to);
        MapPatch {
            from,
            to,
            changes: PatchChanges::Many(changes),
        }
    }

    /// Construct a patch which leaves a map as it is.
    #[must_use]
    pub fn unchanged(map: GenericTrieMap<K, V, H, P>) -> Self {
        MapPatch {
            changes: PatchChanges::Many(map.new_from()),
            from: map.clone(),
            to: map,
        }
    }

    /// The map before the change.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn from(&self) -> &GenericTrieMap<K, V, H, P> {
        &self.from
    }

    /// The map after the change.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn to(&self) -> &GenericTrieMap<K, V, H, P> {
        &self.to
    }

    /// A map from every changed key to its change.
    ///
    /// For a single key patch, this builds the map on the spot.
    #[must_use]
    pub fn changes(&self) -> GenericTrieMap<K, Change<V>, H, P> {
        match &self.changes {
            PatchChanges::Many(changes) => changes.clone(),
            PatchChanges::Single(key, change) => {
                let changes = self.to.new_from();
                if change.has_changed() {
                    changes.set_item(key.clone(), change.clone())
                } else {
                    changes
                }
            }
        }
    }

    /// The change made to a key, if it was changed at all.
    #[must_use]
    pub fn change<Q>(&self, key: &Q) -> Option<&Change<V>>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        match &self.changes {
            PatchChanges::Many(changes) => changes.find(key),
            PatchChanges::Single(stored, change) => {
                if change.has_changed()
                    && Hashable::<Q>::key_eq(self.to.hasher(), stored.borrow(), key)
                {
                    Some(change)
                } else {
                    None
                }
            }
        }
    }

    /// Test whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of keys the patch changes.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.changes {
            PatchChanges::Many(changes) => changes.len(),
            PatchChanges::Single(_, change) => usize::from(change.has_changed()),
        }
    }
}

impl<K, V, H, P> Clone for MapPatch<K, V, H, P>
where
    K: Clone,
    V: Clone,
    H: Clone,
    P: SharedPointerKind,
{
    fn clone(&self) -> Self {
        MapPatch {
            from: self.from.clone(),
            to: self.to.clone(),
            changes: match &self.changes {
                PatchChanges::Single(key, change) => PatchChanges::Single(key.clone(), change.clone()),
                PatchChanges::Many(changes) => PatchChanges::Many(changes.clone()),
            },
        }
    }
}

impl<K, V, H, P> Debug for MapPatch<K, V, H, P>
where
    K: Debug,
    V: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let mut d = f.debug_struct("MapPatch");
        d.field("from", &self.from).field("to", &self.to);
        match &self.changes {
            PatchChanges::Single(key, change) => d.field("changes", &[(key, change)]),
            PatchChanges::Many(changes) => d.field("changes", changes),
        };
        d.finish()
    }
}

/// Renders the changes, one `key: change` pair per changed key.
impl<K, V, H, P> Display for MapPatch<K, V, H, P>
where
    K: Display,
    V: Display,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        fn entry<K: Display, V: Display>(
            f: &mut Formatter<'_>,
            first: bool,
            key: &K,
            change: &Change<V>,
        ) -> Result<(), Error> {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, change)
        }

        write!(f, "[")?;
        match &self.changes {
            PatchChanges::Single(key, change) => {
                if change.has_changed() {
                    entry(f, true, key, change)?;
                }
            }
            PatchChanges::Many(changes) => {
                for (index, (key, change)) in changes.iter().enumerate() {
                    entry(f, index == 0, key, change)?;
                }
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::proptest::trie_map;
    use crate::triemap::TrieMap;
    use ::proptest::{num::i16, proptest};
    use pretty_assertions::assert_eq;

    #[test]
    fn single_key_patch_synthesises_changes() {
        let from: TrieMap<&str, i32> = TrieMap::new();
        let (to, change) = from.set_item_tracked("x", 1);
        let patch = MapPatch::single(from.clone(), to.clone(), "x", change);
        assert!(patch.from().ptr_eq(&from));
        assert!(patch.to().ptr_eq(&to));
        assert_eq!(1, patch.len());
        assert_eq!(triemap! {"x" => Change::EntryAdded(1)}, patch.changes());
        assert_eq!(Some(&Change::EntryAdded(1)), patch.change("x"));
        assert_eq!(None, patch.change("y"));
        assert_eq!("[x: +1]", patch.to_string());
    }

    #[test]
    fn no_change_patches_are_empty() {
        let map = triemap! {"x" => 1};
        let (same, change) = map.set_item_tracked("x", 1);
        let patch = MapPatch::single(map.clone(), same, "x", change);
        assert!(patch.is_empty());
        assert!(patch.changes().is_empty());
        assert_eq!(None, patch.change("x"));
        assert_eq!("[]", patch.to_string());

        let unchanged = MapPatch::unchanged(map);
        assert!(unchanged.is_empty());
        assert!(unchanged.from().ptr_eq(unchanged.to()));
    }

    #[test]
    fn many_drops_no_change_entries() {
        let from = triemap! {1 => 1, 2 => 2};
        let to = from.set_item(1, 10);
        let changes = triemap! {1 => Change::EntryMapped(1, 10), 2 => Change::NoChange};
        let patch = MapPatch::many(from, to, changes);
        assert_eq!(1, patch.len());
        assert_eq!(None, patch.change(&2));
        assert_eq!("[1: 1 -> 10]", patch.to_string());
    }

    proptest! {
        #[test]
        fn between_agrees_with_tracked_changes(
            ref map in trie_map(i16::ANY, i16::ANY, 0..100),
            ref ops in ::proptest::collection::vec((i16::ANY, ::proptest::option::of(i16::ANY)), 0..50)
        ) {
            // Fold the tracked change of every step per key, and compare
            // with the diff of the endpoints.
            let mut current = map.clone();
            let mut combined: TrieMap<i16, Change<i16>> = TrieMap::new();
            for (key, value) in ops {
                let (next, change) = match value {
                    Some(value) => current.set_item_tracked(*key, *value),
                    None => current.remove_tracked(key),
                };
                let net = match combined.find(key) {
                    Some(earlier) => earlier.clone().combine(change),
                    None => change,
                };
                combined = combined.set_item(*key, net);
                current = next;
            }
            let patch = MapPatch::between(map.clone(), current.clone());
            let combined = combined.filter(|_, change| change.has_changed());
            assert_eq!(combined, patch.changes());
        }
    }
}
