// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A persistent map which remembers how it changed.
//!
//! A [`TrackingTrieMap`][TrackingTrieMap] is a map together with the net
//! [`Change`][Change] to each key since it was created, or since the last
//! [`snapshot`][snapshot]. Setting a key and then putting its old value
//! back nets out to no change at all.
//!
//! [TrackingTrieMap]: ./struct.TrackingTrieMap.html
//! [Change]: ../enum.Change.html
//! [snapshot]: ./struct.TrackingTrieMap.html#method.snapshot

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Error, Formatter};

use archery::SharedPointerKind;

use crate::change::Change;
use crate::error::MapError;
use crate::hash::map::{GenericTrieMap, Iter};
use crate::hash::patch::MapPatch;
use crate::hashable::Hashable;
use crate::nodes::hamt::InsertMode;
use crate::shared_ptr::DefaultSharedPtr;

/// Type alias for [`GenericTrackingTrieMap`] with the default hasher and
/// pointer type.
///
/// [GenericTrackingTrieMap]: ./struct.GenericTrackingTrieMap.html
pub type TrackingTrieMap<K, V> = GenericTrackingTrieMap<K, V, RandomState, DefaultSharedPtr>;

/// A persistent map which accumulates the changes made to it.
///
/// # Examples
///
/// ```
/// # use tracking_trie::{Change, TrackingTrieMap};
/// let map = TrackingTrieMap::new()
///     .set_item("a", 1)
///     .set_item("b", 2)
///     .set_item("a", 3)
///     .remove("b");
/// assert_eq!(Some(&3), map.find("a"));
/// assert_eq!(1, map.changes().len());
/// assert_eq!(Some(&Change::EntryAdded(3)), map.changes().find("a"));
///
/// let map = map.snapshot();
/// assert!(map.changes().is_empty());
/// assert_eq!(Some(&3), map.find("a"));
/// ```
pub struct GenericTrackingTrieMap<K, V, H, P: SharedPointerKind> {
    base: GenericTrieMap<K, V, H, P>,
    map: GenericTrieMap<K, V, H, P>,
    changes: GenericTrieMap<K, Change<V>, H, P>,
}

impl<K, V, H, P> GenericTrackingTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Clone,
    P: SharedPointerKind,
{
    /// Construct an empty tracking map.
    #[inline]
    #[must_use]
    pub fn new() -> Self
    where
        H: Default,
    {
        Self::from_map(GenericTrieMap::new())
    }

    /// Start tracking changes to an existing map.
    #[must_use]
    pub fn from_map(map: GenericTrieMap<K, V, H, P>) -> Self {
        GenericTrackingTrieMap {
            changes: map.new_from(),
            base: map.clone(),
            map,
        }
    }

    /// The current contents of the map.
    #[inline]
    #[must_use]
    pub fn map(&self) -> &GenericTrieMap<K, V, H, P> {
        &self.map
    }

    /// The net change to every key changed since tracking started.
    #[inline]
    #[must_use]
    pub fn changes(&self) -> &GenericTrieMap<K, Change<V>, H, P> {
        &self.changes
    }

    /// The accumulated changes as a patch from the map tracking started
    /// with to the current one.
    #[must_use]
    pub fn patch(&self) -> MapPatch<K, V, H, P> {
        MapPatch::many(self.base.clone(), self.map.clone(), self.changes.clone())
    }

    /// Keep the current contents, and forget the changes so far.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        tracing::debug!(changes = self.changes.len(), "tracking map snapshot");
        Self::from_map(self.map.clone())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        self.map.iter()
    }

    /// Get the value for a key.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        self.map.find(key)
    }

    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        self.map.contains_key(key)
    }

    fn record(&self, map: GenericTrieMap<K, V, H, P>, key: K, change: Change<V>) -> Self {
        if change.has_no_change() {
            return self.clone();
        }
        let net = match self.changes.find(&key) {
            Some(earlier) => earlier.clone().combine(change),
            None => change,
        };
        let changes = if net.has_changed() {
            self.changes.set_item(key, net)
        } else {
            self.changes.remove(&key)
        };
        GenericTrackingTrieMap {
            base: self.base.clone(),
            map,
            changes,
        }
    }

    /// Add a key, failing if it's already present.
    pub fn add(&self, key: K, value: V) -> Result<Self, MapError> {
        let (map, change) = self.map.insert_tracked(key.clone(), value, InsertMode::Add)?;
        Ok(self.record(map, key, change))
    }

    /// Add a key, unless it's already present.
    #[must_use]
    pub fn try_add(&self, key: K, value: V) -> Self {
        let (map, change) = self
            .map
            .insert_tracked_total(key.clone(), value, InsertMode::TryAdd);
        self.record(map, key, change)
    }

    /// Set a key to a value.
    #[must_use]
    pub fn set_item(&self, key: K, value: V) -> Self {
        let (map, change) = self.map.set_item_tracked(key.clone(), value);
        self.record(map, key, change)
    }

    /// Remove a key, if it's present.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        let stored = match self.map.find_key_value(key) {
            Some((stored, _)) => stored.clone(),
            None => return self.clone(),
        };
        let (map, change) = self.map.remove_tracked::<K>(&stored);
        self.record(map, stored, change)
    }

    /// Add every entry of another map whose key isn't already present.
    #[must_use]
    pub fn union(&self, other: &GenericTrieMap<K, V, H, P>) -> Self {
        other.iter().fold(self.clone(), |map, (key, value)| {
            map.try_add(key.clone(), value.clone())
        })
    }
}

impl<K, V, H, P> Clone for GenericTrackingTrieMap<K, V, H, P>
where
    H: Clone,
    P: SharedPointerKind,
{
    fn clone(&self) -> Self {
        GenericTrackingTrieMap {
            base: self.base.clone(),
            map: self.map.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl<K, V, H, P> Default for GenericTrackingTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H, P> From<GenericTrieMap<K, V, H, P>> for GenericTrackingTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Clone,
    P: SharedPointerKind,
{
    fn from(map: GenericTrieMap<K, V, H, P>) -> Self {
        Self::from_map(map)
    }
}

/// Tracking maps compare by their contents alone.
impl<K, V, H, P> PartialEq for GenericTrackingTrieMap<K, V, H, P>
where
    V: PartialEq,
    H: Hashable<K>,
    P: SharedPointerKind,
{
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<K, V, H, P> Eq for GenericTrackingTrieMap<K, V, H, P>
where
    V: Eq,
    H: Hashable<K>,
    P: SharedPointerKind,
{
}

impl<K, V, H, P> Debug for GenericTrackingTrieMap<K, V, H, P>
where
    K: Debug,
    V: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_struct("TrackingTrieMap")
            .field("map", &self.map)
            .field("changes", &self.changes)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::proptest::trie_map;
    use crate::triemap::TrieMap;
    use ::proptest::{collection, num::i16, option, proptest};
    use pretty_assertions::assert_eq;

    #[test]
    fn add_then_remove_nets_out() {
        let map = TrackingTrieMap::new().add("a", 1).unwrap().remove("a");
        assert!(map.is_empty());
        assert!(map.changes().is_empty());
        assert!(map.patch().is_empty());
    }

    #[test]
    fn restoring_a_value_nets_out() {
        let start = TrackingTrieMap::from(triemap! {"a" => 1});
        let map = start.set_item("a", 2).set_item("a", 1);
        assert!(map.changes().is_empty());
        assert_eq!(start, map);
    }

    #[test]
    fn add_reports_duplicates() {
        let map = TrackingTrieMap::new().set_item("a", 1);
        assert_eq!(Err(MapError::DuplicateKey), map.add("a", 2).map(|m| m.len()));
        let same = map.try_add("a", 2);
        assert_eq!(Some(&1), same.find("a"));
        assert_eq!(map.changes(), same.changes());
    }

    #[test]
    fn remove_by_borrowed_key() {
        let map = TrackingTrieMap::new()
            .set_item("a".to_string(), 1)
            .set_item("b".to_string(), 2)
            .snapshot();
        let next = map.remove("a");
        assert_eq!(None, next.find("a"));
        assert_eq!(Some(&2), next.find("b"));
        assert_eq!(
            triemap! {"a".to_string() => Change::EntryRemoved(1)},
            *next.changes()
        );
        assert!(next.remove("zzz").changes().ptr_eq(next.changes()));
    }

    #[test]
    fn union_is_tracked() {
        let map = TrackingTrieMap::from(triemap! {1 => 1, 2 => 2});
        let merged = map.union(&triemap! {2 => 20, 3 => 30});
        assert_eq!(triemap! {1 => 1, 2 => 2, 3 => 30}, *merged.map());
        assert_eq!(triemap! {3 => Change::EntryAdded(30)}, *merged.changes());
    }

    #[test]
    fn snapshot_keeps_contents() {
        let map = TrackingTrieMap::new().set_item(1, 1).set_item(2, 2);
        let snap = map.snapshot();
        assert!(snap.changes().is_empty());
        assert!(snap.map().ptr_eq(map.map()));
        let next = snap.remove(&1);
        assert_eq!(triemap! {1 => Change::EntryRemoved(1)}, *next.changes());
    }

    proptest! {
        #[test]
        fn changes_match_diff_from_start(
            ref start in trie_map(i16::ANY, i16::ANY, 0..50),
            ref ops in collection::vec((i16::ANY, option::of(i16::ANY)), 0..100)
        ) {
            let mut tracked = TrackingTrieMap::from(start.clone());
            for (key, value) in ops {
                tracked = match value {
                    Some(value) => tracked.set_item(*key, *value),
                    None => tracked.remove(key),
                };
            }
            let expected: TrieMap<i16, Change<i16>> = start.diff(tracked.map());
            assert_eq!(expected, tracked.changes().clone());
            assert_eq!(expected, tracked.patch().changes());
        }
    }
}
