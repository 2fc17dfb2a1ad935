// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A persistent unordered map.
//!
//! An immutable hash map using [hash array mapped tries][1].
//!
//! Every operation which would change the map returns a new map instead,
//! leaving the original untouched. The new map shares every part of the
//! trie which the change didn't touch with the old one, so keeping old
//! versions around is cheap, and cloning a map is O(1).
//!
//! Lookups and single key updates are O(log<sub>32</sub> n), which is
//! effectively constant for any map which fits in memory.
//!
//! Updates come in two flavours: the plain ones just return the new map,
//! and the `_tracked` ones also return a [`Change`][Change] describing what
//! happened to the key, for code which needs to tell observers about it.
//! Plain updates don't pay for the tracking.
//!
//! Map entries will have a predictable order based on the hasher
//! being used. Unless otherwise specified, this will be the standard
//! [`RandomState`][std::collections::hash_map::RandomState] hasher.
//!
//! [1]: https://en.wikipedia.org/wiki/Hash_array_mapped_trie
//! [Change]: ../enum.Change.html
//! [std::collections::hash_map::RandomState]: https://doc.rust-lang.org/std/collections/hash_map/struct.RandomState.html

use std::borrow::Borrow;
use std::collections;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Error, Formatter};
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};
use std::ops::Index;

use archery::{SharedPointer, SharedPointerKind};

use crate::bits::Sec;
use crate::change::Change;
use crate::error::MapError;
use crate::hashable::{stable_hash, Hashable};
use crate::nodes::hamt::{
    Drain as NodeDrain, HashBits, InsertMode, Inserted, Iter as NodeIter, Node,
};
use crate::shared_ptr::DefaultSharedPtr;
use crate::util::clone_ref;

#[cfg(any(test, feature = "debug"))]
use crate::error::InvariantError;

/// Construct a trie map from a sequence of key/value pairs.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate tracking_trie;
/// # use tracking_trie::TrieMap;
/// # fn main() {
/// assert_eq!(
///   triemap!{
///     1 => 11,
///     2 => 22,
///     3 => 33
///   },
///   TrieMap::from(vec![(1, 11), (2, 22), (3, 33)])
/// );
/// # }
/// ```
#[macro_export]
macro_rules! triemap {
    () => { $crate::triemap::TrieMap::new() };

    ( $( $key:expr => $value:expr ),* ) => {{
        let mut map = $crate::triemap::TrieMap::new();
        $({
            map.insert($key, $value);
        })*;
        map
    }};

    ( $( $key:expr => $value:expr ,)* ) => {{
        let mut map = $crate::triemap::TrieMap::new();
        $({
            map.insert($key, $value);
        })*;
        map
    }};
}

/// Type alias for [`GenericTrieMap`] that uses [`std::hash::RandomState`] as the default hasher and [`DefaultSharedPtr`] as the pointer type.
///
/// [GenericTrieMap]: ./struct.GenericTrieMap.html
/// [`std::hash::RandomState`]: https://doc.rust-lang.org/stable/std/collections/hash_map/struct.RandomState.html
/// [DefaultSharedPtr]: ../shared_ptr/type.DefaultSharedPtr.html
pub type TrieMap<K, V> = GenericTrieMap<K, V, RandomState, DefaultSharedPtr>;

/// A persistent unordered map.
///
/// Keys are hashed and compared by the map's `H`, a
/// [`Hashable`][Hashable] capability. Any
/// [`BuildHasher`][std::hash::BuildHasher] works for keys which implement
/// [`Hash`][std::hash::Hash] and [`Eq`][std::cmp::Eq], and you can write
/// your own to give a map different ideas about key equality.
///
/// Equality and hashing of whole maps depend only on their contents, never
/// on the shape of the trie underneath.
///
/// [Hashable]: ../hashable/trait.Hashable.html
/// [std::cmp::Eq]: https://doc.rust-lang.org/std/cmp/trait.Eq.html
/// [std::hash::Hash]: https://doc.rust-lang.org/std/hash/trait.Hash.html
/// [std::hash::BuildHasher]: https://doc.rust-lang.org/std/hash/trait.BuildHasher.html
pub struct GenericTrieMap<K, V, H, P: SharedPointerKind> {
    size: usize,
    root: Option<SharedPointer<Node<K, V, P>, P>>,
    hasher: H,
}

impl<K, V, P> GenericTrieMap<K, V, RandomState, P>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    P: SharedPointerKind,
{
    /// Construct a trie map with a single mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tracking_trie::TrieMap;
    /// let map = TrieMap::unit(123, "onetwothree");
    /// assert_eq!(
    ///   map.find(&123),
    ///   Some(&"onetwothree")
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn unit(k: K, v: V) -> GenericTrieMap<K, V, RandomState, P> {
        GenericTrieMap::new().set_item(k, v)
    }
}

impl<K, V, H, P: SharedPointerKind> GenericTrieMap<K, V, H, P> {
    /// Construct an empty trie map.
    #[inline]
    #[must_use]
    pub fn new() -> Self
    where
        H: Default,
    {
        Self::default()
    }

    /// Test whether a trie map is empty.
    ///
    /// Time: O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// # use tracking_trie::TrieMap;
    /// assert!(
    ///   !triemap!{1 => 2}.is_empty()
    /// );
    /// assert!(
    ///   TrieMap::<i32, i32>::new().is_empty()
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of entries in a trie map.
    ///
    /// Time: O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// assert_eq!(3, triemap!{
    ///   1 => 11,
    ///   2 => 22,
    ///   3 => 33
    /// }.len());
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Test whether two maps refer to the same content in memory.
    ///
    /// This is true if the two sides are references to the same map,
    /// or if the two maps refer to the same root node. A map and an
    /// unchanged result of updating it, such as removing an absent key,
    /// share their root.
    ///
    /// Time: O(1)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => SharedPointer::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Construct an empty trie map using the provided hasher.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        GenericTrieMap {
            size: 0,
            hasher,
            root: None,
        }
    }

    /// Get a reference to the map's key hashing capability.
    #[must_use]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Construct an empty trie map using the same hasher as the
    /// current trie map.
    #[inline]
    #[must_use]
    pub fn new_from<K1, V1>(&self) -> GenericTrieMap<K1, V1, H, P>
    where
        H: Clone,
    {
        GenericTrieMap {
            size: 0,
            root: None,
            hasher: self.hasher.clone(),
        }
    }

    /// Get an iterator over the key/value pairs of a trie map.
    ///
    /// Entries come out in trie order, which is a function of their
    /// hashes. It bears no relation to insertion order, but a given map
    /// always produces the same order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter {
            it: NodeIter::new(self.root.as_deref(), self.size),
        }
    }

    /// Get an iterator over a trie map's keys, in trie order.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, P> {
        Keys {
            it: NodeIter::new(self.root.as_deref(), self.size),
        }
    }

    /// Get an iterator over a trie map's values, in trie order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, P> {
        Values {
            it: NodeIter::new(self.root.as_deref(), self.size),
        }
    }

    /// Discard all elements from the map.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let mut map = triemap![1=>1, 2=>2, 3=>3];
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    #[inline]
    fn hash_of<Q: ?Sized>(&self, key: &Q) -> HashBits
    where
        H: Hashable<Q>,
    {
        self.hasher.hash_key(key)
    }

    fn with_root(&self, root: Node<K, V, P>, size: usize) -> Self
    where
        H: Clone,
    {
        GenericTrieMap {
            size,
            root: if root.is_empty() {
                None
            } else {
                Some(SharedPointer::new(root))
            },
            hasher: self.hasher.clone(),
        }
    }

    #[cfg(any(test, feature = "rayon"))]
    pub(crate) fn root_node(&self) -> Option<&Node<K, V, P>> {
        self.root.as_deref()
    }

    /// The number of branch levels between the root and the deepest leaf.
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }

    /// Verify the structural invariants of the trie underneath this map.
    ///
    /// This walks the whole trie, so it's O(n). A failure means there's a
    /// bug in the trie engine, or in the map's [`Hashable`][Hashable]
    /// implementation.
    ///
    /// [Hashable]: ../hashable/trait.Hashable.html
    #[cfg(any(test, feature = "debug"))]
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        H: Hashable<K>,
    {
        let counted = match &self.root {
            None => Ok(0),
            Some(root) if root.is_empty() => Err(InvariantError::EmptyChild { offset: 0 }),
            Some(root) => root.check(&self.hasher, Sec::ROOT, 0),
        };
        let result = counted.and_then(|counted| {
            if counted == self.size {
                Ok(())
            } else {
                Err(InvariantError::SizeMismatch {
                    reported: self.size,
                    counted,
                })
            }
        });
        if let Err(err) = &result {
            tracing::error!(%err, size = self.size, "trie map failed its invariant check");
        }
        result
    }
}

impl<K, V, H, P> GenericTrieMap<K, V, H, P>
where
    P: SharedPointerKind,
{
    fn test_eq<P2>(&self, other: &GenericTrieMap<K, V, H, P2>) -> bool
    where
        V: PartialEq,
        H: Hashable<K>,
        P2: SharedPointerKind,
    {
        if self.len() != other.len() {
            return false;
        }
        // Keys are unique on both sides and the sizes agree, so finding
        // every one of ours in the other map means the key sets match.
        self.iter()
            .all(|(key, value)| other.find(key) == Some(value))
    }

    /// Get the value for a key from a trie map.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map = triemap!{123 => "lol"};
    /// assert_eq!(
    ///   map.find(&123),
    ///   Some(&"lol")
    /// );
    /// assert_eq!(map.find(&321), None);
    /// ```
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        self.find_key_value(key).map(|(_, v)| v)
    }

    /// Get the key/value pair for a key from a trie map.
    ///
    /// The key returned is the one stored in the map, which may differ
    /// from the one you asked with if the map's hasher considers them
    /// equal.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn find_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        let root = self.root.as_ref()?;
        root.get(&self.hasher, self.hash_of(key), key, Sec::ROOT)
    }

    /// Test for the presence of a key in a trie map.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map = triemap!{123 => "lol"};
    /// assert!(
    ///   map.contains_key(&123)
    /// );
    /// assert!(
    ///   !map.contains_key(&321)
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        self.find(key).is_some()
    }

    /// Get the value for a key which must be present.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// # use tracking_trie::MapError;
    /// let map = triemap!{"a" => 1};
    /// assert_eq!(Ok(&1), map.get_required(&"a"));
    /// assert_eq!(Err(MapError::KeyNotFound), map.get_required(&"b"));
    /// ```
    pub fn get_required<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        self.find(key).ok_or(MapError::KeyNotFound)
    }
}

impl<K, V, H, P> GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Clone,
    P: SharedPointerKind,
{
    fn insert_node(
        &self,
        key: K,
        value: V,
        mode: InsertMode,
    ) -> Result<(Self, Inserted<'_, V>), MapError> {
        let hash = self.hash_of(&key);
        self.insert_hashed(hash, key, value, mode)
    }

    fn insert_hashed(
        &self,
        hash: HashBits,
        key: K,
        value: V,
        mode: InsertMode,
    ) -> Result<(Self, Inserted<'_, V>), MapError> {
        let (root, inserted) = match &self.root {
            Some(root) => root.insert(&self.hasher, hash, key, value, Sec::ROOT, mode)?,
            None => {
                if !mode.admits_new()? {
                    return Ok((self.clone(), Inserted::Unchanged));
                }
                (Node::Entry(hash, key, value), Inserted::Added)
            }
        };
        let map = match inserted {
            Inserted::Unchanged => self.clone(),
            Inserted::Added => self.with_root(root, self.size + 1),
            Inserted::Mapped(_) => self.with_root(root, self.size),
        };
        Ok((map, inserted))
    }

    /// Insert with a mode which never fails.
    fn insert_total(
        &self,
        hash: HashBits,
        key: K,
        value: V,
        mode: InsertMode,
    ) -> (Self, Inserted<'_, V>) {
        debug_assert!(!mode.is_fallible());
        match self.insert_hashed(hash, key, value, mode) {
            Ok(result) => result,
            Err(err) => unreachable!("{:?} insertion failed: {}", mode, err),
        }
    }

    fn remove_node<Q>(&self, key: &Q) -> (Self, Option<&V>)
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        let root = match &self.root {
            Some(root) => root,
            None => return (self.clone(), None),
        };
        let (root, removed) = root.remove(&self.hasher, self.hash_of(key), key, Sec::ROOT);
        match removed {
            None => (self.clone(), None),
            Some(value) => (self.with_root(root, self.size - 1), Some(value)),
        }
    }

    /// Upsert an entry whose hash is already known, in place.
    fn upsert_hashed(&mut self, hash: HashBits, key: K, value: V) {
        let map = self.insert_total(hash, key, value, InsertMode::Upsert).0;
        *self = map;
    }

    /// Construct a new map with a key added, failing if the key is
    /// already present.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// # use tracking_trie::MapError;
    /// let map = triemap!{1 => 11};
    /// assert_eq!(Ok(triemap!{1 => 11, 2 => 22}), map.add(2, 22));
    /// assert_eq!(Err(MapError::DuplicateKey), map.add(1, 12));
    /// ```
    pub fn add(&self, key: K, value: V) -> Result<Self, MapError> {
        self.insert_node(key, value, InsertMode::Add)
            .map(|(map, _)| map)
    }

    /// Construct a new map with a key added, or return the map as it is
    /// if the key is already present.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map = triemap!{1 => 11};
    /// assert_eq!(triemap!{1 => 11, 2 => 22}, map.try_add(2, 22));
    /// assert_eq!(map, map.try_add(1, 12));
    /// ```
    #[must_use]
    pub fn try_add(&self, key: K, value: V) -> Self {
        let hash = self.hash_of(&key);
        self.insert_total(hash, key, value, InsertMode::TryAdd).0
    }

    /// Construct a new map with a key set to a value, whether or not the
    /// key was already present.
    ///
    /// Setting a key to the value it already has returns the map as it
    /// is.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// # use tracking_trie::TrieMap;
    /// let map = TrieMap::new();
    /// assert_eq!(
    ///   map.set_item(123, "123"),
    ///   triemap!{123 => "123"}
    /// );
    /// ```
    #[must_use]
    pub fn set_item(&self, key: K, value: V) -> Self {
        let hash = self.hash_of(&key);
        self.insert_total(hash, key, value, InsertMode::Upsert).0
    }

    /// Construct a new map with the value of an existing key replaced,
    /// failing if the key isn't present.
    ///
    /// Time: O(log n)
    pub fn replace(&self, key: K, value: V) -> Result<Self, MapError> {
        self.insert_node(key, value, InsertMode::Replace)
            .map(|(map, _)| map)
    }

    /// Construct a new map with the value of an existing key replaced,
    /// or return the map as it is if the key isn't present.
    ///
    /// Time: O(log n)
    #[must_use]
    pub fn try_replace(&self, key: K, value: V) -> Self {
        let hash = self.hash_of(&key);
        self.insert_total(hash, key, value, InsertMode::TryReplace).0
    }

    /// Construct a new map without the given key, or return the map as
    /// it is if the key isn't present.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map = triemap!{123 => "123", 456 => "456"};
    /// assert_eq!(
    ///   map.remove(&123),
    ///   triemap!{456 => "456"}
    /// );
    /// assert!(map.remove(&789).ptr_eq(&map));
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        self.remove_node(key).0
    }

    /// Insert a key according to `mode`, reporting what happened to it.
    ///
    /// Time: O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// # use tracking_trie::{Change, InsertMode, MapError};
    /// let map = triemap!{"a" => 1};
    /// let (map, change) = map.insert_tracked("b", 2, InsertMode::Add).unwrap();
    /// assert_eq!(Change::EntryAdded(2), change);
    /// let (_, change) = map.insert_tracked("a", 5, InsertMode::TryAdd).unwrap();
    /// assert_eq!(Change::NoChange, change);
    /// assert_eq!(
    ///   Err(MapError::KeyNotFound),
    ///   map.insert_tracked("c", 3, InsertMode::Replace)
    /// );
    /// ```
    pub fn insert_tracked(
        &self,
        key: K,
        value: V,
        mode: InsertMode,
    ) -> Result<(Self, Change<V>), MapError> {
        let new_value = value.clone();
        let (map, inserted) = self.insert_node(key, value, mode)?;
        Ok((map, inserted.into_change(new_value)))
    }

    /// [`insert_tracked`][insert_tracked] for a mode which never fails.
    ///
    /// [insert_tracked]: #method.insert_tracked
    pub(crate) fn insert_tracked_total(
        &self,
        key: K,
        value: V,
        mode: InsertMode,
    ) -> (Self, Change<V>) {
        let hash = self.hash_of(&key);
        let new_value = value.clone();
        let (map, inserted) = self.insert_total(hash, key, value, mode);
        (map, inserted.into_change(new_value))
    }

    /// Set a key to a value, reporting what happened to it.
    ///
    /// Time: O(log n)
    pub fn set_item_tracked(&self, key: K, value: V) -> (Self, Change<V>) {
        self.insert_tracked_total(key, value, InsertMode::Upsert)
    }

    /// Remove a key, reporting the value it had.
    ///
    /// Removing an absent key reports [`NoChange`][Change::NoChange].
    ///
    /// Time: O(log n)
    pub fn remove_tracked<Q>(&self, key: &Q) -> (Self, Change<V>)
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        let (map, removed) = self.remove_node(key);
        let change = match removed {
            Some(old) => Change::EntryRemoved(old.clone()),
            None => Change::NoChange,
        };
        (map, change)
    }

    /// Set a key to a value in place, reporting what happened to it.
    ///
    /// This is [`set_item_tracked`][set_item_tracked] on a mutable
    /// binding: other copies of the map aren't affected.
    ///
    /// Time: O(log n)
    ///
    /// [set_item_tracked]: #method.set_item_tracked
    pub fn insert(&mut self, key: K, value: V) -> Change<V> {
        let (map, change) = self.set_item_tracked(key, value);
        *self = map;
        change
    }

    /// Remove a key in place, reporting the value it had.
    ///
    /// Time: O(log n)
    pub fn delete<Q>(&mut self, key: &Q) -> Change<V>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        let (map, change) = self.remove_tracked(key);
        *self = map;
        change
    }

    /// Construct a map of the entries for which a predicate holds.
    ///
    /// Time: O(n log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map = triemap!{1 => 1, 2 => 2, 3 => 3, 4 => 4};
    /// assert_eq!(triemap!{2 => 2, 4 => 4}, map.filter(|_, v| v % 2 == 0));
    /// ```
    #[must_use]
    pub fn filter<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut out: Self = self.new_from();
        for (key, value, hash) in self.iter().it {
            if f(key, value) {
                out.upsert_hashed(hash, key.clone(), value.clone());
            }
        }
        if out.len() == self.len() {
            self.clone()
        } else {
            out
        }
    }

    /// Construct a map with every value transformed by a function.
    ///
    /// Keys don't move, so the new trie has exactly the shape of this
    /// one.
    ///
    /// Time: O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map = triemap!{1 => 1, 2 => 2};
    /// assert_eq!(triemap!{1 => 10, 2 => 20}, map.map_values(|_, v| v * 10));
    /// ```
    #[must_use]
    pub fn map_values<U, F>(&self, mut f: F) -> GenericTrieMap<K, U, H, P>
    where
        F: FnMut(&K, &V) -> U,
    {
        GenericTrieMap {
            size: self.size,
            root: self
                .root
                .as_ref()
                .map(|root| SharedPointer::new(root.map_values(&mut f))),
            hasher: self.hasher.clone(),
        }
    }

    /// Construct the union of two maps, keeping the values from the
    /// current map for keys which are in both.
    ///
    /// Time: O(m log n) where m is the size of the smaller map
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map1 = triemap!{1 => 1, 3 => 3};
    /// let map2 = triemap!{2 => 2, 3 => 4};
    /// let expected = triemap!{1 => 1, 2 => 2, 3 => 3};
    /// assert_eq!(expected, map1.union(map2));
    /// ```
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.len() >= other.len() {
            other
                .into_iter()
                .fold(self, |map, (key, value)| map.try_add(key, value))
        } else {
            self.into_iter()
                .fold(other, |map, (key, value)| map.set_item(key, value))
        }
    }

    /// Construct the union of two maps, using a function to decide
    /// what to do with the value when a key is in both maps.
    ///
    /// The function receives the key, the value from the current map and
    /// the value from the other map, and returns the value to keep.
    ///
    /// Time: O(m log n) where m is the size of the smaller map
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map1 = triemap!{1 => 1, 3 => 4};
    /// let map2 = triemap!{2 => 2, 3 => 5};
    /// let expected = triemap!{1 => 1, 2 => 2, 3 => 9};
    /// assert_eq!(expected, map1.union_with(map2, |_, l, r| l + r));
    /// ```
    #[must_use]
    pub fn union_with<F>(self, other: Self, mut f: F) -> Self
    where
        F: FnMut(&K, &V, &V) -> V,
    {
        if self.len() >= other.len() {
            let mut out = self;
            for (key, value) in other {
                let merged = match out.find(&key) {
                    Some(current) => f(&key, current, &value),
                    None => value,
                };
                out.insert(key, merged);
            }
            out
        } else {
            let mut out = other;
            for (key, value) in self {
                let merged = match out.find(&key) {
                    Some(current) => f(&key, &value, current),
                    None => value,
                };
                out.insert(key, merged);
            }
            out
        }
    }

    /// Construct the intersection of two maps, keeping the values from
    /// the current map.
    ///
    /// Time: O(m log n) where m is the size of the smaller map
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map1 = triemap!{1 => 1, 2 => 2};
    /// let map2 = triemap!{2 => 3, 3 => 4};
    /// assert_eq!(triemap!{2 => 2}, map1.intersect(map2));
    /// ```
    #[must_use]
    pub fn intersect<B>(self, other: GenericTrieMap<K, B, H, P>) -> Self {
        self.intersect_with(other, |_, value, _| value.clone())
    }

    /// Construct the intersection of two maps, using a function to
    /// combine the values of each key they share.
    ///
    /// Time: O(m log n) where m is the size of the smaller map
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map1 = triemap!{1 => 1, 2 => 2};
    /// let map2 = triemap!{2 => "two", 3 => "three"};
    /// assert_eq!(
    ///   triemap!{2 => (2, "two")},
    ///   map1.intersect_with(map2, |_, l, r| (*l, *r))
    /// );
    /// ```
    #[must_use]
    pub fn intersect_with<B, C, F>(
        self,
        other: GenericTrieMap<K, B, H, P>,
        mut f: F,
    ) -> GenericTrieMap<K, C, H, P>
    where
        C: Clone + PartialEq,
        F: FnMut(&K, &V, &B) -> C,
    {
        let mut out: GenericTrieMap<K, C, H, P> = self.new_from();
        if self.len() <= other.len() {
            for (key, value, hash) in self.iter().it {
                if let Some(theirs) = other.find(key) {
                    out.upsert_hashed(hash, key.clone(), f(key, value, theirs));
                }
            }
        } else {
            for (key, theirs) in other.iter() {
                if let Some((ours, value)) = self.find_key_value(key) {
                    out.insert(ours.clone(), f(ours, value, theirs));
                }
            }
        }
        out
    }

    /// Construct a map of the entries whose keys aren't in the other map.
    ///
    /// Time: O(m log n) where m is the size of the smaller map
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map1 = triemap!{1 => 1, 2 => 2};
    /// let map2 = triemap!{2 => 3, 3 => 4};
    /// assert_eq!(triemap!{1 => 1}, map1.except(map2));
    /// ```
    #[must_use]
    pub fn except<B>(self, other: GenericTrieMap<K, B, H, P>) -> Self {
        if other.len() < self.len() {
            other.keys().fold(self, |map, key| map.remove(key))
        } else {
            self.filter(|key, _| !other.contains_key(key))
        }
    }

    /// Construct a map of the entries whose keys are in exactly one of
    /// the two maps.
    ///
    /// Time: O(m log n) where m is the size of the smaller map
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// let map1 = triemap!{1 => 1, 2 => 2};
    /// let map2 = triemap!{2 => 3, 3 => 4};
    /// assert_eq!(triemap!{1 => 1, 3 => 4}, map1.symmetric_except(map2));
    /// ```
    #[must_use]
    pub fn symmetric_except(self, other: Self) -> Self {
        let (mut out, smaller) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        for (key, value) in smaller {
            if out.contains_key(&key) {
                out.delete(&key);
            } else {
                out.insert(key, value);
            }
        }
        out
    }

    /// Compute the changes which turn this map into another one.
    ///
    /// The result maps every key whose entry differs between the two maps
    /// to its [`Change`][Change]. Keys with the same value on both sides
    /// don't appear.
    ///
    /// Time: O(n log m + m log n)
    ///
    /// # Examples
    ///
    /// ```
    /// # #[macro_use] extern crate tracking_trie;
    /// # use tracking_trie::Change;
    /// let before = triemap!{"a" => 1, "b" => 2, "c" => 3};
    /// let after = triemap!{"a" => 1, "b" => 5, "d" => 4};
    /// assert_eq!(
    ///   triemap!{
    ///     "b" => Change::EntryMapped(2, 5),
    ///     "c" => Change::EntryRemoved(3),
    ///     "d" => Change::EntryAdded(4)
    ///   },
    ///   before.diff(&after)
    /// );
    /// ```
    #[must_use]
    pub fn diff(&self, other: &Self) -> GenericTrieMap<K, Change<V>, H, P> {
        let mut changes: GenericTrieMap<K, Change<V>, H, P> = self.new_from();
        if self.ptr_eq(other) {
            return changes;
        }
        for (key, value, hash) in self.iter().it {
            let change = match other.find(key) {
                Some(theirs) => Change::mapped(value.clone(), theirs.clone()),
                None => Change::EntryRemoved(value.clone()),
            };
            if change.has_changed() {
                changes.upsert_hashed(hash, key.clone(), change);
            }
        }
        for (key, value) in other.iter() {
            if !self.contains_key(key) {
                changes.insert(key.clone(), Change::EntryAdded(value.clone()));
            }
        }
        changes
    }
}

// Core traits

impl<K, V, H, P> Clone for GenericTrieMap<K, V, H, P>
where
    H: Clone,
    P: SharedPointerKind,
{
    /// Clone a map.
    ///
    /// Time: O(1)
    #[inline]
    fn clone(&self) -> Self {
        GenericTrieMap {
            root: self.root.clone(),
            size: self.size,
            hasher: self.hasher.clone(),
        }
    }
}

/// Maps are equal when they hold the same keys with equal values.
///
/// Both maps must use the same kind of [`Hashable`][Hashable], and its
/// key equality mustn't depend on the value of the capability, or `a == b`
/// and `b == a` could disagree. Every [`BuildHasher`][BuildHasher] meets
/// this: its keys are compared with `Eq` whatever the seed.
///
/// [BuildHasher]: https://doc.rust-lang.org/std/hash/trait.BuildHasher.html
impl<K, V, H, P1, P2> PartialEq<GenericTrieMap<K, V, H, P2>> for GenericTrieMap<K, V, H, P1>
where
    V: PartialEq,
    H: Hashable<K>,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn eq(&self, other: &GenericTrieMap<K, V, H, P2>) -> bool {
        self.test_eq(other)
    }
}

impl<K, V, H, P> Eq for GenericTrieMap<K, V, H, P>
where
    V: Eq,
    H: Hashable<K>,
    P: SharedPointerKind,
{
}

impl<K, V, H, P> Hash for GenericTrieMap<K, V, H, P>
where
    V: Hash,
    H: Hashable<K>,
    P: SharedPointerKind,
{
    /// Hash the contents of a map.
    ///
    /// Entries are combined with a commutative sum, so the result doesn't
    /// depend on the order of iteration. Keys go through the map's
    /// [`Hashable::stable_hash`][Hashable::stable_hash], which agrees with
    /// its key equality and doesn't depend on a random seed, so equal maps
    /// hash the same however they were built.
    fn hash<HS>(&self, state: &mut HS)
    where
        HS: Hasher,
    {
        let sum = self.iter().fold(0u64, |sum, (key, value)| {
            let key_hash = Hashable::<K>::stable_hash(&self.hasher, key);
            sum.wrapping_add(stable_hash(&(key_hash, value)))
        });
        state.write_usize(self.len());
        state.write_u64(sum);
    }
}

impl<K, V, H, P> Default for GenericTrieMap<K, V, H, P>
where
    H: Default,
    P: SharedPointerKind,
{
    #[inline]
    fn default() -> Self {
        GenericTrieMap {
            size: 0,
            root: None,
            hasher: Default::default(),
        }
    }
}

impl<K, V, H, RK, RV, P> Extend<(RK, RV)> for GenericTrieMap<K, V, H, P>
where
    K: Clone + From<RK>,
    V: Clone + PartialEq + From<RV>,
    H: Hashable<K> + Clone,
    P: SharedPointerKind,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (RK, RV)>,
    {
        for (key, value) in iter {
            *self = self.set_item(From::from(key), From::from(value));
        }
    }
}

impl<Q, K, V, H, P> Index<&Q> for GenericTrieMap<K, V, H, P>
where
    Q: ?Sized,
    K: Borrow<Q>,
    H: Hashable<Q>,
    P: SharedPointerKind,
{
    type Output = V;

    fn index(&self, key: &Q) -> &Self::Output {
        match self.find(key) {
            None => panic!("TrieMap::index: invalid key"),
            Some(value) => value,
        }
    }
}

impl<K, V, H, P> Debug for GenericTrieMap<K, V, H, P>
where
    K: Debug,
    V: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let mut d = f.debug_map();
        for (k, v) in self {
            d.entry(k, v);
        }
        d.finish()
    }
}

// Iterators

/// An iterator over the elements of a map.
pub struct Iter<'a, K, V, P: SharedPointerKind> {
    it: NodeIter<'a, K, V, P>,
}

// We impl Clone instead of deriving it, because we want Clone even if K and V aren't.
impl<'a, K, V, P: SharedPointerKind> Clone for Iter<'a, K, V, P> {
    fn clone(&self) -> Self {
        Iter {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, v, _)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, P: SharedPointerKind> ExactSizeIterator for Iter<'a, K, V, P> {}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Iter<'a, K, V, P> {}

/// A consuming iterator over the elements of a map.
pub struct ConsumingIter<K, V, P: SharedPointerKind> {
    it: NodeDrain<K, V, P>,
}

impl<K, V, P> Iterator for ConsumingIter<K, V, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, v, _)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> ExactSizeIterator for ConsumingIter<K, V, P> {}

impl<K: Clone, V: Clone, P: SharedPointerKind> FusedIterator for ConsumingIter<K, V, P> {}

/// An iterator over the keys of a map.
pub struct Keys<'a, K, V, P: SharedPointerKind> {
    it: NodeIter<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Keys<'a, K, V, P> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, P: SharedPointerKind> ExactSizeIterator for Keys<'a, K, V, P> {}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Keys<'a, K, V, P> {}

/// An iterator over the values of a map.
pub struct Values<'a, K, V, P: SharedPointerKind> {
    it: NodeIter<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Values<'a, K, V, P> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v, _)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, P: SharedPointerKind> ExactSizeIterator for Values<'a, K, V, P> {}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Values<'a, K, V, P> {}

impl<'a, K, V, H, P: SharedPointerKind> IntoIterator for &'a GenericTrieMap<K, V, H, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, H, P> IntoIterator for GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V);
    type IntoIter = ConsumingIter<K, V, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        ConsumingIter {
            it: NodeDrain::new(self.root.map(clone_ref), self.size),
        }
    }
}

// Conversions

impl<K, V, H, P> FromIterator<(K, V)> for GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from_iter<T>(i: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::default();
        for (k, v) in i {
            map = map.set_item(k, v);
        }
        map
    }
}

impl<K, V, H, P: SharedPointerKind> AsRef<GenericTrieMap<K, V, H, P>>
    for GenericTrieMap<K, V, H, P>
{
    #[inline]
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<K, V, OK, OV, HA, HB, P1, P2> From<&GenericTrieMap<&K, &V, HA, P1>>
    for GenericTrieMap<OK, OV, HB, P2>
where
    K: ToOwned<Owned = OK> + ?Sized,
    V: ToOwned<Owned = OV> + ?Sized,
    OK: Clone + Borrow<K>,
    OV: Clone + PartialEq + Borrow<V>,
    HB: Hashable<OK> + Default + Clone,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn from(m: &GenericTrieMap<&K, &V, HA, P1>) -> Self {
        m.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }
}

impl<'a, K, V, H, P> From<&'a [(K, V)]> for GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: &'a [(K, V)]) -> Self {
        m.iter().cloned().collect()
    }
}

impl<K, V, H, P> From<Vec<(K, V)>> for GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: Vec<(K, V)>) -> Self {
        m.into_iter().collect()
    }
}

impl<'a, K, V, H, P> From<&'a Vec<(K, V)>> for GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: &'a Vec<(K, V)>) -> Self {
        m.iter().cloned().collect()
    }
}

impl<K, V, H, S, P> From<collections::HashMap<K, V, S>> for GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    fn from(m: collections::HashMap<K, V, S>) -> Self {
        m.into_iter().collect()
    }
}

impl<'a, K, V, H, S, P> From<&'a collections::HashMap<K, V, S>> for GenericTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    fn from(m: &'a collections::HashMap<K, V, S>) -> Self {
        m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

// Tests
