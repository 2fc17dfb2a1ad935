// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A shared, thread safe cell holding a persistent map.
//!
//! An [`AtomicTrieMap`][AtomicTrieMap] always holds one current map.
//! Updates are computed against a snapshot without holding any lock, and
//! committed only if nobody else committed in the meantime. If someone
//! did, the update is recomputed against the newer map.
//!
//! Every committed update which changed something is published as a
//! [`MapPatch`][MapPatch] to the cell's subscribers.
//!
//! [AtomicTrieMap]: ./type.AtomicTrieMap.html
//! [MapPatch]: ../patch/struct.MapPatch.html

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::convert::Infallible;
use std::fmt::{Debug, Error, Formatter};
use std::sync::Arc;

use archery::SharedPointerKind;

use crate::change::Change;
use crate::error::MapError;
use crate::hash::map::GenericTrieMap;
use crate::hash::patch::MapPatch;
use crate::hashable::Hashable;
use crate::nodes::hamt::InsertMode;
use crate::shared_ptr::DefaultSharedPtr;
use crate::sync::Lock;

/// Type alias for [`GenericAtomicTrieMap`] with the default hasher and
/// pointer type.
///
/// [GenericAtomicTrieMap]: ./struct.GenericAtomicTrieMap.html
pub type AtomicTrieMap<K, V> = GenericAtomicTrieMap<K, V, RandomState, DefaultSharedPtr>;

/// A handle for removing a subscriber again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(u64);

type Subscriber<K, V, H, P> = Arc<dyn Fn(&MapPatch<K, V, H, P>) + Send + Sync>;

struct Subscribers<K, V, H, P: SharedPointerKind> {
    next_id: u64,
    list: Vec<(SubscriptionId, Subscriber<K, V, H, P>)>,
}

/// How an update describes its change, so the patch can be built once
/// the update has been committed.
enum Edit<K, V> {
    Key(K, Change<V>),
    Whole,
}

/// A thread safe cell holding a persistent map.
///
/// Cloning an `AtomicTrieMap` gives you another handle to the same cell.
///
/// # Examples
///
/// ```
/// # use std::sync::{Arc, Mutex};
/// # use tracking_trie::AtomicTrieMap;
/// let cell = AtomicTrieMap::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let log = seen.clone();
/// cell.subscribe(move |patch| log.lock().unwrap().push(patch.to_string()));
///
/// cell.set_item("a", 1);
/// cell.set_item("a", 1);
/// cell.remove("a");
/// assert_eq!(vec!["[a: +1]", "[a: -1]"], *seen.lock().unwrap());
/// assert!(cell.snapshot().is_empty());
/// ```
pub struct GenericAtomicTrieMap<K, V, H, P: SharedPointerKind> {
    cell: Lock<GenericTrieMap<K, V, H, P>>,
    subscribers: Lock<Subscribers<K, V, H, P>>,
}

impl<K, V, H, P> GenericAtomicTrieMap<K, V, H, P>
where
    K: Clone,
    V: Clone + PartialEq,
    H: Hashable<K> + Clone,
    P: SharedPointerKind,
{
    /// Construct a cell holding an empty map.
    #[must_use]
    pub fn new() -> Self
    where
        H: Default,
    {
        Self::from_map(GenericTrieMap::new())
    }

    /// Construct a cell holding an empty map with the given hasher.
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self::from_map(GenericTrieMap::with_hasher(hasher))
    }

    /// Construct a cell holding the given map.
    #[must_use]
    pub fn from_map(map: GenericTrieMap<K, V, H, P>) -> Self {
        GenericAtomicTrieMap {
            cell: Lock::new(map),
            subscribers: Lock::new(Subscribers {
                next_id: 0,
                list: Vec::new(),
            }),
        }
    }

    /// The map the cell currently holds.
    ///
    /// Time: O(1)
    #[must_use]
    pub fn snapshot(&self) -> GenericTrieMap<K, V, H, P> {
        self.cell.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cell.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell.lock().is_empty()
    }

    /// Get a copy of the current value for a key.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        self.snapshot().find(key).cloned()
    }

    /// Replace the map with the result of a function of it.
    ///
    /// The function may be called more than once, if another update
    /// commits while it's running, so it shouldn't have side effects.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tracking_trie::AtomicTrieMap;
    /// let cell = AtomicTrieMap::new();
    /// cell.set_item("hits", 1);
    /// let patch = cell.swap(|map| {
    ///     let hits = map.find("hits").copied().unwrap_or(0);
    ///     map.set_item("hits", hits + 1)
    /// });
    /// assert_eq!("[hits: 1 -> 2]", patch.to_string());
    /// ```
    pub fn swap<F>(&self, mut f: F) -> MapPatch<K, V, H, P>
    where
        F: FnMut(&GenericTrieMap<K, V, H, P>) -> GenericTrieMap<K, V, H, P>,
    {
        match self.commit(|map| Ok::<_, Infallible>((f(map), Edit::Whole))) {
            Ok(patch) => patch,
            Err(never) => match never {},
        }
    }

    /// Add a key, failing if it's already present.
    pub fn add(&self, key: K, value: V) -> Result<MapPatch<K, V, H, P>, MapError> {
        self.insert_with(key, value, InsertMode::Add)
    }

    /// Add a key, unless it's already present.
    pub fn try_add(&self, key: K, value: V) -> MapPatch<K, V, H, P> {
        self.insert_total(key, value, InsertMode::TryAdd)
    }

    /// Set a key to a value.
    pub fn set_item(&self, key: K, value: V) -> MapPatch<K, V, H, P> {
        self.insert_total(key, value, InsertMode::Upsert)
    }

    /// Remove a key, if it's present.
    pub fn remove<Q>(&self, key: &Q) -> MapPatch<K, V, H, P>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q>,
    {
        let result = self.commit(|map| {
            let stored = match map.find_key_value(key) {
                Some((stored, _)) => stored.clone(),
                None => return Ok::<_, Infallible>((map.clone(), Edit::Whole)),
            };
            let (next, change) = map.remove_tracked(key);
            Ok((next, Edit::Key(stored, change)))
        });
        match result {
            Ok(patch) => patch,
            Err(never) => match never {},
        }
    }

    /// Call `callback` with the patch of every update which changes the
    /// map from now on.
    ///
    /// Callbacks run on the thread which made the update, after the
    /// update has been committed and with no lock held. Two updates
    /// racing each other may publish their patches in either order.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&MapPatch<K, V, H, P>) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.lock();
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.list.push((id, Arc::new(callback)));
        tracing::debug!(?id, subscribers = subscribers.list.len(), "subscribed");
        id
    }

    /// Stop calling a subscriber. Returns false if it wasn't subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.list.len();
        subscribers.list.retain(|(other, _)| *other != id);
        let removed = subscribers.list.len() != before;
        tracing::debug!(?id, removed, "unsubscribed");
        removed
    }

    fn insert_with(
        &self,
        key: K,
        value: V,
        mode: InsertMode,
    ) -> Result<MapPatch<K, V, H, P>, MapError> {
        self.commit(|map| {
            let (next, change) = map.insert_tracked(key.clone(), value.clone(), mode)?;
            Ok((next, Edit::Key(key.clone(), change)))
        })
    }

    fn insert_total(&self, key: K, value: V, mode: InsertMode) -> MapPatch<K, V, H, P> {
        let result = self.commit(|map| {
            let (next, change) = map.insert_tracked_total(key.clone(), value.clone(), mode);
            Ok::<_, Infallible>((next, Edit::Key(key.clone(), change)))
        });
        match result {
            Ok(patch) => patch,
            Err(never) => match never {},
        }
    }

    /// Run an update until it commits against the map it was computed
    /// from. An update which leaves its snapshot untouched, or fails,
    /// commits nothing.
    fn commit<E, F>(&self, mut update: F) -> Result<MapPatch<K, V, H, P>, E>
    where
        F: FnMut(
            &GenericTrieMap<K, V, H, P>,
        ) -> Result<(GenericTrieMap<K, V, H, P>, Edit<K, V>), E>,
    {
        let mut attempts: usize = 0;
        loop {
            attempts += 1;
            let current = self.snapshot();
            let (next, edit) = update(&current)?;
            if next.ptr_eq(&current) {
                return Ok(MapPatch::unchanged(current));
            }
            {
                let mut cell = self.cell.lock();
                if !cell.ptr_eq(&current) {
                    tracing::trace!(attempts, "map changed during update, retrying");
                    continue;
                }
                *cell = next.clone();
            }
            tracing::debug!(attempts, size = next.len(), "committed map update");
            let patch = match edit {
                Edit::Key(key, change) => MapPatch::single(current, next, key, change),
                Edit::Whole => MapPatch::between(current, next),
            };
            self.publish(&patch);
            return Ok(patch);
        }
    }

    fn publish(&self, patch: &MapPatch<K, V, H, P>) {
        if patch.is_empty() {
            return;
        }
        let subscribers: Vec<_> = self
            .subscribers
            .lock()
            .list
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        tracing::debug!(
            subscribers = subscribers.len(),
            changed = patch.len(),
            "publishing map patch"
        );
        for callback in subscribers {
            callback(patch);
        }
    }
}

impl<K, V, H, P: SharedPointerKind> Clone for GenericAtomicTrieMap<K, V, H, P> {
    fn clone(&self) -> Self {
        GenericAtomicTrieMap {
            cell: self.cell.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<K, V, H, P> Default for GenericAtomicTrieMap<K, V, H, P>
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

impl<K, V, H, P> From<GenericTrieMap<K, V, H, P>> for GenericAtomicTrieMap<K, V, H, P>
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

impl<K, V, H, P> Debug for GenericAtomicTrieMap<K, V, H, P>
where
    K: Debug,
    V: Debug,
    H: Clone,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let map = self.cell.lock().clone();
        f.debug_tuple("AtomicTrieMap").field(&map).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;

    assert_impl_all!(AtomicTrieMap<i32, i32>: Send, Sync);

    fn counting<K, V, H, P>(cell: &GenericAtomicTrieMap<K, V, H, P>) -> Arc<AtomicUsize>
    where
        K: Clone,
        V: Clone + PartialEq,
        H: Hashable<K> + Clone,
        P: SharedPointerKind,
    {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        cell.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn single_key_updates() {
        let cell = AtomicTrieMap::new();
        let published = counting(&cell);

        let patch = cell.add(1, 10).unwrap();
        assert_eq!(Some(&Change::EntryAdded(10)), patch.change(&1));
        assert!(patch.from().is_empty());
        assert_eq!(Some(10), cell.find(&1));

        assert_eq!(MapError::DuplicateKey, cell.add(1, 11).unwrap_err());
        assert!(cell.try_add(1, 11).is_empty());
        assert!(cell.set_item(1, 10).is_empty());
        assert!(cell.remove(&2).is_empty());
        assert_eq!(1, published.load(Ordering::SeqCst));

        let patch = cell.set_item(1, 12);
        assert_eq!(Some(&Change::EntryMapped(10, 12)), patch.change(&1));
        let patch = cell.remove(&1);
        assert_eq!(Some(&Change::EntryRemoved(12)), patch.change(&1));
        assert!(cell.is_empty());
        assert_eq!(3, published.load(Ordering::SeqCst));
    }

    #[test]
    fn clones_share_the_cell() {
        let cell = AtomicTrieMap::new();
        let other = cell.clone();
        other.set_item("a", 1);
        assert_eq!(Some(1), cell.find("a"));
        assert!(cell.snapshot().ptr_eq(&other.snapshot()));
    }

    #[test]
    fn swap_publishes_the_difference() {
        let cell = AtomicTrieMap::from(triemap! {1 => 1, 2 => 2, 3 => 3});
        let published = counting(&cell);
        let patch = cell.swap(|map| map.filter(|key, _| key % 2 == 1).set_item(5, 5));
        assert_eq!(triemap! {1 => 1, 3 => 3, 5 => 5}, cell.snapshot());
        assert_eq!(
            triemap! {2 => Change::EntryRemoved(2), 5 => Change::EntryAdded(5)},
            patch.changes()
        );
        let patch = cell.swap(|map| map.clone());
        assert!(patch.is_empty());
        assert_eq!(1, published.load(Ordering::SeqCst));
    }

    #[test]
    fn unsubscribe() {
        let cell = AtomicTrieMap::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let id = cell.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        cell.set_item(1, 1);
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.set_item(2, 2);
        assert_eq!(1, count.load(Ordering::SeqCst));
    }

    #[test]
    fn concurrent_writers() {
        const THREADS: usize = 8;
        const KEYS: usize = 200;
        let cell: AtomicTrieMap<usize, usize> = AtomicTrieMap::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        cell.subscribe(move |patch| {
            let mut log = log.lock().unwrap();
            for (key, change) in patch.changes().iter() {
                log.push((*key, change.clone()));
            }
        });

        thread::scope(|scope| {
            for worker in 0..THREADS {
                let cell = cell.clone();
                scope.spawn(move || {
                    for key in (0..KEYS).map(|i| worker * KEYS + i) {
                        cell.set_item(key, key * 2);
                    }
                });
            }
        });

        let map = cell.snapshot();
        assert_eq!(THREADS * KEYS, map.len());
        map.check_invariants().unwrap();
        for key in 0..THREADS * KEYS {
            assert_eq!(Some(&(key * 2)), map.find(&key));
        }
        let mut seen = seen.lock().unwrap().clone();
        seen.sort_by_key(|(key, _)| *key);
        let expected: Vec<_> = (0..THREADS * KEYS)
            .map(|key| (key, Change::EntryAdded(key * 2)))
            .collect();
        assert_eq!(expected, seen);
    }

    #[test]
    fn contended_swaps_all_land() {
        const THREADS: usize = 8;
        const ROUNDS: usize = 100;
        let cell = AtomicTrieMap::new();
        let published = counting(&cell);
        thread::scope(|scope| {
            for _ in 0..THREADS {
                let cell = cell.clone();
                scope.spawn(move || {
                    for _ in 0..ROUNDS {
                        cell.swap(|map| {
                            let count = map.find("count").copied().unwrap_or(0);
                            map.set_item("count", count + 1)
                        });
                    }
                });
            }
        });
        assert_eq!(Some(THREADS * ROUNDS), cell.find("count"));
        assert_eq!(THREADS * ROUNDS, published.load(Ordering::SeqCst));
    }
}
