// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pluggable key hashing and equality.
//!
//! A trie doesn't hash or compare keys by itself: every map carries a
//! [`Hashable`] value which does both, so a map can be given its own idea
//! of which keys are the same (case insensitive strings, say) without the
//! trie engine knowing about it.
//!
//! Every [`BuildHasher`][BuildHasher] is a `Hashable` for keys implementing
//! [`Hash`][Hash] and [`Eq`][Eq], which is what you get by default.
//!
//! [BuildHasher]: https://doc.rust-lang.org/std/hash/trait.BuildHasher.html
//! [Hash]: https://doc.rust-lang.org/std/hash/trait.Hash.html
//! [Eq]: https://doc.rust-lang.org/std/cmp/trait.Eq.html

use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, Hash, Hasher};

use crate::nodes::hamt::HashBits;

/// Hash a key with a [`BuildHasher`][BuildHasher], truncated to the width
/// of a trie hash.
///
/// [BuildHasher]: https://doc.rust-lang.org/std/hash/trait.BuildHasher.html
pub fn hash_key<K: Hash + ?Sized, S: BuildHasher>(bh: &S, key: &K) -> HashBits {
    let mut hasher = bh.build_hasher();
    key.hash(&mut hasher);
    hasher.finish() as HashBits
}

/// A key hashing and equality capability.
///
/// Implementations must be consistent: keys which are `key_eq` must have
/// the same `hash_key`, and the same `stable_hash`.
///
/// `stable_hash` is what hashing a whole map uses, so it mustn't depend on
/// any per-map state such as a random seed: equal maps have to hash the
/// same even when they were built with different capabilities.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate tracking_trie;
/// # use tracking_trie::{GenericTrieMap, Hashable, HashBits};
/// # use tracking_trie::shared_ptr::DefaultSharedPtr;
/// #[derive(Clone, Default)]
/// struct IgnoreCase;
///
/// impl Hashable<str> for IgnoreCase {
///     fn hash_key(&self, key: &str) -> HashBits {
///         key.bytes().fold(17u32, |acc, byte| {
///             acc.wrapping_mul(31).wrapping_add(byte.to_ascii_lowercase() as u32)
///         })
///     }
///
///     fn key_eq(&self, left: &str, right: &str) -> bool {
///         left.eq_ignore_ascii_case(right)
///     }
///
///     fn stable_hash(&self, key: &str) -> u64 {
///         u64::from(Hashable::<str>::hash_key(self, key))
///     }
/// }
///
/// impl Hashable<String> for IgnoreCase {
///     fn hash_key(&self, key: &String) -> HashBits {
///         Hashable::<str>::hash_key(self, key)
///     }
///
///     fn key_eq(&self, left: &String, right: &String) -> bool {
///         Hashable::<str>::key_eq(self, left, right)
///     }
///
///     fn stable_hash(&self, key: &String) -> u64 {
///         Hashable::<str>::stable_hash(self, key)
///     }
/// }
///
/// let map: GenericTrieMap<String, i32, IgnoreCase, DefaultSharedPtr> =
///     GenericTrieMap::with_hasher(IgnoreCase).set_item("Hello".to_string(), 1);
/// assert_eq!(Some(&1), map.find("HELLO"));
/// ```
pub trait Hashable<K: ?Sized> {
    /// Hash a key.
    fn hash_key(&self, key: &K) -> HashBits;

    /// Test two keys for equality.
    fn key_eq(&self, left: &K, right: &K) -> bool;

    /// Hash a key the same way in every map, for hashing map contents.
    fn stable_hash(&self, key: &K) -> u64;
}

impl<K, S> Hashable<K> for S
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> HashBits {
        hash_key(self, key)
    }

    #[inline]
    fn key_eq(&self, left: &K, right: &K) -> bool {
        left == right
    }

    #[inline]
    fn stable_hash(&self, key: &K) -> u64 {
        stable_hash(key)
    }
}

/// A hasher with fixed keys, for hashes which must agree between maps
/// built with different [`RandomState`][RandomState]s.
///
/// [RandomState]: https://doc.rust-lang.org/std/collections/hash_map/struct.RandomState.html
pub(crate) fn stable_hash<A: Hash + ?Sized>(value: &A) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
