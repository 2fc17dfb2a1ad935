// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Persistent hash tries with change tracking
//!
//! This crate provides a persistent map built on a hash array mapped trie,
//! along with a few ways of keeping track of how such a map changes over
//! time.
//!
//! ## Persistence
//!
//! Every operation on a [`TrieMap`][TrieMap] which would change it returns
//! a new map instead, and leaves the old one exactly as it was. The two
//! versions share every part of the trie the operation didn't touch, so
//! an update costs a handful of node copies along the path to the key, not
//! a copy of the whole map. Cloning a map is a single reference count
//! bump.
//!
//! An operation which turns out not to change anything, like removing a
//! key which isn't there or setting a key to the value it already has,
//! hands back the original map, which you can detect with
//! [`ptr_eq`][ptr_eq].
//!
//! ## Changes and patches
//!
//! The `_tracked` variants of the mutating operations report what they did
//! to the key as a [`Change`][Change]. A [`MapPatch`][MapPatch] bundles
//! the map before and after an update with the changes that take one to
//! the other.
//!
//! A [`TrackingTrieMap`][TrackingTrieMap] accumulates the net change to
//! every key across a sequence of updates, and an
//! [`AtomicTrieMap`][AtomicTrieMap] is a shared cell which threads can
//! update concurrently, publishing a patch for every update to whoever
//! subscribed.
//!
//! ## Hashing
//!
//! Keys are hashed down to 32 bits, which are consumed five at a time on
//! the way down the trie. Keys whose hashes are identical live together in
//! a collision node at the bottom. How keys are hashed and compared is up
//! to the map's [`Hashable`][Hashable], which is any `BuildHasher` unless
//! you say otherwise.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! | ------- | ----------- |
//! | `debug` | Exposes [`check_invariants`][check_invariants] for validating a trie's structure |
//! | [`proptest`](https://crates.io/crates/proptest) | Strategies for all types under `proptest::*` |
//! | [`quickcheck`](https://crates.io/crates/quickcheck) | [`quickcheck::Arbitrary`](https://docs.rs/quickcheck/latest/quickcheck/trait.Arbitrary.html) implementation for `TrieMap` |
//! | [`rayon`](https://crates.io/crates/rayon) | parallel iterator implementation for `TrieMap` |
//! | [`serde`](https://crates.io/crates/serde) | [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) implementations for `TrieMap` |
//! | [`arbitrary`](https://crates.io/crates/arbitrary/) | [`arbitrary::Arbitrary`](https://docs.rs/arbitrary/latest/arbitrary/trait.Arbitrary.html) implementation for `TrieMap` |
//! | [`triomphe`](https://crates.io/crates/triomphe/) | Use [`triomphe::Arc`](https://docs.rs/triomphe/latest/triomphe/struct.Arc.html) as the default reference type |
//!
//! [TrieMap]: ./triemap/type.TrieMap.html
//! [ptr_eq]: ./triemap/struct.GenericTrieMap.html#method.ptr_eq
//! [check_invariants]: ./triemap/struct.GenericTrieMap.html#method.check_invariants
//! [Change]: ./enum.Change.html
//! [MapPatch]: ./patch/struct.MapPatch.html
//! [TrackingTrieMap]: ./tracking/type.TrackingTrieMap.html
//! [AtomicTrieMap]: ./atomic/type.AtomicTrieMap.html
//! [Hashable]: ./hashable/trait.Hashable.html

#![deny(unsafe_code, nonstandard_style)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod util;

mod config;
mod nodes;
mod sync;

pub mod bits;
pub mod change;
pub mod error;
pub mod hashable;
pub mod shared_ptr;

#[macro_use]
mod hash;

pub use crate::hash::atomic;
pub use crate::hash::map as triemap;
pub use crate::hash::patch;
pub use crate::hash::tracking;

pub use crate::change::Change;
pub use crate::error::{InvariantError, MapError};
pub use crate::hash::atomic::{AtomicTrieMap, GenericAtomicTrieMap, SubscriptionId};
pub use crate::hash::map::{GenericTrieMap, TrieMap};
pub use crate::hash::patch::MapPatch;
pub use crate::hash::tracking::{GenericTrackingTrieMap, TrackingTrieMap};
pub use crate::hashable::Hashable;
pub use crate::nodes::hamt::{HashBits, InsertMode};

#[cfg(any(test, feature = "proptest"))]
#[cfg_attr(docsrs, doc(cfg(feature = "proptest")))]
pub mod proptest;

#[cfg(any(test, feature = "serde"))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[doc(hidden)]
pub mod ser;

#[cfg(feature = "arbitrary")]
#[cfg_attr(docsrs, doc(cfg(feature = "arbitrary")))]
#[doc(hidden)]
pub mod arbitrary;

#[cfg(feature = "quickcheck")]
#[cfg_attr(docsrs, doc(cfg(feature = "quickcheck")))]
#[doc(hidden)]
pub mod quickcheck;

#[cfg(any(test, feature = "rayon"))]
#[cfg_attr(docsrs, doc(cfg(feature = "rayon")))]
pub mod rayon;
