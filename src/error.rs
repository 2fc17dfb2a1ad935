// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types.

use thiserror::Error;

/// Failures surfaced by map operations which require a key to be
/// present, or absent.
///
/// Lookups, [`try_add`][try_add] and [`remove`][remove] never fail: they
/// return `None` or the unchanged map instead.
///
/// [try_add]: ../triemap/struct.GenericTrieMap.html#method.try_add
/// [remove]: ../triemap/struct.GenericTrieMap.html#method.remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MapError {
    #[error("key already exists in map")]
    DuplicateKey,
    #[error("key not found in map")]
    KeyNotFound,
}

/// A broken structural invariant inside a trie.
///
/// These can only be observed through `check_invariants`, and any of them
/// showing up means there is a bug in the trie engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("bitmap has {bits} bits set but node holds {items} items (offset {offset})")]
    BitmapMismatch {
        offset: usize,
        bits: usize,
        items: usize,
    },
    #[error("empty node stored as a child (offset {offset})")]
    EmptyChild { offset: usize },
    #[error("node at offset {offset} holds a single leaf and should have been collapsed")]
    DegenerateNode { offset: usize },
    #[error("leaf with hash {hash:#010x} stored under prefix {prefix:#010x} at offset {offset}")]
    MisroutedLeaf {
        hash: u32,
        prefix: u32,
        offset: usize,
    },
    #[error("collision list found at offset {offset} with hash bits left to slice")]
    MisplacedCollision { offset: usize },
    #[error("collision list holds {len} entries, needs at least two")]
    ShortCollision { len: usize },
    #[error("collision list for hash {expected:#010x} holds a key hashing to {found:#010x}")]
    CollisionHashMismatch { expected: u32, found: u32 },
    #[error("collision list for hash {hash:#010x} holds the same key twice")]
    DuplicateCollisionKey { hash: u32 },
    #[error("entry stored with hash {stored:#010x} but its key hashes to {actual:#010x}")]
    StaleHash { stored: u32, actual: u32 },
    #[error("trie descends {depth} levels, limit is {limit}")]
    TooDeep { depth: usize, limit: usize },
    #[error("map reports {reported} entries but holds {counted}")]
    SizeMismatch { reported: usize, counted: usize },
}
