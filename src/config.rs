// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// The level size of the trie, in bits.
/// Branching factor is 2 ^ HASH_LEVEL_SIZE.
pub(crate) const HASH_LEVEL_SIZE: usize = 5;

/// The width of a key hash, in bits.
pub(crate) const HASH_BITS: usize = 32;

/// The number of sections a hash is sliced into, and so the deepest
/// a lookup can descend before it reaches a leaf or a collision list.
// ceil(32 / 5): the last section only has two significant bits.
pub(crate) const MAX_DEPTH: usize = (HASH_BITS + HASH_LEVEL_SIZE - 1) / HASH_LEVEL_SIZE;
