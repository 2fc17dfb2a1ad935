// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bit twiddling for trie addressing.
//!
//! A key's hash is consumed five bits at a time. Each five bit slice picks
//! one of 32 slots in a node, and a node's bitmap records which of those
//! slots are populated. Children are stored densely, so the position of a
//! slot's child is the number of populated slots below it.

use crate::config::{HASH_BITS, HASH_LEVEL_SIZE};

/// The mask for a single section of a hash.
const SECTION_MASK: u32 = (1 << HASH_LEVEL_SIZE) - 1;

/// Set or clear a single bit.
#[inline]
#[must_use]
pub const fn set(value: u32, bit: u32, flag: bool) -> u32 {
    if flag {
        value | bit
    } else {
        value & !bit
    }
}

/// Test a single bit.
#[inline]
#[must_use]
pub const fn get(value: u32, bit: u32) -> bool {
    value & bit != 0
}

/// Extract the five bit slice of `data` that `sec` points at.
///
/// An exhausted cursor has nothing left to extract and always yields zero.
#[inline]
#[must_use]
pub const fn section(data: u32, sec: Sec) -> u32 {
    match data.checked_shr(sec.offset as u32) {
        Some(bits) => bits & SECTION_MASK,
        None => 0,
    }
}

/// Count the set bits in a word.
///
/// This is the classic parallel bit count: sum adjacent bits in pairs,
/// then nibbles, then gather the byte sums with a multiply.
#[inline]
#[must_use]
pub const fn count(bits: u32) -> u32 {
    let bits = bits - ((bits >> 1) & 0x5555_5555);
    let bits = (bits & 0x3333_3333) + ((bits >> 2) & 0x3333_3333);
    let bits = (bits + (bits >> 4)) & 0x0f0f_0f0f;
    bits.wrapping_mul(0x0101_0101) >> 24
}

/// The single bit representing slot `index` in a bitmap.
#[inline]
#[must_use]
pub const fn mask(index: u32) -> u32 {
    1 << index
}

/// The dense array position of `bit` in `bitmap`.
#[inline]
#[must_use]
pub const fn index(bitmap: u32, bit: u32) -> usize {
    count(bitmap & (bit - 1)) as usize
}

/// A cursor over the sections of a hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Sec {
    offset: usize,
}

impl Sec {
    /// The first section of a hash, used at the root of a trie.
    pub const ROOT: Sec = Sec { offset: 0 };

    /// The bit offset of this section.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// The section after this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Sec {
        Sec {
            offset: self.offset + HASH_LEVEL_SIZE,
        }
    }

    /// The depth of a node addressed by this section, counting the root
    /// as level zero.
    #[inline]
    #[must_use]
    pub const fn depth(self) -> usize {
        self.offset / HASH_LEVEL_SIZE
    }

    /// Whether this cursor has run past the end of the hash.
    ///
    /// Keys whose hashes agree in every section can't be told apart by
    /// slicing, and end up in a collision list at this point.
    #[inline]
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        self.offset >= HASH_BITS
    }

    /// The slot a hash routes to at this section.
    #[inline]
    #[must_use]
    pub const fn index(self, hash: u32) -> u32 {
        section(hash, self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::MAX_DEPTH;
    use ::proptest::{num::u32, proptest};

    #[test]
    fn count_edges() {
        assert_eq!(0, count(0));
        assert_eq!(32, count(0xffff_ffff));
        assert_eq!(1, count(1));
        assert_eq!(1, count(0x8000_0000));
        assert_eq!(16, count(0xaaaa_aaaa));
        assert_eq!(16, count(0x5555_5555));
    }

    #[test]
    fn set_and_get() {
        let value = set(0, mask(3), true);
        assert_eq!(0b1000, value);
        assert!(get(value, mask(3)));
        assert!(!get(value, mask(4)));
        assert_eq!(0, set(value, mask(3), false));
        assert_eq!(value, set(value, mask(3), true));
    }

    #[test]
    fn dense_index() {
        let bitmap = mask(1) | mask(4) | mask(31);
        assert_eq!(0, index(bitmap, mask(1)));
        assert_eq!(1, index(bitmap, mask(4)));
        assert_eq!(2, index(bitmap, mask(31)));
        assert_eq!(0, index(bitmap, mask(0)));
    }

    #[test]
    fn sections_cover_the_hash() {
        let hash = 0b11_00001_00010_00011_00100_00101_00110;
        let mut sec = Sec::ROOT;
        let mut slots = Vec::new();
        loop {
            slots.push(sec.index(hash));
            if sec.next().is_exhausted() {
                break;
            }
            sec = sec.next();
        }
        assert_eq!(vec![6, 5, 4, 3, 2, 1, 3], slots);
        assert_eq!(MAX_DEPTH, slots.len());
        assert_eq!(MAX_DEPTH - 1, sec.depth());
        assert_eq!(30, sec.offset());
    }

    proptest! {
        #[test]
        fn count_matches_popcount(bits in u32::ANY) {
            assert_eq!(bits.count_ones(), count(bits));
        }

        #[test]
        fn sections_reassemble(hash in u32::ANY) {
            let mut sec = Sec::ROOT;
            let mut rebuilt = 0u32;
            loop {
                rebuilt |= sec.index(hash) << sec.offset();
                sec = sec.next();
                if sec.is_exhausted() {
                    break;
                }
            }
            assert_eq!(hash, rebuilt);
        }
    }
}
