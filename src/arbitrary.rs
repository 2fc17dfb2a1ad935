// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use arbitrary::{size_hint, Arbitrary, Result, Unstructured};

use crate::{change::Change, hashable::Hashable, shared_ptr::SharedPointerKind, GenericTrieMap};

impl<'a, K, V, H, P> Arbitrary<'a> for GenericTrieMap<K, V, H, P>
where
    K: Arbitrary<'a> + Clone,
    V: Arbitrary<'a> + Clone + PartialEq,
    H: Hashable<K> + Clone + Default + 'static,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        u.arbitrary_iter()?.collect()
    }

    fn arbitrary_take_rest(u: Unstructured<'a>) -> Result<Self> {
        u.arbitrary_take_rest_iter()?.collect()
    }

    fn size_hint(depth: usize) -> (usize, Option<usize>) {
        size_hint::recursion_guard(depth, |depth| {
            size_hint::and(<usize as Arbitrary>::size_hint(depth), (0, None))
        })
    }
}

impl<'a, V: Arbitrary<'a>> Arbitrary<'a> for Change<V> {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        Ok(match u.int_in_range(0..=3u8)? {
            0 => Change::NoChange,
            1 => Change::EntryAdded(V::arbitrary(u)?),
            2 => Change::EntryRemoved(V::arbitrary(u)?),
            _ => Change::EntryMapped(V::arbitrary(u)?, V::arbitrary(u)?),
        })
    }

    fn size_hint(depth: usize) -> (usize, Option<usize>) {
        size_hint::recursion_guard(depth, |depth| {
            let value = V::size_hint(depth);
            let payload = size_hint::and(value, value);
            size_hint::and(<u8 as Arbitrary>::size_hint(depth), (0, payload.1))
        })
    }
}
