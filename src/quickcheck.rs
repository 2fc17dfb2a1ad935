// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{hashable::Hashable, shared_ptr::SharedPointerKind, Change, GenericTrieMap};
use ::quickcheck::{Arbitrary, Gen};

impl<K, V, H, P> Arbitrary for GenericTrieMap<K, V, H, P>
where
    K: Clone + Arbitrary + Sync,
    V: Clone + PartialEq + Arbitrary + Sync,
    H: Hashable<K> + Clone + Default + Send + Sync + 'static,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(g: &mut Gen) -> Self {
        GenericTrieMap::from(Vec::<(K, V)>::arbitrary(g))
    }
}

impl<V: Arbitrary> Arbitrary for Change<V> {
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0u8, 1, 2, 3]).copied().unwrap_or(0) {
            0 => Change::NoChange,
            1 => Change::EntryAdded(V::arbitrary(g)),
            2 => Change::EntryRemoved(V::arbitrary(g)),
            _ => Change::EntryMapped(V::arbitrary(g), V::arbitrary(g)),
        }
    }
}
