// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use archery::SharedPointerKind;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeTupleVariant, Serializer};
use std::fmt;
use std::marker::PhantomData;

use crate::change::Change;
use crate::hashable::Hashable;
use crate::triemap::GenericTrieMap;

struct MapVisitor<'de, S, K, V> {
    phantom_s: PhantomData<S>,
    phantom_k: PhantomData<K>,
    phantom_v: PhantomData<V>,
    phantom_lifetime: PhantomData<&'de ()>,
}

impl<'de, S, K, V> MapVisitor<'de, S, K, V> {
    pub(crate) fn new() -> MapVisitor<'de, S, K, V> {
        MapVisitor {
            phantom_s: PhantomData,
            phantom_k: PhantomData,
            phantom_v: PhantomData,
            phantom_lifetime: PhantomData,
        }
    }
}

impl<'de, S, K, V> Visitor<'de> for MapVisitor<'de, S, K, V>
where
    S: From<Vec<(K, V)>>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = S;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<Access>(self, mut access: Access) -> Result<Self::Value, Access::Error>
    where
        Access: MapAccess<'de>,
    {
        let mut v: Vec<(K, V)> = match access.size_hint() {
            None => Vec::new(),
            Some(l) => Vec::with_capacity(l),
        };
        while let Some(i) = access.next_entry()? {
            v.push(i)
        }
        Ok(From::from(v))
    }
}

// Map

impl<'de, K, V, H, P> Deserialize<'de> for GenericTrieMap<K, V, H, P>
where
    K: Deserialize<'de> + Clone,
    V: Deserialize<'de> + Clone + PartialEq,
    H: Hashable<K> + Default + Clone,
    P: SharedPointerKind,
{
    fn deserialize<D>(des: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        des.deserialize_map(MapVisitor::<'de, GenericTrieMap<K, V, H, P>, K, V>::new())
    }
}

impl<K, V, H, P> Serialize for GenericTrieMap<K, V, H, P>
where
    K: Serialize,
    V: Serialize,
    P: SharedPointerKind,
{
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            s.serialize_entry(k, v)?;
        }
        s.end()
    }
}

// Change

impl<V: Serialize> Serialize for Change<V> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Change::NoChange => ser.serialize_unit_variant("Change", 0, "NoChange"),
            Change::EntryAdded(v) => ser.serialize_newtype_variant("Change", 1, "EntryAdded", v),
            Change::EntryRemoved(v) => {
                ser.serialize_newtype_variant("Change", 2, "EntryRemoved", v)
            }
            Change::EntryMapped(old, new) => {
                let mut s = ser.serialize_tuple_variant("Change", 3, "EntryMapped", 2)?;
                s.serialize_field(old)?;
                s.serialize_field(new)?;
                s.end()
            }
        }
    }
}

// Tests

#[cfg(test)]
mod test {
    use crate::{proptest::trie_map, Change, TrieMap};
    use ::proptest::num::i32;
    use ::proptest::proptest;
    use serde_json::{from_str, to_string};

    #[test]
    fn ser_changes() {
        let changes: TrieMap<i32, Change<i32>> = triemap! {1 => Change::EntryMapped(2, 3)};
        assert_eq!(r#"{"1":{"EntryMapped":[2,3]}}"#, to_string(&changes).unwrap());
        assert_eq!(r#""NoChange""#, to_string(&Change::<i32>::NoChange).unwrap());
        assert_eq!(r#"{"EntryAdded":5}"#, to_string(&Change::EntryAdded(5)).unwrap());
    }

    #[test]
    fn de_duplicate_keys_keep_the_last() {
        let map: TrieMap<String, i32> = from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        assert_eq!(triemap! {"a".to_string() => 3, "b".to_string() => 2}, map);
    }

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn ser_trie_map(ref v in trie_map(i32::ANY, i32::ANY, 0..100)) {
            assert_eq!(v, &from_str::<TrieMap<i32, i32>>(&to_string(&v).unwrap()).unwrap());
        }
    }
}
