#![no_main]

use std::collections::HashMap as NatMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tracking_trie::{Change, MapError, TrackingTrieMap, TrieMap};

#[derive(Arbitrary, Debug)]
enum Action<K, V> {
    SetItem(K, V),
    Add(K, V),
    TryAdd(K, V),
    Replace(K, V),
    Remove(K),
    Snapshot,
}

fuzz_target!(|actions: Vec<Action<u16, u8>>| {
    let mut map: TrieMap<u16, u8> = TrieMap::new();
    let mut nat = NatMap::new();
    let mut tracked = TrackingTrieMap::new();
    let mut base = map.clone();
    for action in actions {
        let before = map.clone();
        match action {
            Action::SetItem(key, value) => {
                let (next, change) = map.set_item_tracked(key, value);
                let expected = match nat.insert(key, value) {
                    None => Change::EntryAdded(value),
                    Some(old) if old == value => Change::NoChange,
                    Some(old) => Change::EntryMapped(old, value),
                };
                assert_eq!(expected, change);
                map = next;
                tracked = tracked.set_item(key, value);
            }
            Action::Add(key, value) => match map.add(key, value) {
                Ok(next) => {
                    assert!(nat.insert(key, value).is_none());
                    map = next;
                    tracked = tracked.add(key, value).expect("tracking map agrees");
                }
                Err(err) => {
                    assert_eq!(MapError::DuplicateKey, err);
                    assert!(nat.contains_key(&key));
                }
            },
            Action::TryAdd(key, value) => {
                map = map.try_add(key, value);
                nat.entry(key).or_insert(value);
                tracked = tracked.try_add(key, value);
            }
            Action::Replace(key, value) => match map.replace(key, value) {
                Ok(next) => {
                    assert!(nat.insert(key, value).is_some());
                    map = next;
                    tracked = tracked.set_item(key, value);
                }
                Err(err) => {
                    assert_eq!(MapError::KeyNotFound, err);
                    assert!(!nat.contains_key(&key));
                }
            },
            Action::Remove(key) => {
                let (next, change) = map.remove_tracked(&key);
                match nat.remove(&key) {
                    Some(old) => assert_eq!(Change::EntryRemoved(old), change),
                    None => {
                        assert_eq!(Change::NoChange, change);
                        assert!(next.ptr_eq(&map));
                    }
                }
                map = next;
                tracked = tracked.remove(&key);
            }
            Action::Snapshot => {
                tracked = tracked.snapshot();
                base = map.clone();
            }
        }
        map.check_invariants().expect("trie invariants hold");
        assert!(before.check_invariants().is_ok());
        assert_eq!(nat.len(), map.len());
        assert_eq!(&map, tracked.map());
        assert_eq!(base.diff(&map), *tracked.changes());
    }
    assert_eq!(TrieMap::from(nat.clone()), map);
    assert_eq!(map.iter().count(), nat.len());
    for (key, value) in &nat {
        assert_eq!(Some(value), map.find(key));
    }
    assert_eq!(map.into_iter().count(), nat.len());
});
