// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Proptest strategies.
//!
//! These are only available when using the `proptest` feature flag.

use crate::{Change, TrieMap};
use ::proptest::collection::vec;
use ::proptest::prelude::{prop_oneof, Just, Strategy};
use ::proptest::strategy::BoxedStrategy;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Range;

/// A strategy for a [`TrieMap`][TrieMap] of a given size.
///
/// # Examples
///
/// ```rust,no_run
/// # use ::proptest::proptest;
/// # use tracking_trie::proptest::trie_map;
/// proptest! {
///     #[test]
///     fn proptest_works(ref m in trie_map(0..9999, ".*", 10..100)) {
///         assert!(m.len() < 100);
///         assert!(m.len() >= 10);
///     }
/// }
/// ```
///
/// [TrieMap]: ../triemap/type.TrieMap.html
pub fn trie_map<K: Strategy + 'static, V: Strategy + 'static>(
    key: K,
    value: V,
    size: Range<usize>,
) -> BoxedStrategy<TrieMap<<K as Strategy>::Value, <V as Strategy>::Value>>
where
    <K as Strategy>::Value: Hash + Eq + Clone + Debug,
    <V as Strategy>::Value: Clone + PartialEq + Debug,
{
    vec((key, value), size.clone())
        .prop_map(TrieMap::from)
        .prop_filter("TrieMap minimum size".to_owned(), move |m| {
            m.len() >= size.start
        })
        .boxed()
}

/// A strategy for a [`Change`][Change] carrying values from `value`,
/// including [`NoChange`][Change::NoChange].
///
/// [Change]: ../enum.Change.html
pub fn change<V>(value: V) -> BoxedStrategy<Change<<V as Strategy>::Value>>
where
    V: Strategy + Clone + 'static,
    <V as Strategy>::Value: Clone + Debug,
{
    prop_oneof![
        Just(Change::NoChange),
        value.clone().prop_map(Change::EntryAdded),
        value.clone().prop_map(Change::EntryRemoved),
        (value.clone(), value).prop_map(|(old, new)| Change::EntryMapped(old, new)),
    ]
    .boxed()
}
