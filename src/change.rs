// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The effect of a single map mutation on a single key.

use std::fmt::{Display, Error, Formatter};

/// What happened to a key's value when a map was changed.
///
/// Every tracked mutation of a [`GenericTrieMap`][GenericTrieMap] reports
/// one of these for the key it touched. Writes which leave the map as it
/// was, such as setting a key to the value it already has, report
/// [`NoChange`][Change::NoChange] so observers aren't told about them.
///
/// # Examples
///
/// ```
/// # use tracking_trie::{Change, TrieMap};
/// let map = TrieMap::new();
/// let (map, change) = map.set_item_tracked("x", 1);
/// assert_eq!(Change::EntryAdded(1), change);
/// let (map, change) = map.set_item_tracked("x", 2);
/// assert_eq!(Change::EntryMapped(1, 2), change);
/// let (_, change) = map.remove_tracked("x");
/// assert_eq!(Change::EntryRemoved(2), change);
/// ```
///
/// [GenericTrieMap]: ../triemap/struct.GenericTrieMap.html
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Change<V> {
    /// The map was left as it was.
    NoChange,
    /// The key was added with this value.
    EntryAdded(V),
    /// The key was removed, and had this value.
    EntryRemoved(V),
    /// The key's value was replaced: old value first, then new.
    EntryMapped(V, V),
}

impl<V> Default for Change<V> {
    fn default() -> Self {
        Change::NoChange
    }
}

impl<V> Change<V> {
    /// Construct the change for a value being replaced, which is no change
    /// at all if the two values are equal.
    #[must_use]
    pub fn mapped(old: V, new: V) -> Self
    where
        V: PartialEq,
    {
        if old == new {
            Change::NoChange
        } else {
            Change::EntryMapped(old, new)
        }
    }

    /// Test whether this records an actual change.
    #[inline]
    #[must_use]
    pub fn has_changed(&self) -> bool {
        !self.has_no_change()
    }

    /// Test whether this is [`NoChange`][Change::NoChange].
    #[inline]
    #[must_use]
    pub fn has_no_change(&self) -> bool {
        matches!(self, Change::NoChange)
    }

    #[inline]
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Change::EntryAdded(_))
    }

    #[inline]
    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(self, Change::EntryRemoved(_))
    }

    #[inline]
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        matches!(self, Change::EntryMapped(_, _))
    }

    /// The value the key had before the change, if it was present.
    #[must_use]
    pub fn old_value(&self) -> Option<&V> {
        match self {
            Change::EntryRemoved(old) | Change::EntryMapped(old, _) => Some(old),
            Change::NoChange | Change::EntryAdded(_) => None,
        }
    }

    /// The value the key has after the change, if it is present.
    ///
    /// A [`NoChange`][Change::NoChange] doesn't carry the value, so this
    /// returns `None` for it even if the key is in the map.
    #[must_use]
    pub fn new_value(&self) -> Option<&V> {
        match self {
            Change::EntryAdded(new) | Change::EntryMapped(_, new) => Some(new),
            Change::NoChange | Change::EntryRemoved(_) => None,
        }
    }

    /// Borrow the values of a change.
    #[must_use]
    pub fn as_ref(&self) -> Change<&V> {
        match self {
            Change::NoChange => Change::NoChange,
            Change::EntryAdded(new) => Change::EntryAdded(new),
            Change::EntryRemoved(old) => Change::EntryRemoved(old),
            Change::EntryMapped(old, new) => Change::EntryMapped(old, new),
        }
    }

    /// Transform the values of a change.
    #[must_use]
    pub fn map<U, F>(self, mut f: F) -> Change<U>
    where
        F: FnMut(V) -> U,
    {
        match self {
            Change::NoChange => Change::NoChange,
            Change::EntryAdded(new) => Change::EntryAdded(f(new)),
            Change::EntryRemoved(old) => Change::EntryRemoved(f(old)),
            Change::EntryMapped(old, new) => Change::EntryMapped(f(old), f(new)),
        }
    }

    /// Collapse two successive changes to the same key into their net
    /// effect.
    ///
    /// `self` is the earlier change and `later` the one which followed it.
    /// Adding then removing a key nets out to no change, as does replacing
    /// a value and then putting the original back.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tracking_trie::Change;
    /// assert_eq!(
    ///     Change::EntryAdded(2),
    ///     Change::EntryAdded(1).combine(Change::EntryMapped(1, 2))
    /// );
    /// assert_eq!(
    ///     Change::NoChange,
    ///     Change::EntryAdded(1).combine(Change::EntryRemoved(1))
    /// );
    /// assert_eq!(
    ///     Change::NoChange,
    ///     Change::EntryRemoved(1).combine(Change::EntryAdded(1))
    /// );
    /// ```
    #[must_use]
    pub fn combine(self, later: Change<V>) -> Change<V>
    where
        V: PartialEq,
    {
        match (self, later) {
            (Change::NoChange, later) => later,
            (earlier, Change::NoChange) => earlier,
            (Change::EntryAdded(_), Change::EntryRemoved(_)) => Change::NoChange,
            (Change::EntryAdded(_), Change::EntryAdded(new))
            | (Change::EntryAdded(_), Change::EntryMapped(_, new)) => Change::EntryAdded(new),
            (Change::EntryRemoved(old), Change::EntryRemoved(_))
            | (Change::EntryMapped(old, _), Change::EntryRemoved(_)) => Change::EntryRemoved(old),
            (Change::EntryRemoved(old), Change::EntryAdded(new))
            | (Change::EntryRemoved(old), Change::EntryMapped(_, new))
            | (Change::EntryMapped(old, _), Change::EntryAdded(new))
            | (Change::EntryMapped(old, _), Change::EntryMapped(_, new)) => {
                Change::mapped(old, new)
            }
        }
    }
}

impl<V: Display> Display for Change<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Change::NoChange => write!(f, "No Change"),
            Change::EntryAdded(new) => write!(f, "+{}", new),
            Change::EntryRemoved(old) => write!(f, "-{}", old),
            Change::EntryMapped(old, new) => write!(f, "{} -> {}", old, new),
        }
    }
}
