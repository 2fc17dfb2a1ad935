// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;
use std::slice::{self, Iter as SliceIter};
use std::vec::IntoIter as VecIntoIter;

use archery::{SharedPointer, SharedPointerKind};
use bitmaps::{Bits, BitsImpl};

use crate::bits::{self, Sec};
use crate::change::Change;
use crate::config::{HASH_LEVEL_SIZE, MAX_DEPTH};
use crate::error::MapError;
use crate::hashable::Hashable;
use crate::util::clone_ref;

#[cfg(any(test, feature = "debug"))]
use crate::error::InvariantError;

pub(crate) const HASH_WIDTH: usize = 2_usize.pow(HASH_LEVEL_SIZE as u32);
pub type HashBits = <BitsImpl<HASH_WIDTH> as Bits>::Store; // a uint of HASH_WIDTH bits

/// How an insertion treats a key which is, or isn't, already in the map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum InsertMode {
    /// Add a new key, failing with [`DuplicateKey`][MapError::DuplicateKey]
    /// if it's already present.
    Add,
    /// Add a new key, leaving the map as it was if it's already present.
    TryAdd,
    /// Add a new key or replace the value of an existing one.
    Upsert,
    /// Replace the value of an existing key, failing with
    /// [`KeyNotFound`][MapError::KeyNotFound] if it's absent.
    Replace,
    /// Replace the value of an existing key, leaving the map as it was if
    /// it's absent.
    TryReplace,
}

impl InsertMode {
    /// Test whether an insertion in this mode can return an error.
    #[must_use]
    pub fn is_fallible(self) -> bool {
        matches!(self, InsertMode::Add | InsertMode::Replace)
    }

    pub(crate) fn admits_new(self) -> Result<bool, MapError> {
        match self {
            InsertMode::Add | InsertMode::TryAdd | InsertMode::Upsert => Ok(true),
            InsertMode::Replace => Err(MapError::KeyNotFound),
            InsertMode::TryReplace => Ok(false),
        }
    }

    pub(crate) fn admits_existing(self) -> Result<bool, MapError> {
        match self {
            InsertMode::Upsert | InsertMode::Replace | InsertMode::TryReplace => Ok(true),
            InsertMode::Add => Err(MapError::DuplicateKey),
            InsertMode::TryAdd => Ok(false),
        }
    }
}

/// What an insertion did. A replaced value is borrowed from the trie the
/// insertion started from, which is still intact.
pub(crate) enum Inserted<'a, V> {
    Unchanged,
    Added,
    Mapped(&'a V),
}

impl<'a, V> Inserted<'a, V> {
    pub(crate) fn is_unchanged(&self) -> bool {
        matches!(self, Inserted::Unchanged)
    }

    /// The change an insertion of `new_value` made.
    pub(crate) fn into_change(self, new_value: V) -> Change<V>
    where
        V: Clone,
    {
        match self {
            Inserted::Unchanged => Change::NoChange,
            Inserted::Added => Change::EntryAdded(new_value),
            Inserted::Mapped(old) => Change::EntryMapped(old.clone(), new_value),
        }
    }
}

pub(crate) enum Node<K, V, P: SharedPointerKind> {
    Empty,
    Entry(HashBits, K, V),
    Entries(SharedPointer<Entries<K, V, P>, P>),
    Collision(SharedPointer<CollisionNode<K, V>, P>),
}

/// A sparse branch: the bitmap marks which of the 32 slots are occupied,
/// and `items` holds just the occupied ones, in slot order.
pub(crate) struct Entries<K, V, P: SharedPointerKind> {
    bitmap: HashBits,
    items: Vec<Node<K, V, P>>,
}

/// Keys whose hashes are identical, which slicing can't separate.
#[derive(Clone)]
pub(crate) struct CollisionNode<K, V> {
    hash: HashBits,
    items: Vec<(K, V)>,
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Clone for Node<K, V, P> {
    fn clone(&self) -> Self {
        match self {
            Node::Empty => Node::Empty,
            Node::Entry(hash, key, value) => Node::Entry(*hash, key.clone(), value.clone()),
            Node::Entries(entries) => Node::Entries(entries.clone()),
            Node::Collision(coll) => Node::Collision(coll.clone()),
        }
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Clone for Entries<K, V, P> {
    fn clone(&self) -> Self {
        Entries {
            bitmap: self.bitmap,
            items: self.items.clone(),
        }
    }
}

impl<K, V, P: SharedPointerKind> Default for Node<K, V, P> {
    fn default() -> Self {
        Node::Empty
    }
}

impl<K, V, P: SharedPointerKind> Entries<K, V, P> {
    /// The dense position of a slot's child, if the slot is occupied.
    #[inline]
    fn position(&self, bit: HashBits) -> Option<usize> {
        if bits::get(self.bitmap, bit) {
            Some(bits::index(self.bitmap, bit))
        } else {
            None
        }
    }
}

impl<K, V, P: SharedPointerKind> Node<K, V, P> {
    #[inline]
    fn entries(bitmap: HashBits, items: Vec<Self>) -> Self {
        Node::Entries(SharedPointer::new(Entries { bitmap, items }))
    }

    #[inline]
    fn collision(hash: HashBits, items: Vec<(K, V)>) -> Self {
        Node::Collision(SharedPointer::new(CollisionNode { hash, items }))
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    #[inline]
    fn is_entry(&self) -> bool {
        matches!(self, Node::Entry(_, _, _))
    }

    /// A branch's children, in slot order. Other nodes have none.
    #[cfg(any(test, feature = "rayon"))]
    pub(crate) fn children(&self) -> &[Self] {
        match self {
            Node::Entries(entries) => &entries.items,
            _ => &[],
        }
    }

    /// The pairs held directly by a leaf or a collision list.
    #[cfg(any(test, feature = "rayon"))]
    pub(crate) fn pairs(&self) -> Pairs<'_, K, V> {
        match self {
            Node::Entry(_, key, value) => Pairs::One(Some((key, value))),
            Node::Collision(coll) => Pairs::Many(coll.items.iter()),
            _ => Pairs::One(None),
        }
    }

    pub(crate) fn get<Q, H>(&self, hashable: &H, hash: HashBits, key: &Q, sec: Sec) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        K: Borrow<Q>,
        H: Hashable<Q> + ?Sized,
    {
        match self {
            Node::Empty => None,
            Node::Entry(entry_hash, entry_key, value) => {
                if *entry_hash == hash && hashable.key_eq(entry_key.borrow(), key) {
                    Some((entry_key, value))
                } else {
                    None
                }
            }
            Node::Entries(entries) => {
                let index = entries.position(bits::mask(sec.index(hash)))?;
                entries.items[index].get(hashable, hash, key, sec.next())
            }
            Node::Collision(coll) => {
                if coll.hash == hash {
                    coll.items
                        .iter()
                        .find(|(entry_key, _)| hashable.key_eq(entry_key.borrow(), key))
                        .map(|(entry_key, value)| (entry_key, value))
                } else {
                    None
                }
            }
        }
    }

    /// Build a new version of a subtree, with a key and value sliced into it.
    ///
    /// If the insertion turns out to be a no-op, the returned node is a
    /// cheap copy of this one rather than a rebuilt path.
    pub(crate) fn insert<'a, H>(
        &'a self,
        hashable: &H,
        hash: HashBits,
        key: K,
        value: V,
        sec: Sec,
        mode: InsertMode,
    ) -> Result<(Self, Inserted<'a, V>), MapError>
    where
        K: Clone,
        V: Clone + PartialEq,
        H: Hashable<K> + ?Sized,
    {
        match self {
            Node::Empty => {
                if mode.admits_new()? {
                    Ok((Node::Entry(hash, key, value), Inserted::Added))
                } else {
                    Ok((Node::Empty, Inserted::Unchanged))
                }
            }
            Node::Entry(entry_hash, entry_key, entry_value) => {
                if *entry_hash == hash && hashable.key_eq(entry_key, &key) {
                    if !mode.admits_existing()? || *entry_value == value {
                        Ok((self.clone(), Inserted::Unchanged))
                    } else {
                        Ok((Node::Entry(hash, key, value), Inserted::Mapped(entry_value)))
                    }
                } else if mode.admits_new()? {
                    let leaf = Node::Entry(hash, key, value);
                    let node = Node::merge(self.clone(), *entry_hash, leaf, hash, sec);
                    Ok((node, Inserted::Added))
                } else {
                    Ok((self.clone(), Inserted::Unchanged))
                }
            }
            Node::Collision(coll) if coll.hash == hash => {
                match coll
                    .items
                    .iter()
                    .position(|(entry_key, _)| hashable.key_eq(entry_key, &key))
                {
                    Some(index) => {
                        let current = &coll.items[index].1;
                        if !mode.admits_existing()? || *current == value {
                            return Ok((self.clone(), Inserted::Unchanged));
                        }
                        let mut items = coll.items.clone();
                        items[index] = (key, value);
                        Ok((Node::collision(hash, items), Inserted::Mapped(current)))
                    }
                    None => {
                        if !mode.admits_new()? {
                            return Ok((self.clone(), Inserted::Unchanged));
                        }
                        let mut items = Vec::with_capacity(coll.items.len() + 1);
                        items.extend_from_slice(&coll.items);
                        items.push((key, value));
                        Ok((Node::collision(hash, items), Inserted::Added))
                    }
                }
            }
            Node::Collision(coll) => {
                if mode.admits_new()? {
                    let leaf = Node::Entry(hash, key, value);
                    let node = Node::merge(self.clone(), coll.hash, leaf, hash, sec);
                    Ok((node, Inserted::Added))
                } else {
                    Ok((self.clone(), Inserted::Unchanged))
                }
            }
            Node::Entries(entries) => {
                let bit = bits::mask(sec.index(hash));
                match entries.position(bit) {
                    Some(index) => {
                        let (child, inserted) = entries.items[index]
                            .insert(hashable, hash, key, value, sec.next(), mode)?;
                        if inserted.is_unchanged() {
                            return Ok((self.clone(), inserted));
                        }
                        let mut items = entries.items.clone();
                        items[index] = child;
                        Ok((Node::entries(entries.bitmap, items), inserted))
                    }
                    None => {
                        if !mode.admits_new()? {
                            return Ok((self.clone(), Inserted::Unchanged));
                        }
                        let index = bits::index(entries.bitmap, bit);
                        let mut items = Vec::with_capacity(entries.items.len() + 1);
                        items.extend_from_slice(&entries.items[..index]);
                        items.push(Node::Entry(hash, key, value));
                        items.extend_from_slice(&entries.items[index..]);
                        let bitmap = bits::set(entries.bitmap, bit, true);
                        Ok((Node::entries(bitmap, items), Inserted::Added))
                    }
                }
            }
        }
    }

    /// Join two leaves with different keys into a subtree addressed from
    /// `sec` downwards.
    fn merge(node1: Self, hash1: HashBits, node2: Self, hash2: HashBits, sec: Sec) -> Self
    where
        K: Clone,
        V: Clone,
    {
        if sec.is_exhausted() {
            // Every section matched, so the hashes are identical.
            let mut items = node1.into_pairs();
            items.extend(node2.into_pairs());
            return Node::collision(hash1, items);
        }
        let index1 = sec.index(hash1);
        let index2 = sec.index(hash2);
        if index1 == index2 {
            let child = Node::merge(node1, hash1, node2, hash2, sec.next());
            Node::entries(bits::mask(index1), vec![child])
        } else {
            let bitmap = bits::mask(index1) | bits::mask(index2);
            if index1 < index2 {
                Node::entries(bitmap, vec![node1, node2])
            } else {
                Node::entries(bitmap, vec![node2, node1])
            }
        }
    }

    fn into_pairs(self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        match self {
            Node::Empty => Vec::new(),
            Node::Entry(_, key, value) => vec![(key, value)],
            Node::Collision(coll) => clone_ref(coll).items,
            Node::Entries(entries) => clone_ref(entries)
                .items
                .into_iter()
                .flat_map(Node::into_pairs)
                .collect(),
        }
    }

    /// Build a new version of a subtree without a key, returning the value
    /// it had.
    ///
    /// A branch left holding a single plain entry is replaced by that entry,
    /// and a collision list left with one pair becomes a plain entry, so a
    /// removal always leaves the same shape as never having inserted.
    pub(crate) fn remove<'a, Q, H>(
        &'a self,
        hashable: &H,
        hash: HashBits,
        key: &Q,
        sec: Sec,
    ) -> (Self, Option<&'a V>)
    where
        Q: ?Sized,
        K: Borrow<Q> + Clone,
        V: Clone,
        H: Hashable<Q> + ?Sized,
    {
        match self {
            Node::Empty => (Node::Empty, None),
            Node::Entry(entry_hash, entry_key, value) => {
                if *entry_hash == hash && hashable.key_eq(entry_key.borrow(), key) {
                    (Node::Empty, Some(value))
                } else {
                    (self.clone(), None)
                }
            }
            Node::Collision(coll) => {
                let found = if coll.hash == hash {
                    coll.items
                        .iter()
                        .position(|(entry_key, _)| hashable.key_eq(entry_key.borrow(), key))
                } else {
                    None
                };
                let index = match found {
                    Some(index) => index,
                    None => return (self.clone(), None),
                };
                let node = if coll.items.len() == 2 {
                    let (other_key, other_value) = coll.items[1 - index].clone();
                    Node::Entry(coll.hash, other_key, other_value)
                } else {
                    let mut items = coll.items.clone();
                    items.remove(index);
                    Node::collision(coll.hash, items)
                };
                (node, Some(&coll.items[index].1))
            }
            Node::Entries(entries) => {
                let bit = bits::mask(sec.index(hash));
                let index = match entries.position(bit) {
                    Some(index) => index,
                    None => return (self.clone(), None),
                };
                let (child, removed) = entries.items[index].remove(hashable, hash, key, sec.next());
                if removed.is_none() {
                    return (self.clone(), None);
                }
                let node = if child.is_empty() {
                    match entries.items.len() {
                        1 => Node::Empty,
                        2 if entries.items[1 - index].is_entry() => entries.items[1 - index].clone(),
                        _ => {
                            let mut items = entries.items.clone();
                            items.remove(index);
                            Node::entries(bits::set(entries.bitmap, bit, false), items)
                        }
                    }
                } else if child.is_entry() && entries.items.len() == 1 {
                    child
                } else {
                    let mut items = entries.items.clone();
                    items[index] = child;
                    Node::entries(entries.bitmap, items)
                };
                (node, removed)
            }
        }
    }

    /// Build a subtree of the same shape with every value transformed.
    pub(crate) fn map_values<U, F>(&self, f: &mut F) -> Node<K, U, P>
    where
        K: Clone,
        F: FnMut(&K, &V) -> U,
    {
        match self {
            Node::Empty => Node::Empty,
            Node::Entry(hash, key, value) => Node::Entry(*hash, key.clone(), f(key, value)),
            Node::Entries(entries) => Node::entries(
                entries.bitmap,
                entries
                    .items
                    .iter()
                    .map(|item| item.map_values(&mut *f))
                    .collect(),
            ),
            Node::Collision(coll) => Node::collision(
                coll.hash,
                coll.items
                    .iter()
                    .map(|(key, value)| (key.clone(), f(key, value)))
                    .collect(),
            ),
        }
    }

    /// The number of branch levels above the deepest leaf.
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        match self {
            Node::Empty | Node::Entry(_, _, _) | Node::Collision(_) => 0,
            Node::Entries(entries) => 1 + entries.items.iter().map(Node::depth).max().unwrap_or(0),
        }
    }

    /// Verify the structural invariants of a subtree, returning the number
    /// of entries in it.
    ///
    /// `prefix` holds the hash bits chosen by the slots on the path to this
    /// node; every leaf below must agree with them.
    #[cfg(any(test, feature = "debug"))]
    pub(crate) fn check<H>(
        &self,
        hashable: &H,
        sec: Sec,
        prefix: HashBits,
    ) -> Result<usize, InvariantError>
    where
        H: Hashable<K> + ?Sized,
    {
        use bitmaps::Bitmap;

        let routed = |hash: HashBits| {
            let known = (1 as HashBits)
                .checked_shl(sec.offset() as u32)
                .map_or(!0, |bit| bit - 1);
            if hash & known == prefix {
                Ok(())
            } else {
                Err(InvariantError::MisroutedLeaf {
                    hash,
                    prefix,
                    offset: sec.offset(),
                })
            }
        };

        match self {
            Node::Empty => Ok(0),
            Node::Entry(hash, key, _) => {
                let actual = hashable.hash_key(key);
                if actual != *hash {
                    return Err(InvariantError::StaleHash {
                        stored: *hash,
                        actual,
                    });
                }
                routed(*hash)?;
                Ok(1)
            }
            Node::Collision(coll) => {
                if !sec.is_exhausted() {
                    return Err(InvariantError::MisplacedCollision {
                        offset: sec.offset(),
                    });
                }
                if coll.items.len() < 2 {
                    return Err(InvariantError::ShortCollision {
                        len: coll.items.len(),
                    });
                }
                routed(coll.hash)?;
                for (index, (key, _)) in coll.items.iter().enumerate() {
                    let found = hashable.hash_key(key);
                    if found != coll.hash {
                        return Err(InvariantError::CollisionHashMismatch {
                            expected: coll.hash,
                            found,
                        });
                    }
                    if coll.items[..index]
                        .iter()
                        .any(|(other, _)| hashable.key_eq(other, key))
                    {
                        return Err(InvariantError::DuplicateCollisionKey { hash: coll.hash });
                    }
                }
                Ok(coll.items.len())
            }
            Node::Entries(entries) => {
                let offset = sec.offset();
                if sec.is_exhausted() {
                    return Err(InvariantError::TooDeep {
                        depth: sec.depth() + 1,
                        limit: MAX_DEPTH,
                    });
                }
                let bits = bits::count(entries.bitmap) as usize;
                if bits != entries.items.len() {
                    return Err(InvariantError::BitmapMismatch {
                        offset,
                        bits,
                        items: entries.items.len(),
                    });
                }
                if let [] | [Node::Entry(_, _, _)] = entries.items.as_slice() {
                    return Err(InvariantError::DegenerateNode { offset });
                }
                let slots = Bitmap::<HASH_WIDTH>::from_value(entries.bitmap);
                let mut total = 0;
                for (slot, item) in slots.into_iter().zip(&entries.items) {
                    if item.is_empty() {
                        return Err(InvariantError::EmptyChild { offset });
                    }
                    let child_prefix = prefix | ((slot as HashBits) << offset);
                    total += item.check(hashable, sec.next(), child_prefix)?;
                }
                Ok(total)
            }
        }
    }
}

/// Iterator over the pairs held directly by a node.
#[cfg(any(test, feature = "rayon"))]
pub(crate) enum Pairs<'a, K, V> {
    One(Option<(&'a K, &'a V)>),
    Many(SliceIter<'a, (K, V)>),
}

#[cfg(any(test, feature = "rayon"))]
impl<'a, K, V> Iterator for Pairs<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Pairs::One(pair) => pair.take(),
            Pairs::Many(items) => items.next().map(|(key, value)| (key, value)),
        }
    }
}

// Ref iterator

pub(crate) struct Iter<'a, K, V, P: SharedPointerKind> {
    count: usize,
    stack: Vec<SliceIter<'a, Node<K, V, P>>>,
    collision: Option<(HashBits, SliceIter<'a, (K, V)>)>,
}

// We impl Clone instead of deriving it, because we want Clone even if K and V aren't.
impl<'a, K, V, P: SharedPointerKind> Clone for Iter<'a, K, V, P> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            stack: self.stack.clone(),
            collision: self.collision.clone(),
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iter<'a, K, V, P> {
    pub(crate) fn new(root: Option<&'a Node<K, V, P>>, size: usize) -> Self {
        let mut stack = Vec::with_capacity(MAX_DEPTH + 1);
        if let Some(root) = root {
            stack.push(slice::from_ref(root).iter());
        }
        Iter {
            count: size,
            stack,
            collision: None,
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V, HashBits);

    fn next(&mut self) -> Option<Self::Item> {
        'outer: loop {
            if let Some((hash, ref mut coll)) = self.collision {
                match coll.next() {
                    None => self.collision = None,
                    Some((key, value)) => {
                        self.count -= 1;
                        return Some((key, value, hash));
                    }
                };
            }

            while let Some(current) = self.stack.last_mut() {
                match current.next() {
                    Some(Node::Entry(hash, key, value)) => {
                        self.count -= 1;
                        return Some((key, value, *hash));
                    }
                    Some(Node::Entries(entries)) => {
                        self.stack.push(entries.items.iter());
                    }
                    Some(Node::Collision(coll)) => {
                        self.collision = Some((coll.hash, coll.items.iter()));
                        continue 'outer;
                    }
                    Some(Node::Empty) => {}
                    None => {
                        self.stack.pop();
                    }
                }
            }
            return None;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<'a, K, V, P: SharedPointerKind> ExactSizeIterator for Iter<'a, K, V, P> {}

impl<'a, K, V, P: SharedPointerKind> FusedIterator for Iter<'a, K, V, P> {}

// Consuming iterator

pub(crate) struct Drain<K, V, P: SharedPointerKind> {
    count: usize,
    stack: Vec<VecIntoIter<Node<K, V, P>>>,
    collision: Option<(HashBits, VecIntoIter<(K, V)>)>,
}

impl<K, V, P: SharedPointerKind> Drain<K, V, P> {
    pub(crate) fn new(root: Option<Node<K, V, P>>, size: usize) -> Self {
        let mut stack = Vec::with_capacity(MAX_DEPTH + 1);
        if let Some(root) = root {
            stack.push(vec![root].into_iter());
        }
        Drain {
            count: size,
            stack,
            collision: None,
        }
    }
}

impl<K, V, P> Iterator for Drain<K, V, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V, HashBits);

    fn next(&mut self) -> Option<Self::Item> {
        'outer: loop {
            if let Some((hash, ref mut coll)) = self.collision {
                match coll.next() {
                    None => self.collision = None,
                    Some((key, value)) => {
                        self.count -= 1;
                        return Some((key, value, hash));
                    }
                };
            }

            while let Some(current) = self.stack.last_mut() {
                match current.next() {
                    Some(Node::Entry(hash, key, value)) => {
                        self.count -= 1;
                        return Some((key, value, hash));
                    }
                    Some(Node::Entries(entries)) => {
                        self.stack.push(clone_ref(entries).items.into_iter());
                    }
                    Some(Node::Collision(coll)) => {
                        let coll = clone_ref(coll);
                        self.collision = Some((coll.hash, coll.items.into_iter()));
                        continue 'outer;
                    }
                    Some(Node::Empty) => {}
                    None => {
                        self.stack.pop();
                    }
                }
            }
            return None;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> ExactSizeIterator for Drain<K, V, P> {}

impl<K: Clone, V: Clone, P: SharedPointerKind> FusedIterator for Drain<K, V, P> {}

impl<K: fmt::Debug, V: fmt::Debug, P: SharedPointerKind> fmt::Debug for Node<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Node::Empty => write!(f, "Empty"),
            Node::Entry(hash, key, value) => write!(f, "{:?}: {:?} :: {}", key, value, hash),
            Node::Entries(entries) => {
                write!(f, "Node[ ")?;
                for item in &entries.items {
                    write!(f, "{:?}, ", item)?;
                }
                write!(f, "]")
            }
            Node::Collision(coll) => write!(f, "Coll{:?} :: {}", coll.items, coll.hash),
        }
    }
}
