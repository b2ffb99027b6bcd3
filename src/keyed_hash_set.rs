//! Open-Addressing Keyed Hash Set
//!
//! This module provides [`KeyedHashSet`], an associative container that stores its
//! elements directly in a slot array and resolves collisions by linear probing.
//! Elements describe themselves through the [`KeyedElement`] capability: each one
//! exposes a key, the hash of that key, and a domain comparison used when adding
//! or removing a whole element.
//!
//! # Algorithm
//!
//! The ideal slot of an element is `key_hash % slots.len()`. Insertion probes forward
//! (wrapping at the end of the array) from the ideal slot to the first free slot.
//! Lookups follow the same path and stop at the first free slot they meet, so the
//! table must never contain a free slot between an element's ideal slot and the
//! slot it actually occupies.
//!
//! Deletion is tombstone-free. The removed slot becomes a hole, and the rest of the
//! probe run is walked forward: every element whose ideal slot does not lie
//! cyclically in `(hole, current]` is shifted back into the hole, and its old slot
//! becomes the new hole. The walk ends at the first free slot.
//!
//! ```text
//!   before remove(B)          after remove(B)
//!   ┌───┬───┬───┬───┐         ┌───┬───┬───┬───┐
//!   │ A │ B │ C │   │         │ A │ C │   │   │     A, B, C all hash to slot 0
//!   └───┴───┴───┴───┘         └───┴───┴───┴───┘
//! ```
//!
//! # Growth
//!
//! Once more than three quarters of the slots are occupied the array doubles and
//! every element is re-placed, since ideal slots depend on the array length.
//!
//! # Performance Characteristics
//!
//! - add / get_by_key / remove: O(1) average, O(run length) worst case
//! - growth: O(n), amortized O(1) per add
//!
//! # Thread Safety
//!
//! `KeyedHashSet` performs no synchronization. Wrap it in a lock if it has to be
//! shared between threads.

extern crate alloc;

use crate::error::InvariantError;
use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::mem;

/// Smallest slot array a set is ever created with.
pub const MINIMUM_SIZE: usize = 7;

/// A value that can be stored in a [`KeyedHashSet`].
///
/// `compare` is the domain equality used by [`KeyedHashSet::add`] and
/// [`KeyedHashSet::remove`]. It may be stricter or looser than equality of the
/// keys, which is what [`KeyedHashSet::get_by_key`] uses.
///
/// `key_hash` must be consistent with `key`: two elements with equal keys must
/// report equal hashes, and the hash of an element must not change while it is
/// stored in a set.
///
/// # Examples
///
/// ```
/// use keyed_cache::{KeyedElement, KeyedHashSet};
///
/// struct Extension {
///     id: u32,
///     label: &'static str,
/// }
///
/// impl KeyedElement for Extension {
///     type Key = u32;
///
///     fn key(&self) -> &u32 {
///         &self.id
///     }
///
///     fn key_hash(&self) -> u64 {
///         u64::from(self.id)
///     }
///
///     fn compare(&self, other: &Self) -> bool {
///         self.id == other.id
///     }
/// }
///
/// let mut set = KeyedHashSet::new(4);
/// set.add(Extension { id: 12, label: "editor" });
/// assert_eq!(set.get_by_key(12, &12).map(|e| e.label), Some("editor"));
/// ```
pub trait KeyedElement {
    /// The key type the element is looked up by.
    type Key: Eq;

    /// Returns the element's key.
    fn key(&self) -> &Self::Key;

    /// Returns the hash of the element's key.
    fn key_hash(&self) -> u64;

    /// Returns `true` if `other` denotes the same element.
    fn compare(&self, other: &Self) -> bool;
}

/// An open-addressing set of [`KeyedElement`]s with tombstone-free deletion.
///
/// The `replace` policy decides what [`add`](KeyedHashSet::add) does when an equal
/// element is already present: overwrite it (`true`) or leave the set untouched
/// (`false`).
///
/// # Examples
///
/// ```
/// use keyed_cache::{KeyedElement, KeyedHashSet};
///
/// #[derive(Debug, PartialEq)]
/// struct Pair(u32, &'static str);
///
/// impl KeyedElement for Pair {
///     type Key = u32;
///     fn key(&self) -> &u32 { &self.0 }
///     fn key_hash(&self) -> u64 { u64::from(self.0) }
///     fn compare(&self, other: &Self) -> bool { self.0 == other.0 }
/// }
///
/// let mut set = KeyedHashSet::with_replace(4, false);
/// assert!(set.add(Pair(1, "one")));
/// assert!(!set.add(Pair(1, "uno")));
/// assert_eq!(set.get_by_key(1, &1), Some(&Pair(1, "one")));
///
/// assert!(set.remove(&Pair(1, "ignored")));
/// assert!(set.is_empty());
/// ```
pub struct KeyedHashSet<E> {
    elements: Box<[Option<E>]>,
    element_count: usize,
    initial_capacity: usize,
    replace: bool,
}

impl<E: KeyedElement> KeyedHashSet<E> {
    /// Creates a set sized for `capacity` elements that replaces duplicates on add.
    pub fn new(capacity: usize) -> Self {
        Self::with_replace(capacity, true)
    }

    /// Creates a set sized for `capacity` elements with the given duplicate policy.
    ///
    /// The slot array starts at `max(MINIMUM_SIZE, capacity * 2)` slots.
    pub fn with_replace(capacity: usize, replace: bool) -> Self {
        Self {
            elements: empty_slots(initial_slots(capacity)),
            element_count: 0,
            initial_capacity: capacity,
            replace,
        }
    }

    /// Returns the number of elements in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.element_count
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// Returns the current length of the slot array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if duplicate adds overwrite the stored element.
    #[inline]
    pub fn replaces(&self) -> bool {
        self.replace
    }

    /// Adds `element`, returning `true` if the set was modified.
    ///
    /// When an element that [`compare`](KeyedElement::compare)s equal is already
    /// stored, it is overwritten under the replace policy and the call returns
    /// `true`; otherwise the set is left alone and the call returns `false`.
    pub fn add(&mut self, element: E) -> bool {
        let len = self.elements.len();
        let start = self.slot_for(element.key_hash());
        for offset in 0..len {
            let index = (start + offset) % len;
            match self.elements[index].as_ref().map(|e| e.compare(&element)) {
                None => {
                    self.elements[index] = Some(element);
                    self.element_count += 1;
                    if self.should_grow() {
                        self.expand();
                    }
                    return true;
                }
                Some(true) => {
                    if self.replace {
                        self.elements[index] = Some(element);
                    }
                    return self.replace;
                }
                Some(false) => {}
            }
        }
        // every slot was occupied by something else
        self.expand();
        self.add(element)
    }

    /// Adds every element of `elements`, returning how many adds modified the set.
    pub fn add_all<I>(&mut self, elements: I) -> usize
    where
        I: IntoIterator<Item = E>,
    {
        elements
            .into_iter()
            .map(|element| self.add(element))
            .filter(|&changed| changed)
            .count()
    }

    /// Looks up the element whose key equals `key`.
    ///
    /// `hash` must be the hash the stored element would report for that key.
    pub fn get_by_key<Q>(&self, hash: u64, key: &Q) -> Option<&E>
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let index = self.find(hash, |e| e.key().borrow() == key)?;
        self.elements[index].as_ref()
    }

    /// Returns `true` if an element with the given key is present.
    pub fn contains_key<Q>(&self, hash: u64, key: &Q) -> bool
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.find(hash, |e| e.key().borrow() == key).is_some()
    }

    /// Returns `true` if an element that compares equal to `element` is present.
    pub fn contains(&self, element: &E) -> bool {
        self.find(element.key_hash(), |e| e.compare(element))
            .is_some()
    }

    /// Removes the element that compares equal to `element`.
    ///
    /// Returns `true` if an element was removed.
    pub fn remove(&mut self, element: &E) -> bool {
        self.take(element).is_some()
    }

    /// Removes and returns the element that compares equal to `element`.
    pub fn take(&mut self, element: &E) -> Option<E> {
        let index = self.find(element.key_hash(), |e| e.compare(element))?;
        self.take_at(index)
    }

    /// Removes and returns the element whose key equals `key`.
    pub fn remove_by_key<Q>(&mut self, hash: u64, key: &Q) -> Option<E>
    where
        E::Key: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let index = self.find(hash, |e| e.key().borrow() == key)?;
        self.take_at(index)
    }

    /// Drops every element and resets the slot array to its initial length.
    pub fn clear(&mut self) {
        self.elements = empty_slots(initial_slots(self.initial_capacity));
        self.element_count = 0;
    }

    /// Returns an iterator over the stored elements in slot order.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            slots: self.elements.iter(),
            remaining: self.element_count,
        }
    }

    /// Returns the number of elements that do not sit in their ideal slot.
    pub fn collisions(&self) -> usize {
        self.elements
            .iter()
            .enumerate()
            .filter(|(index, slot)| {
                slot.as_ref()
                    .is_some_and(|e| self.slot_for(e.key_hash()) != *index)
            })
            .count()
    }

    /// Verifies the element count and that every element is reachable by
    /// probing forward from its ideal slot.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.elements.len();
        let occupied = self.elements.iter().filter(|slot| slot.is_some()).count();
        if occupied != self.element_count {
            return Err(InvariantError::new(format!(
                "element count {} does not match {} occupied slots",
                self.element_count, occupied
            )));
        }
        if self.element_count > len {
            return Err(InvariantError::new("element count exceeds slot count"));
        }
        for (index, slot) in self.elements.iter().enumerate() {
            let Some(element) = slot else { continue };
            let mut probe = self.slot_for(element.key_hash());
            while probe != index {
                if self.elements[probe].is_none() {
                    return Err(InvariantError::new(format!(
                        "element at slot {} is unreachable: slot {} on its probe path is empty",
                        index, probe
                    )));
                }
                probe = (probe + 1) % len;
            }
        }
        Ok(())
    }

    #[inline]
    fn slot_for(&self, hash: u64) -> usize {
        (hash % self.elements.len() as u64) as usize
    }

    #[inline]
    fn should_grow(&self) -> bool {
        self.element_count * 4 > self.elements.len() * 3
    }

    /// Probes from the ideal slot of `hash` until `matches` accepts an element
    /// or a free slot ends the run.
    fn find(&self, hash: u64, mut matches: impl FnMut(&E) -> bool) -> Option<usize> {
        let len = self.elements.len();
        let start = self.slot_for(hash);
        for offset in 0..len {
            let index = (start + offset) % len;
            match &self.elements[index] {
                None => return None,
                Some(element) if matches(element) => return Some(index),
                Some(_) => {}
            }
        }
        None
    }

    fn take_at(&mut self, index: usize) -> Option<E> {
        let removed = self.elements[index].take()?;
        self.rehash_to(index);
        self.element_count -= 1;
        Some(removed)
    }

    /// Closes the hole at `index` by shifting later members of its probe run back.
    fn rehash_to(&mut self, index: usize) {
        let len = self.elements.len();
        let mut target = index;
        let mut current = (index + 1) % len;
        while current != index {
            let ideal = match &self.elements[current] {
                None => break,
                Some(element) => self.slot_for(element.key_hash()),
            };
            // an element stays put when its ideal slot lies cyclically in (target, current]
            let stays = if target < current {
                target < ideal && ideal <= current
            } else {
                ideal > target || ideal <= current
            };
            if !stays {
                self.elements[target] = self.elements[current].take();
                target = current;
            }
            current = (current + 1) % len;
        }
        self.elements[target] = None;
    }

    fn expand(&mut self) {
        let new_len = self.elements.len() * 2;
        let old = mem::replace(&mut self.elements, empty_slots(new_len));
        for element in old.into_vec().into_iter().flatten() {
            let mut index = self.slot_for(element.key_hash());
            while self.elements[index].is_some() {
                index = (index + 1) % new_len;
            }
            self.elements[index] = Some(element);
        }
    }
}

fn initial_slots(capacity: usize) -> usize {
    MINIMUM_SIZE.max(capacity.saturating_mul(2))
}

fn empty_slots<E>(len: usize) -> Box<[Option<E>]> {
    let mut slots = Vec::with_capacity(len);
    slots.resize_with(len, || None);
    slots.into_boxed_slice()
}

impl<E: KeyedElement> Extend<E> for KeyedHashSet<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<E: fmt::Debug> fmt::Debug for KeyedHashSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedHashSet")
            .field("size", &self.element_count)
            .field("capacity", &self.elements.len())
            .field("replace", &self.replace)
            .field(
                "elements",
                &self.elements.iter().flatten().collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<E: KeyedElement> fmt::Display for KeyedHashSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyedHashSet {{ size: {}, capacity: {}, collisions: {} }}",
            self.element_count,
            self.elements.len(),
            self.collisions()
        )
    }
}

/// Iterator over the elements of a [`KeyedHashSet`], in slot order.
#[derive(Debug)]
pub struct Iter<'a, E> {
    slots: core::slice::Iter<'a, Option<E>>,
    remaining: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        for slot in self.slots.by_ref() {
            if let Some(element) = slot {
                self.remaining -= 1;
                return Some(element);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<'a, E: KeyedElement> IntoIterator for &'a KeyedHashSet<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Iter<'a, E> {
        self.iter()
    }
}
