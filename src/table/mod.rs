// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Open-addressed, tombstoned hash table used for string interning.
//!
//! Keys are always interned string objects, so ordinary lookups (`get`,
//! `set`, `delete`) compare keys by pointer identity — two distinct
//! allocations never hold equal content, by the interning invariant.
//! `find_string` is the odd one out: it is the primitive interning itself
//! is built on, so it must compare candidate keys by content
//! (length, hash, then a byte-for-byte check) since no `ObjectRef` for the
//! candidate exists yet.


#[cfg(any(test, feature = "std"))]
use std::vec::Vec;

#[cfg(not(any(test, feature = "std")))]
use alloc::vec::Vec;

use crate::object::{Obj, ObjectRef};
use crate::value::Value;

/// Table grows when `count + 1 > capacity * MAX_LOAD`.
const MAX_LOAD: f64 = 0.75;

/// A single bucket. `key == None && value == Nil` is empty; `key == None &&
/// value != Nil` is a tombstone; `key == Some(_)` is live.
#[derive(Clone)]
struct Entry {
    key: Option<ObjectRef>,
    value: Value,
}

impl Entry {
    const fn empty() -> Self {
        Self {
            key: None,
            value: Value::Nil,
        }
    }
}

/// Open-addressed string-interning table.
pub struct StringTable {
    entries: Vec<Entry>,
    count: usize,
}

impl StringTable {
    /// Create an empty table. No allocation happens until the first `set`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            count: 0,
        }
    }

    /// Number of live entries.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Current bucket-array capacity (0 before the first growth).
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Look up `key` by pointer identity. Returns its value if present.
    #[must_use]
    pub fn get(&self, key: &ObjectRef) -> Option<&Value> {
        if self.entries.is_empty() {
            return None;
        }
        let index = find_entry(&self.entries, key);
        self.entries[index].key.as_ref()?;
        Some(&self.entries[index].value)
    }

    /// Insert or overwrite `key`'s value. Returns whether the key was newly
    /// inserted (as opposed to overwriting an existing live entry).
    pub fn set(&mut self, key: ObjectRef, value: Value) -> bool {
        let load_limit = (self.entries.len() as f64) * MAX_LOAD;
        if (self.count + 1) as f64 > load_limit {
            let new_capacity = crate::array::grow_capacity(self.entries.len());
            self.adjust_capacity(new_capacity);
        }

        // `adjust_capacity` always grows to at least `MIN_CAPACITY`, so the
        // table is never empty by this point.
        let index = find_entry(&self.entries, &key);
        let is_new_key = self.entries[index].key.is_none();

        if is_new_key && self.entries[index].value.is_nil() {
            self.count += 1;
        }

        self.entries[index].key = Some(key);
        self.entries[index].value = value;

        is_new_key
    }

    /// Remove `key`, replacing its slot with a tombstone. Returns whether a
    /// live entry existed.
    pub fn delete(&mut self, key: &ObjectRef) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        let index = find_entry(&self.entries, key);
        if self.entries[index].key.is_none() {
            return false;
        }

        self.entries[index].key = None;
        self.entries[index].value = Value::Bool(true);
        true
    }

    /// Find an interned string whose bytes equal `bytes`, given its
    /// precomputed hash. This is the lookup that interning is built on: it
    /// compares candidates by content, not identity, since the caller does
    /// not yet hold an `ObjectRef` for `bytes`.
    #[must_use]
    pub fn find_string(&self, bytes: &[u8], hash: u32) -> Option<ObjectRef> {
        if self.count == 0 {
            return None;
        }

        let capacity = self.entries.len();
        let mut index = (hash as usize) % capacity;
        loop {
            let entry = &self.entries[index];
            match &entry.key {
                None => {
                    // Tombstones are not a match, but keep probing; only a
                    // truly empty (non-tombstone) slot ends the search.
                    if entry.value.is_nil() {
                        return None;
                    }
                }
                Some(key) => {
                    if key.len() == Some(bytes.len())
                        && key.hash() == Some(hash)
                        && key.as_str().map(str::as_bytes) == Some(bytes)
                    {
                        return Some(ObjectRef::clone(key));
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }

    /// Rebuild the bucket array at `new_capacity`, dropping tombstones and
    /// recomputing `count` from the surviving live entries.
    fn adjust_capacity(&mut self, new_capacity: usize) {
        let mut new_entries = vec_of_empty(new_capacity);

        let mut new_count = 0;
        for entry in &self.entries {
            let Some(key) = &entry.key else { continue };
            let index = find_entry(&new_entries, key);
            new_entries[index].key = Some(ObjectRef::clone(key));
            new_entries[index].value = entry.value.clone();
            new_count += 1;
        }

        self.entries = new_entries;
        self.count = new_count;
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Probe for `key` by pointer identity, honoring tombstone reuse. Returns the
/// index to use for both lookup (absent iff that slot's `key` is `None`) and
/// insertion (first tombstone, or the empty slot that ended the probe).
///
/// Preconditions: `entries` is non-empty.
fn find_entry(entries: &[Entry], key: &ObjectRef) -> usize {
    let hash = key.hash().unwrap_or(0);
    let capacity = entries.len();
    let mut index = (hash as usize) % capacity;
    let mut tombstone: Option<usize> = None;

    loop {
        let entry = &entries[index];
        match &entry.key {
            None => {
                if entry.value.is_nil() {
                    return tombstone.unwrap_or(index);
                }
                if tombstone.is_none() {
                    tombstone = Some(index);
                }
            }
            Some(existing) => {
                if Obj::ptr_eq(existing, key) {
                    return index;
                }
            }
        }
        index = (index + 1) % capacity;
    }
}

fn vec_of_empty(capacity: usize) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(capacity);
    for _ in 0..capacity {
        entries.push(Entry::empty());
    }
    entries
}
