// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Minimal VM state: the object list head and the global string intern
//! table.
//!
//! This crate stops at the chunk format (see §1 of the design notes): there
//! is no instruction-dispatch loop here. `VmState` exists so the compiler
//! has somewhere to intern string constants, and so a future interpreter
//! has a single owner for the object list and intern table to build on.

#[cfg(test)]
mod vm_test;

#[cfg(any(test, feature = "std"))]
use std::boxed::Box;

#[cfg(not(any(test, feature = "std")))]
use alloc::boxed::Box;

use crate::object::{Obj, ObjectRef, fnv1a_hash};
use crate::table::StringTable;
use crate::value::Value;

/// Owns the object list head and the string intern table.
pub struct VmState {
    objects: Option<ObjectRef>,
    strings: StringTable,
}

impl VmState {
    /// Create a fresh, empty VM state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: None,
            strings: StringTable::new(),
        }
    }

    /// Number of interned strings currently live.
    #[inline]
    #[must_use]
    pub const fn interned_count(&self) -> usize {
        self.strings.count()
    }

    /// The intrusive object list head, if any objects have been allocated.
    #[must_use]
    pub fn objects(&self) -> Option<ObjectRef> {
        self.objects.clone()
    }

    /// Intern a string, borrowing the caller's bytes.
    ///
    /// If an equal string is already interned, its existing reference is
    /// returned. Otherwise a fresh copy of `chars` is allocated, interned,
    /// and linked into the object list.
    pub fn copy_string(&mut self, chars: &str) -> ObjectRef {
        let hash = fnv1a_hash(chars.as_bytes());

        if let Some(existing) = self.strings.find_string(chars.as_bytes(), hash) {
            return existing;
        }

        let bytes: Box<[u8]> = chars.as_bytes().to_vec().into_boxed_slice();
        let obj = Obj::new_string(bytes, hash, &mut self.objects);
        self.strings.set(ObjectRef::clone(&obj), Value::Nil);
        obj
    }

    /// Intern a string, taking ownership of an already-allocated buffer.
    ///
    /// If an equal string is already interned, `chars` is dropped (the
    /// caller's buffer is freed by virtue of going out of scope) and the
    /// existing reference is returned. Otherwise `chars` itself becomes the
    /// new object's payload.
    pub fn take_string(&mut self, chars: Box<[u8]>) -> ObjectRef {
        let hash = fnv1a_hash(&chars);

        if let Some(existing) = self.strings.find_string(&chars, hash) {
            return existing;
        }

        let obj = Obj::new_string(chars, hash, &mut self.objects);
        self.strings.set(ObjectRef::clone(&obj), Value::Nil);
        obj
    }
}

impl Default for VmState {
    fn default() -> Self {
        Self::new()
    }
}
