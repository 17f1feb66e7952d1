// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Heap objects: the header every heap value shares, and the one concrete
//! kind this core implements (interned strings).
//!
//! Objects are linked into a singly-linked intrusive list rooted at
//! `VmState::objects` so a future collector has something to walk. Because
//! this crate uses reference-counted objects rather than raw pointers, the
//! list is not load-bearing for memory safety today, but the header and the
//! linkage are maintained exactly as specified.


#[cfg(any(test, feature = "std"))]
use std::{boxed::Box, rc::Rc};

#[cfg(not(any(test, feature = "std")))]
use alloc::{boxed::Box, rc::Rc};

use core::cell::RefCell;
use core::fmt;

/// A reference-counted, pointer-identity-stable handle to a heap object.
pub type ObjectRef = Rc<Obj>;

/// Discriminant for the payload a heap object carries.
///
/// Only `Str` exists today; the spec's control-flow/function/class
/// non-goals mean no other object kind is produced by this compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    /// An interned string.
    Str,
}

/// Heap object header plus payload.
///
/// `next` is the intrusive list link; `VmState::objects` is the list head.
/// New objects are linked in at the head of the list on allocation.
pub struct Obj {
    kind: ObjKind,
    next: RefCell<Option<ObjectRef>>,
    payload: ObjPayload,
}

enum ObjPayload {
    Str(ObjString),
}

/// A heap-allocated, interned string: `{length, bytes, cached_hash}`.
struct ObjString {
    bytes: Box<[u8]>,
    hash: u32,
}

impl Obj {
    /// Allocate a fresh string object and link it into `head`.
    ///
    /// Does not check the intern table; callers (`copy_string`/`take_string`)
    /// are responsible for interning before calling this.
    pub(crate) fn new_string(bytes: Box<[u8]>, hash: u32, head: &mut Option<ObjectRef>) -> ObjectRef {
        let obj = Rc::new(Self {
            kind: ObjKind::Str,
            next: RefCell::new(head.take()),
            payload: ObjPayload::Str(ObjString { bytes, hash }),
        });
        *head = Some(Rc::clone(&obj));
        obj
    }

    /// Whether this object is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.kind, ObjKind::Str)
    }

    /// Borrow this object's string payload, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        let ObjPayload::Str(s) = &self.payload;
        core::str::from_utf8(&s.bytes).ok()
    }

    /// The cached FNV-1a hash of this object's bytes, if it is a string.
    #[must_use]
    pub const fn hash(&self) -> Option<u32> {
        let ObjPayload::Str(s) = &self.payload;
        Some(s.hash)
    }

    /// The raw byte length of this object's payload, if it is a string.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        let ObjPayload::Str(s) = &self.payload;
        Some(s.bytes.len())
    }

    /// Type name used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.kind {
            ObjKind::Str => "string",
        }
    }

    /// Pointer-identity comparison, sound for interned strings.
    #[must_use]
    pub fn ptr_eq(a: &ObjectRef, b: &ObjectRef) -> bool {
        Rc::ptr_eq(a, b)
    }

    /// The next object in the intrusive allocation list, if any.
    #[must_use]
    pub fn next(&self) -> Option<ObjectRef> {
        self.next.borrow().clone()
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            ObjPayload::Str(s) => match core::str::from_utf8(&s.bytes) {
                Ok(text) => write!(f, "{text:?}"),
                Err(_) => write!(f, "<invalid utf8 string>"),
            },
        }
    }
}

/// FNV-1a 32-bit hash: offset `2166136261`, prime `16777619`.
#[inline]
#[must_use]
pub fn fnv1a_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}
