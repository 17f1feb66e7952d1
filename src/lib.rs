// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Lonala compiler
//!
//! A single-pass, Pratt-parsing bytecode compiler for the Lonala expression
//! language. This crate provides:
//! - A scanner (lexer) for Lonala source
//! - A compiler that parses and emits bytecode in one pass, with no
//!   intermediate AST
//! - A chunk format: a flat instruction stream, a per-byte line table, and a
//!   constant pool
//! - Value representation, heap objects, and string interning
//!
//! This crate stops at the compiled `Chunk`; it does not include an
//! instruction-dispatch loop. Control flow, functions, closures, and classes
//! are out of scope.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

pub mod array;
pub mod chunk;
pub mod compiler;
pub mod object;
pub mod scanner;
pub mod table;
pub mod value;
pub mod vm;

pub use chunk::{Chunk, OpCode};
pub use compiler::{CompileError, compile};
pub use value::Value;
pub use vm::VmState;

/// Crate version.
pub const VERSION: &str = match option_env!("CARGO_PKG_VERSION") {
    Some(v) => v,
    None => "unknown",
};
