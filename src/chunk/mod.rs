// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Bytecode chunks: flat instruction stream, per-byte line table, and
//! constant pool.

#[cfg(test)]
mod chunk_test;

#[cfg(any(test, feature = "std"))]
use std::string::String;

#[cfg(not(any(test, feature = "std")))]
use alloc::string::String;

use crate::array::DynamicArray;
use crate::value::Value;

/// A single bytecode operation. Encoded as one byte in a chunk's code array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Push `constants[operand]` onto the stack.
    Constant = 0,
    /// Push `nil`.
    Nil,
    /// Push `true`.
    True,
    /// Push `false`.
    False,
    /// Discard the top of the stack.
    Pop,
    /// Push the value of global `constants[operand]`.
    GetGlobal,
    /// Define global `constants[operand]` from the top of the stack.
    DefineGlobal,
    /// Assign to global `constants[operand]` from the top of the stack.
    SetGlobal,
    /// Pop two values, push whether they are equal.
    Equal,
    /// Pop two numbers, push `a > b`.
    Greater,
    /// Pop two numbers, push `a < b`.
    Less,
    /// Pop two values and add them (numbers add, strings concatenate).
    Add,
    /// Pop two numbers, push `a - b`.
    Subtract,
    /// Pop two numbers, push `a * b`.
    Multiply,
    /// Pop two numbers, push `a / b`.
    Divide,
    /// Pop one value, push its logical negation.
    Not,
    /// Pop one number, push its arithmetic negation.
    Negate,
    /// Pop and print the top of the stack.
    Print,
    /// Return from the current function.
    Return,
}

impl OpCode {
    const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Constant,
            1 => Self::Nil,
            2 => Self::True,
            3 => Self::False,
            4 => Self::Pop,
            5 => Self::GetGlobal,
            6 => Self::DefineGlobal,
            7 => Self::SetGlobal,
            8 => Self::Equal,
            9 => Self::Greater,
            10 => Self::Less,
            11 => Self::Add,
            12 => Self::Subtract,
            13 => Self::Multiply,
            14 => Self::Divide,
            15 => Self::Not,
            16 => Self::Negate,
            17 => Self::Print,
            18 => Self::Return,
            _ => return None,
        })
    }
}

/// A compiled unit of bytecode: instructions, their source lines, and the
/// constants they reference.
#[derive(Default)]
pub struct Chunk {
    code: DynamicArray<u8>,
    lines: DynamicArray<u32>,
    constants: DynamicArray<Value>,
}

impl Chunk {
    /// Create an empty chunk.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            code: DynamicArray::new(),
            lines: DynamicArray::new(),
            constants: DynamicArray::new(),
        }
    }

    /// Append a raw byte (an opcode or an operand), tagged with its source
    /// line.
    pub fn write(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Append an opcode, tagged with its source line.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.write(op as u8, line);
    }

    /// Add `value` to the constant pool. Returns its index, or `None` if the
    /// pool is already at the 8-bit index limit (256 constants).
    #[must_use]
    pub fn add_constant(&mut self, value: Value) -> Option<u8> {
        let index = self.constants.len();
        if index > usize::from(u8::MAX) {
            return None;
        }
        self.constants.push(value);
        u8::try_from(index).ok()
    }

    /// Number of bytes of emitted code.
    #[must_use]
    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    /// Raw code bytes.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        self.code.as_slice()
    }

    /// The source line a given instruction offset was emitted from.
    #[must_use]
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    /// The constant pool.
    #[must_use]
    pub fn constants(&self) -> &[Value] {
        self.constants.as_slice()
    }

    /// Decode the opcode at `offset`, if any.
    #[must_use]
    pub fn opcode_at(&self, offset: usize) -> Option<OpCode> {
        self.code.get(offset).copied().and_then(OpCode::from_u8)
    }

    /// Render the whole chunk as a clox-style disassembly listing.
    #[cfg(any(test, feature = "std"))]
    #[must_use]
    pub fn disassemble(&self, name: &str) -> String {
        use core::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "== {name} ==");

        let mut offset = 0;
        while offset < self.code_len() {
            offset = self.disassemble_instruction(&mut out, offset);
        }
        out
    }

    #[cfg(any(test, feature = "std"))]
    fn disassemble_instruction(&self, out: &mut String, offset: usize) -> usize {
        use core::fmt::Write as _;

        let _ = write!(out, "{offset:04} ");
        let line = self.line_at(offset).unwrap_or_default();
        if offset > 0 && self.line_at(offset - 1) == Some(line) {
            let _ = write!(out, "   | ");
        } else {
            let _ = write!(out, "{line:4} ");
        }

        let Some(op) = self.opcode_at(offset) else {
            let _ = writeln!(out, "unknown opcode {}", self.code()[offset]);
            return offset + 1;
        };

        match op {
            OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal => {
                let constant = self.code()[offset + 1];
                let value = self.constants().get(usize::from(constant));
                let _ = writeln!(out, "{op:?} {constant:4} ({value:?})");
                offset + 2
            }
            _ => {
                let _ = writeln!(out, "{op:?}");
                offset + 1
            }
        }
    }
}
