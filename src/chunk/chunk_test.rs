// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::{Chunk, OpCode};
use crate::value::Value;

#[test]
fn write_keeps_code_and_lines_in_lockstep() {
    let mut chunk = Chunk::new();
    chunk.write_op(OpCode::Nil, 1);
    chunk.write_op(OpCode::True, 1);
    chunk.write_op(OpCode::Pop, 2);

    assert_eq!(chunk.code_len(), 3);
    assert_eq!(chunk.line_at(0), Some(1));
    assert_eq!(chunk.line_at(1), Some(1));
    assert_eq!(chunk.line_at(2), Some(2));
}

#[test]
fn add_constant_returns_its_index() {
    let mut chunk = Chunk::new();
    let a = chunk.add_constant(Value::number(1.0)).unwrap();
    let b = chunk.add_constant(Value::number(2.0)).unwrap();

    assert_eq!(a, 0);
    assert_eq!(b, 1);
    assert_eq!(chunk.constants().len(), 2);
}

#[test]
fn add_constant_fails_past_the_eight_bit_index_limit() {
    let mut chunk = Chunk::new();
    for i in 0..256 {
        assert!(chunk.add_constant(Value::number(f64::from(i))).is_some());
    }
    assert!(chunk.add_constant(Value::number(256.0)).is_none());
}

#[test]
fn opcode_round_trips_through_its_byte_encoding() {
    let mut chunk = Chunk::new();
    chunk.write_op(OpCode::Return, 1);
    assert_eq!(chunk.opcode_at(0), Some(OpCode::Return));
}

#[test]
fn opcode_at_rejects_unknown_bytes() {
    let mut chunk = Chunk::new();
    chunk.write(255, 1);
    assert_eq!(chunk.opcode_at(0), None);
}

#[test]
fn disassemble_marks_repeated_lines_with_a_pipe() {
    let mut chunk = Chunk::new();
    chunk.write_op(OpCode::Nil, 1);
    chunk.write_op(OpCode::Pop, 1);
    chunk.write_op(OpCode::Return, 2);

    let out = chunk.disassemble("test");
    assert!(out.contains("== test =="));
    assert!(out.contains("   | "));
    assert!(out.contains("Return"));
}

#[test]
fn disassemble_shows_constant_operand_and_value() {
    let mut chunk = Chunk::new();
    let index = chunk.add_constant(Value::number(7.0)).unwrap();
    chunk.write_op(OpCode::Constant, 1);
    chunk.write(index, 1);

    let out = chunk.disassemble("test");
    assert!(out.contains("Constant"));
    assert!(out.contains('7'));
}
