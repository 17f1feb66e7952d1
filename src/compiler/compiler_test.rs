// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::compile;
use crate::chunk::OpCode;
use crate::vm::VmState;

fn opcodes(source: &str) -> std::vec::Vec<OpCode> {
    let mut vm = VmState::new();
    let chunk = compile(source, &mut vm).expect("source should compile");

    let mut out = std::vec::Vec::new();
    let mut offset = 0;
    while offset < chunk.code_len() {
        let op = chunk.opcode_at(offset).expect("valid opcode");
        out.push(op);
        offset += match op {
            OpCode::Constant | OpCode::GetGlobal | OpCode::SetGlobal | OpCode::DefineGlobal => 2,
            _ => 1,
        };
    }
    out
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
        opcodes("1 + 2 * 3;"),
        std::vec![
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Multiply,
            OpCode::Add,
            OpCode::Pop,
            OpCode::Return,
        ]
    );
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(
        opcodes("1 - 2 - 3;"),
        std::vec![
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Subtract,
            OpCode::Constant,
            OpCode::Subtract,
            OpCode::Pop,
            OpCode::Return,
        ]
    );
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(
        opcodes("(1 + 2) * 3;"),
        std::vec![
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Add,
            OpCode::Constant,
            OpCode::Multiply,
            OpCode::Pop,
            OpCode::Return,
        ]
    );
}

#[test]
fn greater_equal_desugars_to_less_then_not() {
    assert_eq!(
        opcodes("1 >= 2;"),
        std::vec![OpCode::Constant, OpCode::Constant, OpCode::Less, OpCode::Not, OpCode::Pop, OpCode::Return]
    );
}

#[test]
fn not_equal_desugars_to_equal_then_not() {
    assert_eq!(
        opcodes("1 != 2;"),
        std::vec![OpCode::Constant, OpCode::Constant, OpCode::Equal, OpCode::Not, OpCode::Pop, OpCode::Return]
    );
}

#[test]
fn unary_minus_and_bang_compile() {
    assert_eq!(opcodes("-1;"), std::vec![OpCode::Constant, OpCode::Negate, OpCode::Pop, OpCode::Return]);
    assert_eq!(opcodes("!true;"), std::vec![OpCode::True, OpCode::Not, OpCode::Pop, OpCode::Return]);
}

#[test]
fn var_declaration_without_initializer_defaults_to_nil() {
    assert_eq!(opcodes("var x;"), std::vec![OpCode::Nil, OpCode::DefineGlobal, OpCode::Return]);
}

#[test]
fn var_declaration_with_initializer_and_print_round_trips() {
    assert_eq!(
        opcodes("var x = 1; print x;"),
        std::vec![OpCode::Constant, OpCode::DefineGlobal, OpCode::GetGlobal, OpCode::Print, OpCode::Return]
    );
}

#[test]
fn assignment_to_a_variable_emits_set_global() {
    assert_eq!(
        opcodes("var x = 1; x = 2;"),
        std::vec![
            OpCode::Constant,
            OpCode::DefineGlobal,
            OpCode::Constant,
            OpCode::SetGlobal,
            OpCode::Pop,
            OpCode::Return,
        ]
    );
}

#[test]
fn assignment_to_a_non_variable_target_is_a_compile_error() {
    let mut vm = VmState::new();
    assert!(compile("1 = 2;", &mut vm).is_err());
}

#[test]
fn unterminated_expression_is_a_compile_error() {
    let mut vm = VmState::new();
    assert!(compile("1 +;", &mut vm).is_err());
}

#[test]
fn missing_semicolon_is_a_compile_error() {
    let mut vm = VmState::new();
    assert!(compile("print 1", &mut vm).is_err());
}

#[test]
fn string_literals_intern_through_the_vm() {
    let mut vm = VmState::new();
    let chunk = compile("\"hi\"; \"hi\";", &mut vm).unwrap();
    assert_eq!(chunk.constants().len(), 2);
    assert_eq!(vm.interned_count(), 1, "both literals should intern to the same object");
}

#[test]
fn synchronize_recovers_after_an_error_and_reports_only_once_per_statement() {
    let mut vm = VmState::new();
    // The first statement is malformed (missing semicolon); compilation
    // should still consume the whole source and report failure, not panic.
    let result = compile("1 + ; print 2;", &mut vm);
    assert!(result.is_err());
}
