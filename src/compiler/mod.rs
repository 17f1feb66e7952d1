// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Single-pass Pratt-parsing compiler: tokens flow straight into bytecode,
//! with no intermediate AST. Parsing and code generation are the same pass.
//!
//! Parse rules are dispatched through `call_prefix`/`call_infix` rather than
//! a table of function pointers, since `Compiler` is itself generic over the
//! source and VM lifetimes and a stored fn-pointer table would have to be
//! polymorphic over both at once.

#[cfg(test)]
mod compiler_test;

#[cfg(any(test, feature = "std"))]
use std::string::String;

#[cfg(not(any(test, feature = "std")))]
use alloc::string::String;

use core::fmt;

use crate::chunk::{Chunk, OpCode};
use crate::scanner::{Scanner, Token, TokenKind};
use crate::value::Value;
use crate::vm::VmState;

/// Compilation failed; diagnostics were already emitted via `tracing` as
/// each error was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileError;

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "compilation failed due to one or more prior errors")
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for CompileError {}

/// Operator binding power, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    const fn next(self) -> Self {
        match self {
            Self::None => Self::Assignment,
            Self::Assignment => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Call,
            Self::Call | Self::Primary => Self::Primary,
        }
    }
}

/// Binding power a token would have if used as an infix/postfix operator.
/// `Precedence::None` for tokens with no infix meaning.
const fn infix_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Minus | TokenKind::Plus => Precedence::Term,
        TokenKind::Slash | TokenKind::Star => Precedence::Factor,
        TokenKind::BangEqual | TokenKind::EqualEqual => Precedence::Equality,
        TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => Precedence::Comparison,
        _ => Precedence::None,
    }
}

/// Maximum number of locals in scope at once: one per 8-bit local slot.
const UINT8_COUNT: usize = 256;

/// A local-variable binding: its name token and the scope depth it was
/// declared at.
///
/// Reserved for future local-variable handling; `Compiler` carries this
/// state but nothing reads it yet, since this compiler only ever emits
/// global-variable opcodes today.
#[derive(Debug, Clone, Copy)]
struct Local<'src> {
    name: Token<'src>,
    depth: i32,
}

/// Compiles a single source string to a `Chunk`, interning string constants
/// through `vm` as it goes.
pub struct Compiler<'src, 'vm> {
    scanner: Scanner<'src>,
    previous: Token<'src>,
    current: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    chunk: Chunk,
    vm: &'vm mut VmState,
    /// All locals currently in scope, source order. Unused until local
    /// variables are compiled.
    #[expect(dead_code, reason = "local-variable resolution is not implemented yet; only globals are compiled")]
    locals: [Local<'src>; UINT8_COUNT],
    /// Number of slots in `locals` in use.
    #[expect(dead_code, reason = "local-variable resolution is not implemented yet; only globals are compiled")]
    local_count: usize,
    /// Number of nested blocks currently open.
    #[expect(dead_code, reason = "local-variable resolution is not implemented yet; only globals are compiled")]
    scope_depth: i32,
}

const DUMMY_TOKEN: Token<'static> = Token { kind: TokenKind::Eof, lexeme: "", line: 0 };

impl<'src, 'vm> Compiler<'src, 'vm> {
    fn new(source: &'src str, vm: &'vm mut VmState) -> Self {
        Self {
            scanner: Scanner::new(source),
            previous: DUMMY_TOKEN,
            current: DUMMY_TOKEN,
            had_error: false,
            panic_mode: false,
            chunk: Chunk::new(),
            vm,
            locals: [Local { name: DUMMY_TOKEN, depth: 0 }; UINT8_COUNT],
            local_count: 0,
            scope_depth: 0,
        }
    }

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let message = self.current.lexeme;
            self.error_at_current(message);
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &'static str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at(&mut self, token: Token<'_>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;

        let location = match token.kind {
            TokenKind::Eof => String::from(" at end"),
            TokenKind::Error => String::new(),
            _ => format_at(token.lexeme),
        };

        tracing::error!(line = token.line, "[line {}] error{}: {}", token.line, location, message);
        self.had_error = true;
    }

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk.write(byte, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        let line = self.previous.line;
        self.chunk.write_op(op, line);
    }

    fn emit_bytes(&mut self, op: OpCode, byte: u8) {
        self.emit_op(op);
        self.emit_byte(byte);
    }

    fn emit_constant(&mut self, value: Value) {
        match self.chunk.add_constant(value) {
            Some(index) => self.emit_bytes(OpCode::Constant, index),
            None => self.error("Too many constants in one chunk."),
        }
    }

    fn end(mut self) -> Chunk {
        self.emit_op(OpCode::Return);
        self.chunk
    }

    /// Dispatch a token's prefix parse rule. Returns `false` if the token has
    /// no prefix meaning (a syntax error at the call site).
    fn call_prefix(&mut self, kind: TokenKind, can_assign: bool) -> bool {
        match kind {
            TokenKind::LeftParen => self.grouping(),
            TokenKind::Minus | TokenKind::Bang => self.unary(kind),
            TokenKind::Number => self.number(),
            TokenKind::String => self.string(),
            TokenKind::False => self.emit_op(OpCode::False),
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            TokenKind::True => self.emit_op(OpCode::True),
            TokenKind::Identifier => self.variable(can_assign),
            _ => return false,
        }
        true
    }

    /// Dispatch a token's infix parse rule. Assumes `infix_precedence(kind)`
    /// was already checked to be high enough by the caller.
    fn call_infix(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Slash
            | TokenKind::Star
            | TokenKind::BangEqual
            | TokenKind::EqualEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => self.binary(kind),
            _ => {}
        }
    }

    fn number(&mut self) {
        let value: f64 = self.previous.lexeme.parse().unwrap_or(f64::NAN);
        self.emit_constant(Value::number(value));
    }

    fn string(&mut self) {
        let raw = self.previous.lexeme;
        let contents = &raw[1..raw.len() - 1];
        let object = self.vm.copy_string(contents);
        self.emit_constant(Value::object(object));
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self, operator: TokenKind) {
        self.parse_precedence(Precedence::Unary);
        match operator {
            TokenKind::Minus => self.emit_op(OpCode::Negate),
            TokenKind::Bang => self.emit_op(OpCode::Not),
            _ => {}
        }
    }

    fn binary(&mut self, operator: TokenKind) {
        self.parse_precedence(infix_precedence(operator).next());

        match operator {
            TokenKind::BangEqual => {
                self.emit_op(OpCode::Equal);
                self.emit_op(OpCode::Not);
            }
            TokenKind::EqualEqual => self.emit_op(OpCode::Equal),
            TokenKind::Greater => self.emit_op(OpCode::Greater),
            TokenKind::GreaterEqual => {
                self.emit_op(OpCode::Less);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Less => self.emit_op(OpCode::Less),
            TokenKind::LessEqual => {
                self.emit_op(OpCode::Greater);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Plus => self.emit_op(OpCode::Add),
            TokenKind::Minus => self.emit_op(OpCode::Subtract),
            TokenKind::Star => self.emit_op(OpCode::Multiply),
            TokenKind::Slash => self.emit_op(OpCode::Divide),
            _ => {}
        }
    }

    fn variable(&mut self, can_assign: bool) {
        let name = self.previous;
        self.named_variable(name, can_assign);
    }

    fn named_variable(&mut self, name: Token<'_>, can_assign: bool) {
        let Some(index) = self.identifier_constant(name) else {
            return;
        };

        if can_assign && self.match_token(TokenKind::Equal) {
            self.expression();
            self.emit_bytes(OpCode::SetGlobal, index);
        } else {
            self.emit_bytes(OpCode::GetGlobal, index);
        }
    }

    fn identifier_constant(&mut self, name: Token<'_>) -> Option<u8> {
        let object = self.vm.copy_string(name.lexeme);
        let index = self.chunk.add_constant(Value::object(object));
        if index.is_none() {
            self.error("Too many constants in one chunk.");
        }
        index
    }

    fn parse_variable(&mut self, message: &'static str) -> Option<u8> {
        self.consume(TokenKind::Identifier, message);
        let name = self.previous;
        self.identifier_constant(name)
    }

    fn define_variable(&mut self, index: u8) {
        self.emit_bytes(OpCode::DefineGlobal, index);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let can_assign = precedence <= Precedence::Assignment;
        if !self.call_prefix(self.previous.kind, can_assign) {
            self.error("Expect expression.");
            return;
        }

        while precedence <= infix_precedence(self.current.kind) {
            self.advance();
            self.call_infix(self.previous.kind);
        }

        if can_assign && self.match_token(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn declaration(&mut self) {
        if self.match_token(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        let Some(global) = self.parse_variable("Expect variable name.") else {
            return;
        };

        if self.match_token(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.");
        self.define_variable(global);
    }

    fn statement(&mut self) {
        if self.match_token(TokenKind::Print) {
            self.print_statement();
        } else {
            self.expression_statement();
        }
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value.");
        self.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        self.emit_op(OpCode::Pop);
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;

        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => self.advance(),
            }
        }
    }
}

fn format_at(lexeme: &str) -> String {
    #[cfg(any(test, feature = "std"))]
    {
        std::format!(" at '{lexeme}'")
    }
    #[cfg(not(any(test, feature = "std")))]
    {
        let mut out = String::from(" at '");
        out.push_str(lexeme);
        out.push('\'');
        out
    }
}

/// Compile `source` into a bytecode chunk, interning any string constants
/// through `vm`.
///
/// # Errors
///
/// Returns [`CompileError`] if any syntax error was encountered; individual
/// diagnostics are emitted as `tracing` error events as they are found.
pub fn compile(source: &str, vm: &mut VmState) -> Result<Chunk, CompileError> {
    let mut compiler = Compiler::new(source, vm);
    compiler.advance();

    while !compiler.match_token(TokenKind::Eof) {
        compiler.declaration();
    }

    let had_error = compiler.had_error;
    let chunk = compiler.end();

    if had_error { Err(CompileError) } else { Ok(chunk) }
}
