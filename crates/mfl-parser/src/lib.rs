//! MFL parser: a table-driven shift-reduce parser producing a typed-ready AST.
//!
//! The parser consumes the token vector produced by `mfl-lexer` and keeps an
//! explicit stack of partially reduced symbols. Every step either shifts the
//! lookahead token or reduces a handle on top of the stack, guided by the
//! operator precedence table in [`ast::BinOp::precedence`].
//!
//! # Architecture
//!
//! - [`ast`]: the closed expression tree (`Expr`, `ExprKind`, operators)
//! - [`error`]: `ParseError` with the expected-symbol set
//! - [`trace`]: the optional shift/reduce trace returned by [`parse_traced`]

pub mod ast;
pub mod error;
mod parser;
pub mod trace;

pub use ast::{BinOp, Binder, Expr, ExprKind, UnaryOp};
pub use error::ParseError;
pub use parser::MAX_NESTING;
pub use trace::{ParseAction, ParseTrace, Rule};

use mfl_common::token::Token;

/// Parse a token sequence (ending in `Eof`) into an expression.
pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    parser::ShiftReduce::new(tokens, false).run().map(|(expr, _)| expr)
}

/// Parse and also return every shift/reduce action taken.
///
/// The trace is purely diagnostic; the resulting tree is identical to the
/// one returned by [`parse`].
pub fn parse_traced(tokens: &[Token]) -> Result<(Expr, ParseTrace), ParseError> {
    parser::ShiftReduce::new(tokens, true).run()
}
