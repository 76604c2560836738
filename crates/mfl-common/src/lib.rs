//! Shared types for the MFL toolchain: source spans, tokens and lexer errors.

pub mod error;
pub mod span;
pub mod token;
