//! Core Erlang generation for MFL.
//!
//! A type-checked expression is lowered to a Core Erlang module (as read by
//! `erlc +from_core`) with a single exported entry function. λ becomes a
//! one-parameter `fun`, application becomes `apply`, let becomes a local
//! `let`, and operators become calls to `erlang` BIFs. Polymorphic bindings
//! are emitted once; Core Erlang is dynamically typed.
//!
//! ## Architecture
//!
//! - [`core_ir`]: Core Erlang terms and their document layout
//! - [`lower`]: typed AST to Core Erlang, with unique variable naming
//! - [`doc`]: Wadler-Lindig document IR
//! - [`printer`]: width-aware document printer
//!
//! ## Pipeline
//!
//! ```text
//! Expr + TypeckResult -> Module -> Doc -> text
//! ```

pub mod core_ir;
pub mod doc;
mod error;
pub mod lower;
pub mod printer;

use mfl_parser::Expr;
use mfl_typeck::TypeckResult;

pub use error::CodegenError;
pub use lower::{lower, CodegenOptions};
pub use printer::PrintConfig;

/// Lower a type-checked program and render it as Core Erlang text.
pub fn generate(
    expr: &Expr,
    typeck: &TypeckResult,
    options: &CodegenOptions,
) -> Result<String, CodegenError> {
    let module = lower(expr, typeck, options)?;
    Ok(module.render(&PrintConfig::default()))
}
