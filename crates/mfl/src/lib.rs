//! The MFL toolchain.
//!
//! MFL is a minimal functional language: integers, booleans, variables,
//! λ-abstraction, application, let-binding and binary operators. This crate
//! wires the stage crates into one pipeline:
//!
//! ```text
//! source -> tokens -> Expr -> TypeckResult -> { SECD code -> Value
//!                                             | Core Erlang module text }
//! ```
//!
//! A failure at any stage stops the run and is returned as an [`MflError`],
//! which [`diagnostics::render_diagnostic`] turns into an ariadne report or a
//! JSON line.
//!
//! # Example
//!
//! ```
//! use mfl::{run, BackendOutput, CompileOptions};
//! use mfl_secd::Value;
//!
//! let output = run("let double = λx.(x*2) in (double 21)", &CompileOptions::default()).unwrap();
//! assert_eq!(output.ty.to_string(), "int");
//! match output.backend {
//!     BackendOutput::Secd { value, .. } => assert_eq!(value, Value::Int(42)),
//!     BackendOutput::CoreErlang { .. } => unreachable!(),
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;

pub use config::{Backend, CompileOptions};
pub use diagnostics::{render_diagnostic, DiagnosticOptions};
pub use error::MflError;
pub use pipeline::{
    compile_secd, generate_core_erlang, lex, parse, parse_source, parse_traced, run, run_secd,
    typecheck, BackendOutput, Output, Pipeline,
};
