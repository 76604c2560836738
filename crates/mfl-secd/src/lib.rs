//! SECD backend for MFL.
//!
//! A type-checked expression is compiled to a linear instruction sequence
//! with every variable occurrence resolved to a static `(depth, index)`
//! lexical address, then executed on a Stack/Environment/Control/Dump
//! machine.
//!
//! - [`instr`]: instruction set and code listings
//! - [`compile`]: AST to instructions, with the compile-time scope table
//! - [`value`]: runtime values and environment frames
//! - [`machine`]: the interpreter loop
//! - [`error`]: runtime faults

pub mod compile;
pub mod error;
pub mod instr;
pub mod machine;
pub mod value;

pub use compile::{compile, compile_in, Scope};
pub use error::RuntimeFault;
pub use instr::{ArithOp, Code, Const, Instr};
pub use machine::{run, Machine, MachineConfig};
pub use value::Value;
