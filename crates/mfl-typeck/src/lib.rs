//! MFL type checker: Hindley-Milner type inference with let-polymorphism.
//!
//! This crate assigns a type to every node of a parsed MFL expression using
//! Algorithm W. Substitutions and environments are persistent values that
//! are threaded through the inference explicitly, and every unification is
//! occurs-checked.
//!
//! # Architecture
//!
//! - [`ty`]: Core type representation (Ty, TyCon, TyVar, Scheme)
//! - [`subst`]: Persistent substitutions and the `Types` trait
//! - [`env`]: Persistent type environment
//! - [`unify`]: Pure unification with occurs check
//! - [`error`]: Type error types with provenance tracking
//! - [`infer`]: Algorithm W inference engine

pub mod env;
pub mod error;
pub mod infer;
pub mod subst;
pub mod ty;
pub mod unify;

use mfl_common::span::Span;
use rustc_hash::FxHashMap;

use crate::ty::{Scheme, Ty};

pub use crate::error::{ConstraintOrigin, TypeError};
pub use crate::infer::{check, infer};

/// The result of type checking an MFL program.
#[derive(Debug, Clone)]
pub struct TypeckResult {
    /// Type of the whole program, fully substituted.
    pub ty: Ty,
    /// `ty` closed over all of its variables.
    pub scheme: Scheme,
    /// Map from node (and binder) spans to their inferred types.
    pub types: FxHashMap<Span, Ty>,
    /// Scheme of each let binding, keyed by the binder's span.
    pub bindings: FxHashMap<Span, Scheme>,
}

impl TypeckResult {
    pub fn type_of(&self, span: Span) -> Option<&Ty> {
        self.types.get(&span)
    }

    pub fn binding_scheme(&self, binder: Span) -> Option<&Scheme> {
        self.bindings.get(&binder)
    }
}
