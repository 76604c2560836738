//! Type error types with provenance tracking.
//!
//! Every unification failure carries a `ConstraintOrigin` that records where
//! the constraint was generated, so diagnostics can point at the operator or
//! application that demanded the two types be equal.

use std::fmt;

use mfl_common::span::Span;
use mfl_parser::{BinOp, UnaryOp};

use crate::ty::{Ty, TyVar};

/// The origin of a type constraint -- where in the source code did we
/// decide these two types should be equal?
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintOrigin {
    /// Operand of a binary operator: `a + b` requires `int` operands.
    BinOp { op: BinOp, span: Span },
    /// Operand of a prefix operator: `!a` requires a `bool` operand.
    UnaryOp { op: UnaryOp, span: Span },
    /// `f x` requires `f` to be a function accepting the type of `x`.
    Apply { span: Span },
    /// Synthetic origin for constraints with no source location.
    Builtin,
}

impl ConstraintOrigin {
    pub fn span(&self) -> Option<Span> {
        match self {
            ConstraintOrigin::BinOp { span, .. }
            | ConstraintOrigin::UnaryOp { span, .. }
            | ConstraintOrigin::Apply { span } => Some(*span),
            ConstraintOrigin::Builtin => None,
        }
    }

    /// Short description used as a diagnostic label.
    pub fn describe(&self) -> String {
        match self {
            ConstraintOrigin::BinOp { op, .. } => format!("operands of `{op}` are checked here"),
            ConstraintOrigin::UnaryOp { op, .. } => format!("operand of `{op}` is checked here"),
            ConstraintOrigin::Apply { .. } => "function applied here".to_string(),
            ConstraintOrigin::Builtin => "required by a built-in rule".to_string(),
        }
    }
}

/// A type error encountered during type checking.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// Two types that must be equal are not.
    Mismatch {
        left: Ty,
        right: Ty,
        origin: ConstraintOrigin,
    },
    /// A type variable appears in its own definition (infinite type).
    ///
    /// Example: unifying `'t0` with `'t0 -> int` would need the infinite
    /// type `((... -> int) -> int) -> int`.
    InfiniteType {
        var: TyVar,
        ty: Ty,
        origin: ConstraintOrigin,
    },
    /// A variable is used but not bound by any enclosing λ or let.
    UnboundVariable { name: String, span: Span },
}

impl TypeError {
    /// True for unification failures, including the occurs check.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, TypeError::Mismatch { .. } | TypeError::InfiniteType { .. })
    }

    /// Source location the error should be reported at, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            TypeError::Mismatch { origin, .. } | TypeError::InfiniteType { origin, .. } => {
                origin.span()
            }
            TypeError::UnboundVariable { span, .. } => Some(*span),
        }
    }

    pub fn origin(&self) -> Option<&ConstraintOrigin> {
        match self {
            TypeError::Mismatch { origin, .. } | TypeError::InfiniteType { origin, .. } => {
                Some(origin)
            }
            TypeError::UnboundVariable { .. } => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Mismatch { left, right, .. } => {
                write!(f, "Type mismatch: {left} and {right}")
            }
            // A cyclic type is reported as a mismatch between the variable
            // and the type containing it.
            TypeError::InfiniteType { var, ty, .. } => {
                write!(f, "Type mismatch: {var} and {ty}")
            }
            TypeError::UnboundVariable { name, .. } => {
                write!(f, "Unbound variable: {name}")
            }
        }
    }
}

impl std::error::Error for TypeError {}
