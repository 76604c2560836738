use std::fmt;

use mfl_common::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A construct with no Core Erlang translation.
    Unsupported { construct: String, span: Span },
    /// A type annotation was requested for a binder whose type is missing
    /// or still contains free type variables.
    UnresolvedType { name: String, span: Span },
}

impl CodegenError {
    pub fn span(&self) -> Span {
        match self {
            CodegenError::Unsupported { span, .. } | CodegenError::UnresolvedType { span, .. } => {
                *span
            }
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::Unsupported { construct, .. } => {
                write!(f, "cannot translate {construct} to Core Erlang")
            }
            CodegenError::UnresolvedType { name, .. } => {
                write!(f, "type of `{name}` is not fully resolved")
            }
        }
    }
}

impl std::error::Error for CodegenError {}
