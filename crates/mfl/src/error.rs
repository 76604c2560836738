//! The error type for the whole pipeline.

use std::fmt;

use mfl_codegen::CodegenError;
use mfl_common::error::LexError;
use mfl_common::span::Span;
use mfl_parser::ParseError;
use mfl_secd::RuntimeFault;
use mfl_typeck::TypeError;

/// The first failure of a pipeline run, tagged with the stage it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum MflError {
    Lex(LexError),
    Syntax(ParseError),
    Type(TypeError),
    Runtime(RuntimeFault),
    Codegen(CodegenError),
}

impl MflError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            MflError::Lex(_) => "E0001",
            MflError::Syntax(_) => "E0002",
            MflError::Type(TypeError::Mismatch { .. }) => "E0003",
            MflError::Type(TypeError::InfiniteType { .. }) => "E0004",
            MflError::Type(TypeError::UnboundVariable { .. }) => "E0005",
            MflError::Runtime(_) => "E0006",
            MflError::Codegen(_) => "E0007",
        }
    }

    /// Primary source location, if the failure has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            MflError::Lex(err) => Some(err.span),
            MflError::Syntax(err) => Some(err.span),
            MflError::Type(err) => err.span(),
            MflError::Runtime(_) => None,
            MflError::Codegen(err) => Some(err.span()),
        }
    }

    /// Name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            MflError::Lex(_) => "lexer",
            MflError::Syntax(_) => "parser",
            MflError::Type(_) => "type checker",
            MflError::Runtime(_) => "SECD machine",
            MflError::Codegen(_) => "Core Erlang generator",
        }
    }
}

impl fmt::Display for MflError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MflError::Lex(err) => write!(f, "{err}"),
            MflError::Syntax(err) => write!(f, "{err}"),
            MflError::Type(err) => write!(f, "{err}"),
            MflError::Runtime(err) => write!(f, "runtime fault: {err}"),
            MflError::Codegen(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MflError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MflError::Lex(err) => Some(err),
            MflError::Syntax(err) => Some(err),
            MflError::Type(err) => Some(err),
            MflError::Runtime(err) => Some(err),
            MflError::Codegen(err) => Some(err),
        }
    }
}

impl From<LexError> for MflError {
    fn from(err: LexError) -> Self {
        MflError::Lex(err)
    }
}

impl From<ParseError> for MflError {
    fn from(err: ParseError) -> Self {
        MflError::Syntax(err)
    }
}

impl From<TypeError> for MflError {
    fn from(err: TypeError) -> Self {
        MflError::Type(err)
    }
}

impl From<RuntimeFault> for MflError {
    fn from(err: RuntimeFault) -> Self {
        MflError::Runtime(err)
    }
}

impl From<CodegenError> for MflError {
    fn from(err: CodegenError) -> Self {
        MflError::Codegen(err)
    }
}
