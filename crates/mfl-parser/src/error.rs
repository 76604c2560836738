//! Syntax errors reported by the shift-reduce parser.

use std::fmt;

use mfl_common::span::Span;

/// A syntax error: no shift or reduce action applied at `span`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Location of the offending lookahead token.
    pub span: Span,
    /// Symbols that would have been accepted at this point.
    pub expected: Vec<String>,
    /// Optional related location, e.g. the `(` an unclosed group started at.
    pub related: Option<(String, Span)>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span, expected: Vec<String>) -> Self {
        Self {
            message: message.into(),
            span,
            expected,
            related: None,
        }
    }

    /// Attach a related span for additional context.
    pub fn with_related(mut self, message: impl Into<String>, span: Span) -> Self {
        self.related = Some((message.into(), span));
        self
    }

    /// The expected set rendered as `a, b or c`.
    pub fn expected_list(&self) -> String {
        match self.expected.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [init @ .., last] => format!("{} or {}", init.join(", "), last),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.span.start)?;
        if !self.expected.is_empty() {
            write!(f, " (expected {})", self.expected_list())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
