use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A token produced by the MFL lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token from a kind and byte offsets.
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }

    /// The canonical source text of this token.
    pub fn lexeme(&self) -> String {
        self.kind.to_string()
    }
}

/// Every kind of token in MFL.
///
/// Literal and identifier tokens carry their decoded payload so the parser
/// never has to go back to the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Let,
    In,

    // ── Literals and names ─────────────────────────────────────────────
    /// Integer literal, e.g. `42`.
    Int(i64),
    /// `True` / `False`.
    Bool(bool),
    /// Identifier, e.g. `double`, `x_1`.
    Ident(String),

    /// `λ` or `\`
    Lambda,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `&`
    Amp,
    /// `|`
    Bar,
    /// `!`
    Bang,
    /// `=`
    Eq,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `.` separating a lambda parameter from its body.
    Dot,
    /// `(`
    LParen,
    /// `)`
    RParen,

    /// End of input.
    Eof,
}

/// Coarse token classification, used in diagnostics and expected-token sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenCategory {
    Identifier,
    IntLiteral,
    BoolLiteral,
    Operator,
    Keyword,
    LambdaMarker,
    Delimiter,
    End,
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::Let | TokenKind::In => TokenCategory::Keyword,
            TokenKind::Int(_) => TokenCategory::IntLiteral,
            TokenKind::Bool(_) => TokenCategory::BoolLiteral,
            TokenKind::Ident(_) => TokenCategory::Identifier,
            TokenKind::Lambda => TokenCategory::LambdaMarker,
            TokenKind::Dot | TokenKind::LParen | TokenKind::RParen => TokenCategory::Delimiter,
            TokenKind::Eof => TokenCategory::End,
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Amp
            | TokenKind::Bar
            | TokenKind::Bang
            | TokenKind::Eq => TokenCategory::Operator,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Let => write!(f, "let"),
            TokenKind::In => write!(f, "in"),
            TokenKind::Int(n) => write!(f, "{n}"),
            TokenKind::Bool(true) => write!(f, "True"),
            TokenKind::Bool(false) => write!(f, "False"),
            TokenKind::Ident(name) => write!(f, "{name}"),
            TokenKind::Lambda => write!(f, "λ"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::Amp => write!(f, "&"),
            TokenKind::Bar => write!(f, "|"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Dot => write!(f, "."),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Look up a reserved word from its string representation.
///
/// The lexer calls this after scanning an identifier-shaped token to decide
/// whether it is a keyword, a boolean literal, or a plain identifier.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "let" => Some(TokenKind::Let),
        "in" => Some(TokenKind::In),
        "True" | "true" => Some(TokenKind::Bool(true)),
        "False" | "false" => Some(TokenKind::Bool(false)),
        _ => None,
    }
}
