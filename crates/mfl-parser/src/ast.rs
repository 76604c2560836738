//! The MFL expression tree.
//!
//! The tree is closed: every node is one of the [`ExprKind`] variants and
//! carries the source span it was reduced from. `Display` renders a fully
//! parenthesised form that re-parses to the same tree; [`Expr::raw`] renders
//! the constructor structure for debugging.

use std::fmt;

use mfl_common::span::Span;
use mfl_common::token::TokenKind;
use serde::Serialize;

/// An expression node with its source span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// A name introduced by a lambda parameter or a `let` binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binder {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    Var(String),
    Int(i64),
    Bool(bool),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Lambda {
        param: Binder,
        body: Box<Expr>,
    },
    Apply {
        func: Box<Expr>,
        arg: Box<Expr>,
    },
    Let {
        name: Binder,
        value: Box<Expr>,
        body: Box<Expr>,
    },
}

/// Binary operators, all left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Not,
}

impl BinOp {
    /// Map an operator token to its binary operator, if it is one.
    pub fn from_token(kind: &TokenKind) -> Option<BinOp> {
        let op = match kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Rem,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::NotEq,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::LtEq => BinOp::LtEq,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::GtEq => BinOp::GtEq,
            TokenKind::Amp => BinOp::And,
            TokenKind::Bar => BinOp::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Binding power; higher binds tighter.
    ///
    /// Prefix `!` sits above every binary level and application above that.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => 3,
            BinOp::Add | BinOp::Sub => 4,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 5,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&",
            BinOp::Or => "|",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn var(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Var(name.into()), span)
    }

    pub fn int(value: i64, span: Span) -> Self {
        Self::new(ExprKind::Int(value), span)
    }

    pub fn bool(value: bool, span: Span) -> Self {
        Self::new(ExprKind::Bool(value), span)
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.merge(rhs.span);
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn apply(func: Expr, arg: Expr) -> Self {
        let span = func.span.merge(arg.span);
        Self::new(
            ExprKind::Apply {
                func: Box::new(func),
                arg: Box::new(arg),
            },
            span,
        )
    }

    /// Render the constructor structure, e.g. `Apply(Var("f"), Int(1))`.
    pub fn raw(&self) -> String {
        match &self.kind {
            ExprKind::Var(name) => format!("Var({name:?})"),
            ExprKind::Int(n) => format!("Int({n})"),
            ExprKind::Bool(b) => format!("Bool({b})"),
            ExprKind::Binary { op, lhs, rhs } => {
                format!("BinOp({:?}, {}, {})", op.symbol(), lhs.raw(), rhs.raw())
            }
            ExprKind::Unary { op: UnaryOp::Not, operand } => format!("Not({})", operand.raw()),
            ExprKind::Lambda { param, body } => format!("Lambda({:?}, {})", param.name, body.raw()),
            ExprKind::Apply { func, arg } => format!("Apply({}, {})", func.raw(), arg.raw()),
            ExprKind::Let { name, value, body } => {
                format!("Let({:?}, {}, {})", name.name, value.raw(), body.raw())
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + match &self.kind {
            ExprKind::Var(_) | ExprKind::Int(_) | ExprKind::Bool(_) => 0,
            ExprKind::Binary { lhs, rhs, .. } => lhs.size() + rhs.size(),
            ExprKind::Unary { operand, .. } => operand.size(),
            ExprKind::Lambda { body, .. } => body.size(),
            ExprKind::Apply { func, arg } => func.size() + arg.size(),
            ExprKind::Let { value, body, .. } => value.size() + body.size(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Var(name) => write!(f, "{name}"),
            ExprKind::Int(n) => write!(f, "{n}"),
            ExprKind::Bool(true) => write!(f, "True"),
            ExprKind::Bool(false) => write!(f, "False"),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            // Parenthesised so `!` applied to an application stays unambiguous.
            ExprKind::Unary { op, operand } => write!(f, "({op}{operand})"),
            ExprKind::Lambda { param, body } => write!(f, "(λ{}.{body})", param.name),
            ExprKind::Apply { func, arg } => write!(f, "({func} {arg})"),
            ExprKind::Let { name, value, body } => {
                write!(f, "(let {} = {value} in {body})", name.name)
            }
        }
    }
}
