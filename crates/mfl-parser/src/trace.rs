//! Observable shift/reduce trace.
//!
//! Recording the trace never changes the parse result; it only exists so a
//! caller can show how the engine arrived at the tree.

use std::fmt;

use serde::Serialize;

use crate::ast::BinOp;

/// A grammar production the engine reduced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rule {
    /// `E -> int | bool | ident`
    Atom,
    /// `E -> ( E )`
    Paren,
    /// `E -> E E`
    Apply,
    /// `E -> ! E`
    Not,
    /// `E -> E op E`
    Binary(BinOp),
    /// `E -> λ x . E`
    Lambda,
    /// `E -> let x = E in E`
    Let,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Atom => write!(f, "E -> atom"),
            Rule::Paren => write!(f, "E -> ( E )"),
            Rule::Apply => write!(f, "E -> E E"),
            Rule::Not => write!(f, "E -> ! E"),
            Rule::Binary(op) => write!(f, "E -> E {op} E"),
            Rule::Lambda => write!(f, "E -> λ x . E"),
            Rule::Let => write!(f, "E -> let x = E in E"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseAction {
    /// The lookahead token (by its source text) was pushed.
    Shift(String),
    Reduce(Rule),
}

impl fmt::Display for ParseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAction::Shift(text) => write!(f, "shift `{text}`"),
            ParseAction::Reduce(rule) => write!(f, "reduce {rule}"),
        }
    }
}

/// Ordered list of actions taken during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseTrace {
    actions: Vec<ParseAction>,
}

impl ParseTrace {
    pub fn push(&mut self, action: ParseAction) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[ParseAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn shifts(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ParseAction::Shift(_)))
            .count()
    }

    pub fn reductions(&self) -> impl Iterator<Item = Rule> + '_ {
        self.actions.iter().filter_map(|a| match a {
            ParseAction::Reduce(rule) => Some(*rule),
            ParseAction::Shift(_) => None,
        })
    }
}

impl fmt::Display for ParseTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            writeln!(f, "{action}")?;
        }
        Ok(())
    }
}
