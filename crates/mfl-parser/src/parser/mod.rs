//! The shift-reduce engine.
//!
//! The stack holds terminals that have not been consumed by a production yet
//! and expressions that have. Before every shift the engine reduces the handle
//! on top of the stack for as long as the handle's precedence is at least the
//! lookahead's, so a lower-precedence lookahead forces pending work to finish
//! and a higher-precedence one is shifted on top of it.
//!
//! `λ` and `let` handles have the lowest precedence of all and are only
//! reduced by a closing token (`)`, `in`, end of input), which is what makes
//! them extend as far to the right as possible.

use mfl_common::token::{Token, TokenKind};
use tracing::trace;

use crate::ast::{BinOp, Binder, Expr, ExprKind, UnaryOp};
use crate::error::ParseError;
use crate::trace::{ParseAction, ParseTrace, Rule};

/// Binding power used to compare a handle with the lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Prec(u8);

impl Prec {
    /// Closing tokens and `let`/`λ` handles.
    const CLOSE: Prec = Prec(0);
    const PREFIX: Prec = Prec(6);
    const APPLY: Prec = Prec(7);
    /// Handles that never wait for more input.
    const ALWAYS: Prec = Prec(u8::MAX);

    fn binary(op: BinOp) -> Prec {
        Prec(op.precedence())
    }
}

/// Deepest expression tree the parser will build.
///
/// Later stages walk the tree recursively, so an unbounded depth would turn
/// a long chain like `1 + 1 + ... + 1` into a stack overflow there.
pub const MAX_NESTING: u32 = 128;

#[derive(Debug)]
enum Symbol {
    Term(Token),
    /// A reduced expression and the depth of its tree.
    Expr(Expr, u32),
}

impl Symbol {
    fn term(&self) -> Option<&TokenKind> {
        match self {
            Symbol::Term(tok) => Some(&tok.kind),
            Symbol::Expr(..) => None,
        }
    }

    fn is_expr(&self) -> bool {
        matches!(self, Symbol::Expr(..))
    }
}

/// What kind of symbol the stack can accept next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectOperand,
    AfterExpr,
    ExpectBinder,
    ExpectDot,
    ExpectEq,
}

fn starts_operand(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int(_)
            | TokenKind::Bool(_)
            | TokenKind::Ident(_)
            | TokenKind::LParen
            | TokenKind::Lambda
            | TokenKind::Let
            | TokenKind::Bang
    )
}

/// Precedence of a lookahead token.
///
/// A token that can start an operand continues an application, so it
/// carries application precedence.
fn lookahead_prec(kind: &TokenKind) -> Prec {
    if let Some(op) = BinOp::from_token(kind) {
        Prec::binary(op)
    } else if starts_operand(kind) {
        Prec::APPLY
    } else {
        Prec::CLOSE
    }
}

fn rule_prec(rule: Rule) -> Prec {
    match rule {
        Rule::Atom | Rule::Paren => Prec::ALWAYS,
        Rule::Apply => Prec::APPLY,
        Rule::Not => Prec::PREFIX,
        Rule::Binary(op) => Prec::binary(op),
        Rule::Lambda | Rule::Let => Prec::CLOSE,
    }
}

const OPERAND_EXPECTED: &[&str] = &[
    "integer",
    "boolean",
    "identifier",
    "`(`",
    "`λ`",
    "`let`",
    "`!`",
];

pub(crate) struct ShiftReduce<'t> {
    tokens: &'t [Token],
    pos: usize,
    stack: Vec<Symbol>,
    trace: Option<ParseTrace>,
}

impl<'t> ShiftReduce<'t> {
    pub(crate) fn new(tokens: &'t [Token], record_trace: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            stack: Vec::new(),
            trace: record_trace.then(ParseTrace::default),
        }
    }

    pub(crate) fn run(mut self) -> Result<(Expr, ParseTrace), ParseError> {
        loop {
            let token = self.lookahead();
            let la_prec = lookahead_prec(&token.kind);

            while let Some(rule) = self.find_handle() {
                if rule_prec(rule) < la_prec {
                    break;
                }
                self.reduce(rule)?;
            }

            if token.kind == TokenKind::Eof {
                return self.accept(&token);
            }

            self.check_shift(&token)?;
            self.shift(token);
        }
    }

    // ── Input ──────────────────────────────────────────────────────────

    /// The current token. A missing trailing `Eof` is synthesised.
    fn lookahead(&self) -> Token {
        match self.tokens.get(self.pos) {
            Some(tok) => tok.clone(),
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                Token::new(TokenKind::Eof, end, end)
            }
        }
    }

    fn shift(&mut self, token: Token) {
        trace!(token = %token.kind, "shift");
        self.record(ParseAction::Shift(token.lexeme()));
        self.pos += 1;
        self.stack.push(Symbol::Term(token));
    }

    fn record(&mut self, action: ParseAction) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(action);
        }
    }

    // ── Handles ────────────────────────────────────────────────────────

    /// Symbol `n` positions below the top (0 is the top).
    fn peek(&self, n: usize) -> Option<&Symbol> {
        self.stack.len().checked_sub(n + 1).map(|i| &self.stack[i])
    }

    fn peek_term(&self, n: usize) -> Option<&TokenKind> {
        self.peek(n).and_then(Symbol::term)
    }

    fn peek_is_expr(&self, n: usize) -> bool {
        self.peek(n).is_some_and(Symbol::is_expr)
    }

    /// An identifier directly after `λ` or `let` names a binder, not a variable.
    fn top_is_binder(&self) -> bool {
        matches!(self.peek_term(0), Some(TokenKind::Ident(_)))
            && matches!(self.peek_term(1), Some(TokenKind::Lambda | TokenKind::Let))
    }

    fn find_handle(&self) -> Option<Rule> {
        match self.peek(0)? {
            Symbol::Term(tok) => match tok.kind {
                TokenKind::Int(_) | TokenKind::Bool(_) => Some(Rule::Atom),
                TokenKind::Ident(_) if !self.top_is_binder() => Some(Rule::Atom),
                TokenKind::RParen => Some(Rule::Paren),
                _ => None,
            },
            Symbol::Expr(..) => {
                if self.peek_is_expr(1) {
                    return Some(Rule::Apply);
                }
                let below = self.peek_term(1)?;
                if let Some(op) = BinOp::from_token(below) {
                    return self.peek_is_expr(2).then_some(Rule::Binary(op));
                }
                match below {
                    TokenKind::Bang => Some(Rule::Not),
                    TokenKind::Dot => Some(Rule::Lambda),
                    TokenKind::In => Some(Rule::Let),
                    _ => None,
                }
            }
        }
    }

    fn pop_expr(&mut self) -> (Expr, u32) {
        match self.stack.pop() {
            Some(Symbol::Expr(expr, depth)) => (expr, depth),
            other => unreachable!("parse stack: expected expression, found {other:?}"),
        }
    }

    fn pop_term(&mut self) -> Token {
        match self.stack.pop() {
            Some(Symbol::Term(tok)) => tok,
            other => unreachable!("parse stack: expected terminal, found {other:?}"),
        }
    }

    fn pop_binder(&mut self) -> Binder {
        let tok = self.pop_term();
        match tok.kind {
            TokenKind::Ident(name) => Binder {
                name,
                span: tok.span,
            },
            other => unreachable!("parse stack: expected binder, found {other:?}"),
        }
    }

    /// Replace the handle `rule` on top of the stack with its expression.
    ///
    /// Fails once the new tree would be deeper than [`MAX_NESTING`].
    ///
    /// # Panics
    ///
    /// Panics if the stack does not end in the shape `find_handle` reported.
    fn reduce(&mut self, rule: Rule) -> Result<(), ParseError> {
        let (expr, depth) = match rule {
            Rule::Atom => {
                let tok = self.pop_term();
                match tok.kind {
                    TokenKind::Int(n) => (Expr::int(n, tok.span), 1),
                    TokenKind::Bool(b) => (Expr::bool(b, tok.span), 1),
                    TokenKind::Ident(name) => (Expr::var(name, tok.span), 1),
                    other => unreachable!("not an atom: {other:?}"),
                }
            }
            Rule::Paren => {
                self.pop_term();
                let inner = self.pop_expr();
                self.pop_term();
                inner
            }
            Rule::Apply => {
                let (arg, arg_depth) = self.pop_expr();
                let (func, func_depth) = self.pop_expr();
                (Expr::apply(func, arg), 1 + func_depth.max(arg_depth))
            }
            Rule::Not => {
                let (operand, depth) = self.pop_expr();
                let bang = self.pop_term();
                let span = bang.span.merge(operand.span);
                let expr = Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(operand),
                    },
                    span,
                );
                (expr, 1 + depth)
            }
            Rule::Binary(op) => {
                let (rhs, rhs_depth) = self.pop_expr();
                self.pop_term();
                let (lhs, lhs_depth) = self.pop_expr();
                (Expr::binary(op, lhs, rhs), 1 + lhs_depth.max(rhs_depth))
            }
            Rule::Lambda => {
                let (body, depth) = self.pop_expr();
                self.pop_term();
                let param = self.pop_binder();
                let lambda = self.pop_term();
                let span = lambda.span.merge(body.span);
                let expr = Expr::new(
                    ExprKind::Lambda {
                        param,
                        body: Box::new(body),
                    },
                    span,
                );
                (expr, 1 + depth)
            }
            Rule::Let => {
                let (body, body_depth) = self.pop_expr();
                self.pop_term();
                let (value, value_depth) = self.pop_expr();
                self.pop_term();
                let name = self.pop_binder();
                let let_kw = self.pop_term();
                let span = let_kw.span.merge(body.span);
                let expr = Expr::new(
                    ExprKind::Let {
                        name,
                        value: Box::new(value),
                        body: Box::new(body),
                    },
                    span,
                );
                (expr, 1 + value_depth.max(body_depth))
            }
        };
        if depth > MAX_NESTING {
            return Err(ParseError::new(
                format!("expression nested too deeply (limit is {MAX_NESTING})"),
                expr.span,
                Vec::new(),
            ));
        }
        trace!(rule = %rule, depth, "reduce");
        self.record(ParseAction::Reduce(rule));
        self.stack.push(Symbol::Expr(expr, depth));
        Ok(())
    }

    // ── Shift validation and errors ────────────────────────────────────

    fn state(&self) -> State {
        match self.peek(0) {
            None => State::ExpectOperand,
            Some(Symbol::Expr(..)) => State::AfterExpr,
            Some(Symbol::Term(tok)) => match tok.kind {
                TokenKind::Lambda | TokenKind::Let => State::ExpectBinder,
                TokenKind::Ident(_) => match self.peek_term(1) {
                    Some(TokenKind::Lambda) => State::ExpectDot,
                    Some(TokenKind::Let) => State::ExpectEq,
                    _ => State::AfterExpr,
                },
                _ => State::ExpectOperand,
            },
        }
    }

    fn check_shift(&self, token: &Token) -> Result<(), ParseError> {
        let ok = match self.state() {
            State::ExpectOperand => starts_operand(&token.kind),
            State::ExpectBinder => matches!(token.kind, TokenKind::Ident(_)),
            State::ExpectDot => token.kind == TokenKind::Dot,
            State::ExpectEq => token.kind == TokenKind::Eq,
            State::AfterExpr => match token.kind {
                TokenKind::RParen => self.peek_term(1) == Some(&TokenKind::LParen),
                TokenKind::In => self.peek_term(1) == Some(&TokenKind::Eq),
                ref kind => starts_operand(kind) || BinOp::from_token(kind).is_some(),
            },
        };
        if ok {
            Ok(())
        } else {
            Err(self.error_at(token))
        }
    }

    /// Stack is fully reduced at end of input: accept a single expression.
    fn accept(mut self, eof: &Token) -> Result<(Expr, ParseTrace), ParseError> {
        if self.stack.len() == 1 && self.peek_is_expr(0) {
            let (expr, _) = self.pop_expr();
            return Ok((expr, self.trace.unwrap_or_default()));
        }
        Err(self.error_at(eof))
    }

    fn expected(&self) -> Vec<String> {
        let list: &[&str] = match self.state() {
            State::ExpectOperand => OPERAND_EXPECTED,
            State::ExpectBinder => &["identifier"],
            State::ExpectDot => &["`.`"],
            State::ExpectEq => &["`=`"],
            State::AfterExpr => match self.peek_term(1) {
                Some(TokenKind::LParen) => &["an operator", "an argument", "`)`"],
                Some(TokenKind::Eq) => &["an operator", "an argument", "`in`"],
                _ => &["an operator", "an argument", "end of input"],
            },
        };
        list.iter().map(|s| s.to_string()).collect()
    }

    fn error_at(&self, token: &Token) -> ParseError {
        let expected = self.expected();
        let after_expr = self.state() == State::AfterExpr;
        let open_paren = match self.peek(1) {
            Some(Symbol::Term(tok)) if after_expr && tok.kind == TokenKind::LParen => {
                Some(tok.span)
            }
            _ => None,
        };

        match (&token.kind, open_paren) {
            (TokenKind::Eof, Some(paren)) => {
                ParseError::new("unclosed `(`", token.span, expected)
                    .with_related("group opened here", paren)
            }
            (TokenKind::Eof, None) => {
                ParseError::new("unexpected end of input", token.span, expected)
            }
            (TokenKind::RParen, _) if after_expr && self.stack.len() == 1 => {
                ParseError::new("unmatched `)`", token.span, expected)
            }
            (kind, _) => ParseError::new(format!("unexpected `{kind}`"), token.span, expected),
        }
    }
}
