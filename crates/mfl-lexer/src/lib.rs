//! MFL lexer: turns source text into a token sequence.
//!
//! The lexer is a cheap, cloneable iterator over `Result<Token, LexError>`.
//! [`Lexer::tokenize`] collects it into a `Vec` ending in [`TokenKind::Eof`],
//! which is the restartable sequence handed to the parser.

mod cursor;

use cursor::Cursor;
use mfl_common::error::{LexError, LexErrorKind};
use mfl_common::span::Span;
use mfl_common::token::{keyword_from_str, Token, TokenKind};

/// The MFL lexer.
#[derive(Clone)]
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    /// Whether the `Eof` token (or an error) has already been produced.
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            finished: false,
        }
    }

    /// Tokenize the entire source, stopping at the first error.
    ///
    /// The returned vector always ends with an `Eof` token.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(source).collect()
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(TokenKind::Eof, start, start));
        };

        let token = match c {
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            'λ' | '\\' => self.single_char_token(TokenKind::Lambda, start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '-' => self.single_char_token(TokenKind::Minus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '/' => self.single_char_token(TokenKind::Slash, start),
            '%' => self.single_char_token(TokenKind::Percent, start),
            '&' => self.single_char_token(TokenKind::Amp, start),
            '|' => self.single_char_token(TokenKind::Bar, start),
            '=' => self.with_eq_suffix(TokenKind::Eq, TokenKind::EqEq, start),
            '!' => self.with_eq_suffix(TokenKind::Bang, TokenKind::NotEq, start),
            '<' => self.with_eq_suffix(TokenKind::Lt, TokenKind::LtEq, start),
            '>' => self.with_eq_suffix(TokenKind::Gt, TokenKind::GtEq, start),
            '0'..='9' => return self.lex_number(start),
            c if is_ident_start(c) => self.lex_ident(start),
            other => {
                self.cursor.advance();
                return Err(LexError::new(
                    LexErrorKind::UnexpectedCharacter(other),
                    Span::new(start, self.cursor.pos()),
                ));
            }
        };
        Ok(token)
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Skip whitespace and `--` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(char::is_whitespace);
            if self.cursor.peek() == Some('-') && self.cursor.peek_next() == Some('-') {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// `c` -> `single`, `c=` -> `double`.
    fn with_eq_suffix(&mut self, single: TokenKind, double: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            Token::new(double, start, self.cursor.pos())
        } else {
            Token::new(single, start, self.cursor.pos())
        }
    }

    fn lex_number(&mut self, start: u32) -> Result<Token, LexError> {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end);
        match text.parse::<i64>() {
            Ok(value) => Ok(Token::new(TokenKind::Int(value), start, end)),
            Err(_) => Err(LexError::new(
                LexErrorKind::InvalidNumberLiteral(text.to_string()),
                Span::new(start, end),
            )),
        }
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end);
        let kind = keyword_from_str(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        Token::new(kind, start, end)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(tok) if tok.kind == TokenKind::Eof => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(result)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
