//! Token-stream tests for the MFL lexer.

use insta::assert_snapshot;
use mfl_common::error::LexErrorKind;
use mfl_common::span::Span;
use mfl_common::token::TokenKind;
use mfl_lexer::Lexer;
use proptest::prelude::*;

/// One line per token: kind, source text, byte span.
fn tokenize_listing(source: &str) -> String {
    Lexer::tokenize(source)
        .expect("source should lex")
        .into_iter()
        .map(|tok| {
            let text = &source[tok.span.range()];
            format!("{:?} {:?} {}..{}", tok.kind, text, tok.span.start, tok.span.end)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_let_binding_listing() {
    assert_snapshot!(tokenize_listing("let x = 42 in x"), @r#"
    Let "let" 0..3
    Ident("x") "x" 4..5
    Eq "=" 6..7
    Int(42) "42" 8..10
    In "in" 11..13
    Ident("x") "x" 14..15
    Eof "" 15..15
    "#);
}

#[test]
fn test_lambda_spans_are_byte_offsets() {
    assert_snapshot!(tokenize_listing("λx.(x*2)"), @r#"
    Lambda "λ" 0..2
    Ident("x") "x" 2..3
    Dot "." 3..4
    LParen "(" 4..5
    Ident("x") "x" 5..6
    Star "*" 6..7
    Int(2) "2" 7..8
    RParen ")" 8..9
    Eof "" 9..9
    "#);
}

#[test]
fn test_booleans_and_logic() {
    let kinds: Vec<TokenKind> = Lexer::tokenize("(True & !False) | x")
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::LParen,
            TokenKind::Bool(true),
            TokenKind::Amp,
            TokenKind::Bang,
            TokenKind::Bool(false),
            TokenKind::RParen,
            TokenKind::Bar,
            TokenKind::Ident("x".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_identifier_with_keyword_prefix() {
    let tokens = Lexer::tokenize("letter inner").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Ident("letter".into()));
    assert_eq!(tokens[1].kind, TokenKind::Ident("inner".into()));
}

#[test]
fn test_unexpected_character_reports_position() {
    let err = Lexer::tokenize("let x = 4 $ 2").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('$'));
    assert_eq!(err.span, Span::new(10, 11));
}

#[test]
fn test_tokenize_is_restartable() {
    let source = "let add = λx.λy.(x+y) in (add 3 4)";
    let first = Lexer::tokenize(source).unwrap();
    let second = Lexer::tokenize(source).unwrap();
    assert_eq!(first, second);

    let lexer = Lexer::new(source);
    let replay: Result<Vec<_>, _> = lexer.clone().collect();
    assert_eq!(replay.unwrap(), first);
}

proptest! {
    #[test]
    fn lexing_never_panics(source in "\\PC{0,64}") {
        let _ = Lexer::tokenize(&source);
    }

    #[test]
    fn successful_lex_ends_with_eof(source in "[a-z0-9 ()+*λ.=]{0,48}") {
        if let Ok(tokens) = Lexer::tokenize(&source) {
            prop_assert_eq!(&tokens.last().unwrap().kind, &TokenKind::Eof);
        }
    }
}
