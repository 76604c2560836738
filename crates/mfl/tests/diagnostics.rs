//! Rendering tests for pipeline diagnostics.
//!
//! Each test triggers a failure in one stage, renders it through ariadne or
//! JSON mode and checks the parts a reader relies on: the code, the message,
//! the labelled span and the help line.

use mfl::{render_diagnostic, run, CompileOptions, DiagnosticOptions, MflError};

// ── Helpers ────────────────────────────────────────────────────────────

fn first_error(src: &str) -> MflError {
    match run(src, &CompileOptions::default()) {
        Ok(output) => panic!("{src:?} unexpectedly succeeded with type {}", output.ty),
        Err(err) => err,
    }
}

fn render_text(src: &str) -> String {
    render_diagnostic(&first_error(src), src, "test.mfl", &DiagnosticOptions::colorless())
}

fn render_json(src: &str) -> serde_json::Value {
    let output = render_diagnostic(
        &first_error(src),
        src,
        "test.mfl",
        &DiagnosticOptions::json_mode(),
    );
    assert!(!output.contains('\n'), "JSON output should be one line: {output}");
    serde_json::from_str(&output).unwrap_or_else(|e| panic!("invalid JSON output: {e}\n{output}"))
}

// ── Human-readable ─────────────────────────────────────────────────────

#[test]
fn mismatch_report() {
    let output = render_text("let add = λx.λy.(x+y) in (add 3 True)");
    assert!(output.contains("E0003"), "{output}");
    assert!(output.contains("Type mismatch: int and bool"), "{output}");
    assert!(output.contains("function applied here"), "{output}");
    assert!(output.contains("test.mfl"), "{output}");
    assert!(
        output.contains("check the argument against the function's parameter type"),
        "{output}"
    );
}

#[test]
fn colorless_output_has_no_escape_codes() {
    let output = render_text("1 + True");
    assert!(!output.contains('\u{1b}'), "{output}");
    assert!(output.contains("operands of `+` are checked here"), "{output}");
}

#[test]
fn unclosed_paren_report_points_at_opener() {
    let output = render_text("(double 21");
    assert!(output.contains("E0002"), "{output}");
    assert!(output.contains("unclosed `(`"), "{output}");
    assert!(output.contains("group opened here"), "{output}");
    assert!(output.contains("add the missing `)`"), "{output}");
}

#[test]
fn unbound_variable_report() {
    let output = render_text("let x = 1 in y");
    assert!(output.contains("Unbound variable: y"), "{output}");
    assert!(output.contains("not found in this scope"), "{output}");
}

#[test]
fn lex_error_report() {
    let output = render_text("1 # 2");
    assert!(output.contains("E0001"), "{output}");
    assert!(output.contains("unexpected character '#'"), "{output}");
}

#[test]
fn runtime_fault_report_has_no_label() {
    let output = render_text("let d = λx.(10 / x) in d 0");
    assert!(output.contains("E0006"), "{output}");
    assert!(output.contains("runtime fault: division by zero"), "{output}");
    assert!(output.contains("raised by the SECD machine"), "{output}");
}

#[test]
fn spans_after_multibyte_characters() {
    // `λ` is two bytes; the label must still land on `True`.
    let src = "(λx.(x + 1)) True";
    let output = render_text(src);
    assert!(output.contains("Type mismatch"), "{output}");
    assert!(output.contains("function applied here"), "{output}");
}

// ── JSON ───────────────────────────────────────────────────────────────

#[test]
fn json_mismatch() {
    let src = "let add = λx.λy.(x+y) in (add 3 True)";
    let parsed = render_json(src);
    assert_eq!(parsed["code"], "E0003");
    assert_eq!(parsed["severity"], "error");
    assert_eq!(parsed["message"], "Type mismatch: int and bool");
    assert_eq!(parsed["file"], "test.mfl");

    let spans = parsed["spans"].as_array().expect("spans array");
    assert_eq!(spans.len(), 1);
    let start = src.find("add 3 True").unwrap();
    assert_eq!(spans[0]["start"], start);
    assert_eq!(spans[0]["end"], start + "add 3 True".len());
    assert_eq!(spans[0]["label"], "function applied here");
    // Two `λ`s before the span, each two bytes but one column.
    assert_eq!(spans[0]["line"], 1);
    assert_eq!(spans[0]["column"], start - 1);
    assert!(parsed["fix"].is_string());
}

#[test]
fn json_positions_on_later_lines() {
    let parsed = render_json("let x = 1 in\n  x + y");
    assert_eq!(parsed["code"], "E0005");
    let span = &parsed["spans"][0];
    assert_eq!(span["start"], 19);
    assert_eq!(span["line"], 2);
    assert_eq!(span["column"], 7);
}

#[test]
fn json_syntax_error_has_related_span() {
    let parsed = render_json("(double 21");
    assert_eq!(parsed["code"], "E0002");
    let spans = parsed["spans"].as_array().expect("spans array");
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1]["start"], 0);
    assert_eq!(spans[1]["label"], "group opened here");
}

#[test]
fn json_runtime_fault_has_no_spans_or_fix() {
    let parsed = render_json("let d = λx.(10 / x) in d 0");
    assert_eq!(parsed["code"], "E0006");
    assert!(parsed["spans"].as_array().unwrap().is_empty());
    assert!(parsed["fix"].is_null());
}
