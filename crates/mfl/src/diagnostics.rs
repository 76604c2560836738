//! Ariadne-based diagnostic rendering for pipeline errors.
//!
//! Every `MflError` renders as a terse report with its error code, the
//! error message, labelled source spans and a help line when a plausible
//! fix exists. JSON mode emits the same information as a single line.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use mfl_codegen::CodegenError;
use mfl_common::error::LexErrorKind;
use mfl_common::span::{LineIndex, Position, Span};
use mfl_secd::RuntimeFault;
use mfl_typeck::{ConstraintOrigin, TypeError};
use serde::{Deserialize, Serialize};

use crate::error::MflError;

/// How diagnostics are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticOptions {
    /// ANSI colours in human-readable output.
    pub color: bool,
    /// One JSON object per diagnostic instead of an ariadne report.
    pub json: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            color: true,
            json: false,
        }
    }
}

impl DiagnosticOptions {
    /// Plain text without colour; used for snapshots.
    pub fn colorless() -> Self {
        Self {
            color: false,
            json: false,
        }
    }

    pub fn json_mode() -> Self {
        Self {
            color: false,
            json: true,
        }
    }
}

/// A labelled source range.
#[derive(Debug, Clone)]
struct SpanLabel {
    start: usize,
    end: usize,
    label: String,
}

/// A label in JSON output: byte offsets plus the 1-based position of `start`.
#[derive(Debug, Serialize)]
struct JsonSpan {
    start: usize,
    end: usize,
    #[serde(flatten)]
    position: Position,
    label: String,
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic<'a> {
    code: &'a str,
    severity: &'a str,
    message: String,
    file: &'a str,
    spans: Vec<JsonSpan>,
    fix: Option<String>,
}

/// Everything a rendered diagnostic needs, independent of the output format.
struct Parts {
    message: String,
    labels: Vec<SpanLabel>,
    help: Option<String>,
    note: Option<String>,
}

fn label(span: Span, text: impl Into<String>) -> SpanLabel {
    SpanLabel {
        start: span.start as usize,
        end: span.end as usize,
        label: text.into(),
    }
}

// ── Per-stage content ──────────────────────────────────────────────────

fn parts(err: &MflError) -> Parts {
    match err {
        MflError::Lex(lex) => {
            let (message, help) = match &lex.kind {
                LexErrorKind::UnexpectedCharacter(c) => {
                    (format!("unexpected character {c:?}"), None)
                }
                LexErrorKind::InvalidNumberLiteral(text) => (
                    format!("integer literal {text} does not fit in 64 bits"),
                    None,
                ),
            };
            Parts {
                message,
                labels: vec![label(lex.span, "not valid here")],
                help,
                note: None,
            }
        }

        MflError::Syntax(parse) => {
            let primary = if parse.expected.is_empty() {
                "syntax error here".to_string()
            } else {
                format!("expected {}", parse.expected_list())
            };
            let mut labels = vec![label(parse.span, primary)];
            if let Some((message, span)) = &parse.related {
                labels.push(label(*span, message.clone()));
            }
            let help = parse
                .related
                .as_ref()
                .map(|_| "add the missing `)`".to_string());
            Parts {
                message: parse.message.clone(),
                labels,
                help,
                note: None,
            }
        }

        MflError::Type(ty) => type_parts(ty),

        MflError::Runtime(fault) => Parts {
            message: fault.to_string(),
            labels: Vec::new(),
            help: match fault {
                RuntimeFault::StepLimitExceeded { .. } => {
                    Some("raise `max_steps` or remove the limit".to_string())
                }
                _ => None,
            },
            note: Some("raised by the SECD machine while evaluating".to_string()),
        },

        MflError::Codegen(codegen) => Parts {
            message: codegen.to_string(),
            labels: vec![label(
                codegen.span(),
                match codegen {
                    CodegenError::Unsupported { .. } => "no Core Erlang translation",
                    CodegenError::UnresolvedType { .. } => "binding declared here",
                },
            )],
            help: None,
            note: None,
        },
    }
}

fn type_parts(err: &TypeError) -> Parts {
    let labels = match (err.origin(), err.span()) {
        (Some(origin), Some(span)) => vec![label(span, origin.describe())],
        (None, Some(span)) => vec![label(span, "not found in this scope")],
        _ => Vec::new(),
    };
    let help = match err {
        TypeError::Mismatch {
            origin: ConstraintOrigin::Apply { .. },
            ..
        } => Some("check the argument against the function's parameter type".to_string()),
        TypeError::Mismatch {
            origin: ConstraintOrigin::BinOp { op, .. },
            ..
        } if op.is_logical() => Some("`&` and `|` take booleans".to_string()),
        TypeError::Mismatch {
            origin: ConstraintOrigin::BinOp { .. },
            ..
        } => Some("arithmetic and comparison operators take integers".to_string()),
        TypeError::Mismatch { .. } => None,
        TypeError::InfiniteType { .. } => {
            Some("a value cannot have a type that refers to itself".to_string())
        }
        TypeError::UnboundVariable { name, .. } => Some(format!(
            "bind `{name}` with `let {name} = ... in` or a λ parameter"
        )),
    };
    Parts {
        message: err.to_string(),
        labels,
        help,
        note: None,
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// Render `err` against `source`.
///
/// Human-readable output uses ariadne with byte-offset spans; JSON output is
/// a single line with `code`, `severity`, `message`, `file`, `spans` and
/// `fix` keys. Each span also carries the `line` and `column` it starts at.
pub fn render_diagnostic(
    err: &MflError,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    let parts = parts(err);
    if options.json {
        render_json(err, parts, source, filename)
    } else {
        render_report(err, parts, source, filename, options.color)
    }
}

fn render_json(err: &MflError, parts: Parts, source: &str, filename: &str) -> String {
    let lines = LineIndex::new(source);
    let spans = parts
        .labels
        .into_iter()
        .map(|l| JsonSpan {
            start: l.start,
            end: l.end,
            position: lines.position(l.start as u32),
            label: l.label,
        })
        .collect();
    let diagnostic = JsonDiagnostic {
        code: err.code(),
        severity: "error",
        message: parts.message,
        file: filename,
        spans,
        fix: parts.help,
    };
    match serde_json::to_string(&diagnostic) {
        Ok(line) => line,
        // Only non-string map keys can fail; the struct has none.
        Err(e) => format!("{{\"code\":\"{}\",\"error\":\"{e}\"}}", err.code()),
    }
}

fn render_report(err: &MflError, parts: Parts, source: &str, filename: &str, color: bool) -> String {
    let source_len = source.len();

    // ariadne needs a span inside the source and at least one byte wide.
    let clamp = |start: usize, end: usize| -> Range<usize> {
        let s = start.min(source_len);
        let e = end.min(source_len).max(s);
        if s == e {
            s..(e + 1).min(source_len)
        } else {
            s..e
        }
    };

    let primary = parts
        .labels
        .first()
        .map(|l| clamp(l.start, l.end))
        .unwrap_or_else(|| clamp(0, source_len));
    let config = Config::default()
        .with_color(color)
        .with_index_type(IndexType::Byte);

    let mut builder = Report::build(ReportKind::Error, (filename, primary))
        .with_code(err.code())
        .with_message(&parts.message)
        .with_config(config);
    for (i, l) in parts.labels.iter().enumerate() {
        let colour = if i == 0 { Color::Red } else { Color::Blue };
        builder.add_label(
            Label::new((filename, clamp(l.start, l.end)))
                .with_message(&l.label)
                .with_color(colour),
        );
    }
    if let Some(help) = parts.help {
        builder = builder.with_help(help);
    }
    if let Some(note) = parts.note {
        builder = builder.with_note(note);
    }

    let mut buf = Vec::new();
    let cache = (filename, Source::from(source));
    if let Err(e) = builder.finish().write(cache, &mut buf) {
        return format!("error[{}]: {} ({e})\n", err.code(), parts.message);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
