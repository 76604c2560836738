//! The compile pipeline: Lexer → Parser → Type Checker → backend.
//!
//! Each stage is exposed on its own and [`Pipeline::run`] chains them,
//! stopping at the first failure so later stages never see a bad input.

use mfl_codegen::CodegenOptions;
use mfl_common::token::Token;
use mfl_lexer::Lexer;
use mfl_parser::{Expr, ParseTrace};
use mfl_secd::{Code, Machine, MachineConfig, Value};
use mfl_typeck::ty::Scheme;
use mfl_typeck::TypeckResult;
use tracing::debug;

use crate::config::{Backend, CompileOptions};
use crate::error::MflError;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Output {
    pub ast: Expr,
    /// Generalised type of the whole program.
    pub ty: Scheme,
    /// Parser actions, when `trace_parse` was set.
    pub trace: Option<ParseTrace>,
    pub backend: BackendOutput,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutput {
    Secd { code: Code, value: Value },
    CoreErlang { module_text: String },
}

// ── Stages ─────────────────────────────────────────────────────────────

pub fn lex(source: &str) -> Result<Vec<Token>, MflError> {
    let tokens = Lexer::tokenize(source)?;
    debug!(stage = "lex", tokens = tokens.len(), "stage complete");
    Ok(tokens)
}

pub fn parse(tokens: &[Token]) -> Result<Expr, MflError> {
    let expr = mfl_parser::parse(tokens)?;
    debug!(stage = "parse", nodes = expr.size(), "stage complete");
    Ok(expr)
}

pub fn parse_traced(tokens: &[Token]) -> Result<(Expr, ParseTrace), MflError> {
    let (expr, trace) = mfl_parser::parse_traced(tokens)?;
    debug!(stage = "parse", nodes = expr.size(), actions = trace.len(), "stage complete");
    Ok((expr, trace))
}

/// Lex and parse `source`.
pub fn parse_source(source: &str) -> Result<Expr, MflError> {
    parse(&lex(source)?)
}

pub fn typecheck(expr: &Expr) -> Result<TypeckResult, MflError> {
    let result = mfl_typeck::check(expr)?;
    debug!(stage = "typecheck", scheme = %result.scheme, "stage complete");
    Ok(result)
}

/// Compile a type-checked expression to SECD code. Cannot fail.
pub fn compile_secd(expr: &Expr) -> Code {
    let code = mfl_secd::compile(expr);
    debug!(stage = "secd-compile", instrs = code.len(), "stage complete");
    code
}

pub fn run_secd(code: &Code, config: &MachineConfig) -> Result<Value, MflError> {
    let mut machine = Machine::new(config.clone());
    let value = machine.run(code)?;
    debug!(stage = "secd-run", steps = machine.steps(), %value, "stage complete");
    Ok(value)
}

pub fn generate_core_erlang(
    expr: &Expr,
    typeck: &TypeckResult,
    options: &CodegenOptions,
) -> Result<String, MflError> {
    let text = mfl_codegen::generate(expr, typeck, options)?;
    debug!(stage = "core-erlang", bytes = text.len(), "stage complete");
    Ok(text)
}

// ── Pipeline ───────────────────────────────────────────────────────────

/// Runs every stage in order under one set of options.
pub struct Pipeline<'a> {
    options: &'a CompileOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Pipeline { options }
    }

    pub fn run(&self, source: &str) -> Result<Output, MflError> {
        let tokens = lex(source)?;
        let (ast, trace) = if self.options.trace_parse {
            let (ast, trace) = parse_traced(&tokens)?;
            (ast, Some(trace))
        } else {
            (parse(&tokens)?, None)
        };
        let typeck = typecheck(&ast)?;

        let backend = match self.options.backend {
            Backend::Secd => {
                let code = compile_secd(&ast);
                let value = run_secd(&code, &self.options.machine_config())?;
                BackendOutput::Secd { code, value }
            }
            Backend::CoreErlang => {
                let module_text =
                    generate_core_erlang(&ast, &typeck, &self.options.codegen_options())?;
                BackendOutput::CoreErlang { module_text }
            }
        };

        Ok(Output {
            ast,
            ty: typeck.scheme,
            trace,
            backend,
        })
    }
}

/// Run the whole pipeline on `source`.
pub fn run(source: &str, options: &CompileOptions) -> Result<Output, MflError> {
    Pipeline::new(options).run(source)
}
