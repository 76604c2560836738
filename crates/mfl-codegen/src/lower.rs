//! Typed AST to Core Erlang lowering.
//!
//! Every λ parameter and let binder gets exactly one Core Erlang variable.
//! Names are the capitalised source name, suffixed with a number when that
//! name is already taken anywhere in the module, so shadowing in the source
//! never turns into shadowing in the output.

use mfl_parser::{BinOp, Expr, ExprKind, UnaryOp};
use mfl_typeck::subst::Types;
use mfl_typeck::TypeckResult;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::core_ir::{CExpr, CVar, FunDef, Module};
use crate::error::CodegenError;

/// Options for Core Erlang generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Module name. Default: `mfl`.
    pub module_name: String,
    /// Name of the exported zero-arity entry function. Default: `main`.
    pub entry_name: String,
    /// Annotate let-bound values with their generalised type.
    pub annotate_types: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            module_name: "mfl".to_string(),
            entry_name: "main".to_string(),
            annotate_types: false,
        }
    }
}

struct Lowerer<'a> {
    typeck: &'a TypeckResult,
    annotate_types: bool,
    /// Source name to Core Erlang variable, innermost last.
    scopes: Vec<(String, CVar)>,
    /// Every variable name handed out so far.
    used: FxHashSet<String>,
}

impl<'a> Lowerer<'a> {
    fn new(typeck: &'a TypeckResult, annotate_types: bool) -> Self {
        Lowerer {
            typeck,
            annotate_types,
            scopes: Vec::new(),
            used: FxHashSet::default(),
        }
    }

    fn fresh_var(&mut self, source: &str) -> CVar {
        let base = variable_name(source);
        let mut name = base.clone();
        let mut suffix = 1;
        while !self.used.insert(name.clone()) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        CVar(name)
    }

    fn lookup(&self, name: &str) -> Option<&CVar> {
        self.scopes
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, var)| var)
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<CExpr, CodegenError> {
        match &expr.kind {
            ExprKind::Int(n) => Ok(CExpr::Int(*n)),
            ExprKind::Bool(b) => Ok(CExpr::bool(*b)),
            ExprKind::Var(name) => match self.lookup(name) {
                Some(var) => Ok(CExpr::Var(var.clone())),
                None => Err(CodegenError::Unsupported {
                    construct: format!("free variable `{name}`"),
                    span: expr.span,
                }),
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                Ok(CExpr::call("erlang", erlang_operator(*op), vec![lhs, rhs]))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.lower_expr(operand)?;
                match op {
                    UnaryOp::Not => Ok(CExpr::call("erlang", "not", vec![operand])),
                }
            }
            ExprKind::Lambda { param, body } => {
                let var = self.fresh_var(&param.name);
                self.scopes.push((param.name.clone(), var.clone()));
                let body = self.lower_expr(body);
                self.scopes.pop();
                Ok(CExpr::Fun {
                    params: vec![var],
                    body: Box::new(body?),
                })
            }
            ExprKind::Apply { func, arg } => {
                let func = self.lower_expr(func)?;
                let arg = self.lower_expr(arg)?;
                Ok(CExpr::Apply {
                    func: Box::new(func),
                    args: vec![arg],
                })
            }
            ExprKind::Let { name, value, body } => {
                let mut value = self.lower_expr(value)?;
                if self.annotate_types {
                    let scheme = self
                        .typeck
                        .binding_scheme(name.span)
                        .filter(|scheme| scheme.free_vars().is_empty())
                        .ok_or_else(|| CodegenError::UnresolvedType {
                            name: name.name.clone(),
                            span: name.span,
                        })?;
                    value = CExpr::Annotated {
                        expr: Box::new(value),
                        annotations: vec![("type".to_string(), scheme.to_string())],
                    };
                }
                let var = self.fresh_var(&name.name);
                self.scopes.push((name.name.clone(), var.clone()));
                let body = self.lower_expr(body);
                self.scopes.pop();
                Ok(CExpr::Let {
                    var,
                    value: Box::new(value),
                    body: Box::new(body?),
                })
            }
        }
    }
}

/// Lower a type-checked program to a module with one exported entry
/// function of arity zero whose body is the program.
pub fn lower(
    expr: &Expr,
    typeck: &TypeckResult,
    options: &CodegenOptions,
) -> Result<Module, CodegenError> {
    let mut lowerer = Lowerer::new(typeck, options.annotate_types);
    let body = lowerer.lower_expr(expr)?;
    debug!(
        module = %options.module_name,
        variables = lowerer.used.len(),
        "lowered to Core Erlang"
    );
    Ok(Module {
        name: options.module_name.clone(),
        exports: vec![(options.entry_name.clone(), 0)],
        defs: vec![FunDef {
            name: options.entry_name.clone(),
            params: Vec::new(),
            body,
        }],
    })
}

/// The `erlang` module BIF implementing `op`.
pub fn erlang_operator(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "div",
        BinOp::Rem => "rem",
        BinOp::Eq => "=:=",
        BinOp::NotEq => "=/=",
        BinOp::Lt => "<",
        BinOp::LtEq => "=<",
        BinOp::Gt => ">",
        BinOp::GtEq => ">=",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

/// Core Erlang variables start with an uppercase letter.
fn variable_name(source: &str) -> String {
    let mut chars = source.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            first.to_ascii_uppercase().to_string() + chars.as_str()
        }
        _ => format!("V{source}"),
    }
}
