//! Core Erlang terms produced by lowering, and their layout as [`Doc`]s.
//!
//! Only the fragment MFL needs is modelled: single-parameter funs,
//! `apply`, `let`, calls to `erlang` BIFs, integer and atom literals, and
//! `-|` annotations on let-bound values.

use std::fmt;

use crate::doc::{align, arg_list, concat, group, hardline, indent, space, text, Doc};
use crate::printer::{print, PrintConfig};

/// A Core Erlang variable name, already capitalised and unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CVar(pub String);

impl fmt::Display for CVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CExpr {
    Var(CVar),
    Int(i64),
    /// An atom, printed quoted.
    Atom(String),
    Fun {
        params: Vec<CVar>,
        body: Box<CExpr>,
    },
    Apply {
        func: Box<CExpr>,
        args: Vec<CExpr>,
    },
    Let {
        var: CVar,
        value: Box<CExpr>,
        body: Box<CExpr>,
    },
    /// `call 'module':'name' (args)`.
    Call {
        module: String,
        name: String,
        args: Vec<CExpr>,
    },
    /// `( expr -| [{'key', "value"}, ...] )`.
    Annotated {
        expr: Box<CExpr>,
        annotations: Vec<(String, String)>,
    },
}

impl CExpr {
    pub fn bool(value: bool) -> CExpr {
        CExpr::Atom(if value { "true" } else { "false" }.to_string())
    }

    pub fn call(module: &str, name: &str, args: Vec<CExpr>) -> CExpr {
        CExpr::Call {
            module: module.to_string(),
            name: name.to_string(),
            args,
        }
    }

    /// Whether the expression can stand in function position of `apply`
    /// without parentheses.
    fn is_simple(&self) -> bool {
        matches!(self, CExpr::Var(_) | CExpr::Atom(_) | CExpr::Int(_) | CExpr::Annotated { .. })
    }

    pub fn to_doc(&self) -> Doc {
        match self {
            CExpr::Var(v) => text(v.0.clone()),
            CExpr::Int(n) => text(n.to_string()),
            CExpr::Atom(name) => text(atom(name)),
            CExpr::Fun { params, body } => {
                let params: Vec<String> = params.iter().map(|p| p.0.clone()).collect();
                group(concat(vec![
                    text(format!("fun ({}) ->", params.join(", "))),
                    indent(concat(vec![space(), body.to_doc()])),
                ]))
            }
            CExpr::Apply { func, args } => {
                let func_doc = if func.is_simple() {
                    func.to_doc()
                } else {
                    concat(vec![text("("), func.to_doc(), text(")")])
                };
                group(concat(vec![
                    text("apply "),
                    func_doc,
                    text(" "),
                    arg_list(args.iter().map(CExpr::to_doc).collect()),
                ]))
            }
            // Aligned so the body lines up under `let` wherever it starts.
            CExpr::Let { var, value, body } => align(concat(vec![
                group(concat(vec![
                    text(format!("let <{var}> =")),
                    indent(concat(vec![space(), value.to_doc()])),
                    space(),
                    text("in"),
                ])),
                hardline(),
                body.to_doc(),
            ])),
            CExpr::Call { module, name, args } => group(concat(vec![
                text(format!("call {}:{} ", atom(module), atom(name))),
                arg_list(args.iter().map(CExpr::to_doc).collect()),
            ])),
            CExpr::Annotated { expr, annotations } => {
                let annos: Vec<String> = annotations
                    .iter()
                    .map(|(key, value)| format!("{{{}, {}}}", atom(key), string(value)))
                    .collect();
                group(concat(vec![
                    text("( "),
                    expr.to_doc(),
                    space(),
                    text(format!("-| [{}] )", annos.join(", "))),
                ]))
            }
        }
    }
}

/// A top-level function definition `'name'/arity = fun (...) -> ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunDef {
    pub name: String,
    pub params: Vec<CVar>,
    pub body: CExpr,
}

impl FunDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    fn to_doc(&self) -> Doc {
        let fun = CExpr::Fun {
            params: self.params.clone(),
            body: Box::new(self.body.clone()),
        };
        concat(vec![
            text(format!("{}/{} =", atom(&self.name), self.arity())),
            indent(concat(vec![hardline(), fun.to_doc()])),
        ])
    }
}

/// A Core Erlang module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub exports: Vec<(String, usize)>,
    pub defs: Vec<FunDef>,
}

impl Module {
    pub fn to_doc(&self) -> Doc {
        let exports: Vec<String> = self
            .exports
            .iter()
            .map(|(name, arity)| format!("{}/{arity}", atom(name)))
            .collect();
        let mut parts = vec![
            text(format!("module {} [{}]", atom(&self.name), exports.join(", "))),
            indent(concat(vec![hardline(), text("attributes []")])),
        ];
        for def in &self.defs {
            parts.push(hardline());
            parts.push(def.to_doc());
        }
        parts.push(hardline());
        parts.push(text("end"));
        concat(parts)
    }

    /// Render the module as Core Erlang source text.
    pub fn render(&self, config: &PrintConfig) -> String {
        print(&self.to_doc(), config)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&PrintConfig::default()))
    }
}

/// Quote an atom: `'name'`, escaping `'` and `\`.
pub fn atom(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('\'');
    for c in name.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Quote a string literal, escaping `"` and `\`.
fn string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
