//! AST to SECD instructions.
//!
//! The compiler mirrors the runtime environment with a static [`Scope`]: a
//! stack of frames holding binder names. A lambda pushes a frame with its
//! parameter, a let appends a slot to the current frame for the length of
//! its body. Every variable reference becomes `LD (depth, index)` where
//! `depth` counts frames outward from the innermost and `index` is the slot.
//!
//! Application evaluates the argument first: `NIL, <arg>, CONS, <fun>, AP`.

use mfl_parser::{Expr, ExprKind, UnaryOp};

use crate::instr::{ArithOp, Code, Const, Instr};

/// Compile-time mirror of the runtime frame chain.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Innermost frame last.
    frames: Vec<Vec<String>>,
}

impl Scope {
    /// The top-level scope: one empty frame, matching the machine's initial
    /// environment.
    pub fn new() -> Self {
        Scope {
            frames: vec![Vec::new()],
        }
    }

    /// Lexical address of the innermost binder named `name`.
    pub fn resolve(&self, name: &str) -> Option<(usize, usize)> {
        self.frames
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, frame)| {
                frame
                    .iter()
                    .rposition(|bound| bound == name)
                    .map(|index| (depth, index))
            })
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a λ body: a new innermost frame holding `param`.
    pub fn push_frame(&mut self, param: &str) {
        self.frames.push(vec![param.to_string()]);
    }

    /// Leave the innermost frame. The top-level frame is never removed.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Append a slot to the current frame, returning its index.
    pub fn bind(&mut self, name: &str) -> usize {
        let frame = self.current();
        frame.push(name.to_string());
        frame.len() - 1
    }

    pub fn unbind(&mut self) {
        self.current().pop();
    }

    fn current(&mut self) -> &mut Vec<String> {
        self.frames
            .last_mut()
            .expect("scope always has the top-level frame")
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a closed, type-checked expression.
///
/// # Panics
///
/// Panics if `expr` references a variable that no enclosing λ or let binds.
/// The type checker rejects such programs before they get here.
pub fn compile(expr: &Expr) -> Code {
    compile_in(expr, &mut Scope::new())
}

/// Compile `expr` where its free variables are bound by `scope`.
///
/// The emitted `LD` addresses are relative to `scope`, so the code must run
/// under a matching environment, e.g. as the body of a closure whose
/// frames `scope` describes. `scope` is left as it was passed in.
///
/// # Panics
///
/// Panics if `expr` references a variable that neither `scope` nor an
/// enclosing λ or let inside `expr` binds.
pub fn compile_in(expr: &Expr, scope: &mut Scope) -> Code {
    let mut out = Vec::new();
    emit(expr, scope, &mut out);
    Code::new(out)
}

fn emit(expr: &Expr, scope: &mut Scope, out: &mut Vec<Instr>) {
    match &expr.kind {
        ExprKind::Int(n) => out.push(Instr::LoadConst(Const::Int(*n))),
        ExprKind::Bool(b) => out.push(Instr::LoadConst(Const::Bool(*b))),
        ExprKind::Var(name) => {
            let Some((depth, index)) = scope.resolve(name) else {
                panic!("unbound variable `{name}` reached the SECD compiler");
            };
            out.push(Instr::LoadVar { depth, index });
        }
        ExprKind::Binary { op, lhs, rhs } => {
            emit(lhs, scope, out);
            emit(rhs, scope, out);
            out.push(Instr::Arithmetic(ArithOp::from(*op)));
        }
        ExprKind::Unary { op, operand } => {
            emit(operand, scope, out);
            match op {
                UnaryOp::Not => out.push(Instr::Not),
            }
        }
        ExprKind::Lambda { param, body } => {
            scope.push_frame(&param.name);
            let mut code = Vec::new();
            emit(body, scope, &mut code);
            code.push(Instr::Return);
            scope.pop_frame();
            out.push(Instr::LoadClosure(code.into()));
        }
        ExprKind::Apply { func, arg } => {
            out.push(Instr::ListNil);
            emit(arg, scope, out);
            out.push(Instr::ListCons);
            emit(func, scope, out);
            out.push(Instr::Apply);
        }
        ExprKind::Let { name, value, body } => {
            emit(value, scope, out);
            let slot = scope.bind(&name.name);
            out.push(Instr::BindLet(slot));
            emit(body, scope, out);
            out.push(Instr::EndLet);
            scope.unbind();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_innermost() {
        let mut scope = Scope::new();
        scope.bind("x");
        scope.push_frame("y");
        scope.bind("x");
        assert_eq!(scope.resolve("x"), Some((0, 1)));
        assert_eq!(scope.resolve("y"), Some((0, 0)));
        scope.unbind();
        assert_eq!(scope.resolve("x"), Some((1, 0)));
        assert_eq!(scope.resolve("z"), None);
    }

    #[test]
    fn shadowing_within_one_frame_takes_last_slot() {
        let mut scope = Scope::new();
        scope.bind("x");
        scope.bind("x");
        assert_eq!(scope.resolve("x"), Some((0, 1)));
    }

    #[test]
    fn new_scope_has_one_frame() {
        assert_eq!(Scope::new().depth(), 1);
    }

    #[test]
    fn top_level_frame_survives_pop() {
        let mut scope = Scope::new();
        scope.push_frame("x");
        scope.pop_frame();
        scope.pop_frame();
        assert_eq!(scope.depth(), 1);
    }
}
