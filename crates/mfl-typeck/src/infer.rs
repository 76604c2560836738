//! Algorithm W inference engine.
//!
//! Inference threads substitutions explicitly: every rule returns the
//! substitution it produced together with the node's type, and callers
//! compose them left to right and apply them to the environment before the
//! next sub-inference. Fresh variables come from a `VarSupply` owned by the
//! `InferCtx`, so independent runs never share counter state.

use mfl_common::span::Span;
use mfl_parser::{BinOp, Expr, ExprKind, UnaryOp};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::env::TypeEnv;
use crate::error::{ConstraintOrigin, TypeError};
use crate::subst::{Subst, Types};
use crate::ty::{Scheme, Ty, TyVar};
use crate::unify::unify;
use crate::TypeckResult;

/// Monotonic source of fresh type variables, scoped to one inference run.
#[derive(Debug, Default)]
pub struct VarSupply {
    next: u32,
}

impl VarSupply {
    pub fn new() -> Self {
        VarSupply::default()
    }

    /// A supply whose first variable is `first`.
    pub fn starting_at(first: u32) -> Self {
        VarSupply { next: first }
    }

    pub fn fresh(&mut self) -> TyVar {
        let var = TyVar(self.next);
        self.next += 1;
        var
    }

    /// Number of the next variable to be issued.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// The inference context -- owns the variable supply and records the type
/// of every node and the scheme of every let binder it visits.
#[derive(Debug, Default)]
pub struct InferCtx {
    supply: VarSupply,
    node_types: Vec<(Span, Ty)>,
    bindings: Vec<(Span, Scheme)>,
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx::default()
    }

    /// A context whose fresh variables cannot collide with those in `env`.
    pub fn for_env(env: &TypeEnv) -> Self {
        let first = env.max_var().map_or(0, |v| v.0 + 1);
        InferCtx {
            supply: VarSupply::starting_at(first),
            ..InferCtx::default()
        }
    }

    pub fn fresh_var(&mut self) -> Ty {
        Ty::Var(self.supply.fresh())
    }

    /// Replace each quantified variable with a fresh one.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.is_mono() {
            return scheme.ty.clone();
        }
        let subst: Subst = scheme
            .vars
            .iter()
            .map(|var| (*var, self.fresh_var()))
            .collect();
        scheme.ty.apply(&subst)
    }

    /// Quantify over the variables free in `ty` but not in `env`.
    pub fn generalize(&self, env: &TypeEnv, ty: &Ty) -> Scheme {
        let env_vars = env.free_vars();
        let vars = ty
            .vars_in_order()
            .into_iter()
            .filter(|v| !env_vars.contains(v))
            .collect();
        Scheme {
            vars,
            ty: ty.clone(),
        }
    }

    fn record(&mut self, span: Span, ty: &Ty) {
        self.node_types.push((span, ty.clone()));
    }

    /// Infer the type of `expr` under `env`.
    ///
    /// Returns the substitution the inference produced and the node's type
    /// with that substitution already applied.
    pub fn infer(&mut self, env: &TypeEnv, expr: &Expr) -> Result<(Subst, Ty), TypeError> {
        let (subst, ty) = match &expr.kind {
            ExprKind::Var(name) => {
                let scheme = env.lookup(name).ok_or_else(|| TypeError::UnboundVariable {
                    name: name.clone(),
                    span: expr.span,
                })?;
                let ty = self.instantiate(scheme);
                (Subst::empty(), ty)
            }

            ExprKind::Int(_) => (Subst::empty(), Ty::int()),
            ExprKind::Bool(_) => (Subst::empty(), Ty::bool()),

            ExprKind::Binary { op, lhs, rhs } => {
                let (operand, result) = binop_signature(*op);
                let origin = ConstraintOrigin::BinOp {
                    op: *op,
                    span: expr.span,
                };
                let (s1, lhs_ty) = self.infer(env, lhs)?;
                let (s2, rhs_ty) = self.infer(&env.apply(&s1), rhs)?;
                let s3 = unify(&lhs_ty.apply(&s2), &operand, &origin)?;
                let s4 = unify(&rhs_ty.apply(&s3), &operand, &origin)?;
                (s4.compose(&s3).compose(&s2).compose(&s1), result)
            }

            ExprKind::Unary { op, operand } => {
                let origin = ConstraintOrigin::UnaryOp {
                    op: *op,
                    span: expr.span,
                };
                let expected = match op {
                    UnaryOp::Not => Ty::bool(),
                };
                let (s1, operand_ty) = self.infer(env, operand)?;
                let s2 = unify(&operand_ty, &expected, &origin)?;
                (s2.compose(&s1), expected)
            }

            ExprKind::Lambda { param, body } => {
                let param_ty = self.fresh_var();
                self.record(param.span, &param_ty);
                let body_env = env.extend(param.name.clone(), Scheme::mono(param_ty.clone()));
                let (s1, body_ty) = self.infer(&body_env, body)?;
                (s1.clone(), Ty::fun(param_ty.apply(&s1), body_ty))
            }

            ExprKind::Apply { func, arg } => {
                let origin = ConstraintOrigin::Apply { span: expr.span };
                let (s1, func_ty) = self.infer(env, func)?;
                let (s2, arg_ty) = self.infer(&env.apply(&s1), arg)?;
                let result_ty = self.fresh_var();
                let s3 = unify(
                    &func_ty.apply(&s2),
                    &Ty::fun(arg_ty, result_ty.clone()),
                    &origin,
                )?;
                (s3.compose(&s2).compose(&s1), result_ty.apply(&s3))
            }

            ExprKind::Let { name, value, body } => {
                let (s1, value_ty) = self.infer(env, value)?;
                let value_env = env.apply(&s1);
                let scheme = self.generalize(&value_env, &value_ty);
                debug!(binder = %name.name, %scheme, "generalized let binding");
                self.record(name.span, &value_ty);
                self.bindings.push((name.span, scheme.clone()));
                let body_env = value_env.extend(name.name.clone(), scheme);
                let (s2, body_ty) = self.infer(&body_env, body)?;
                (s2.compose(&s1), body_ty)
            }
        };
        self.record(expr.span, &ty);
        Ok((subst, ty))
    }

    /// Apply the final substitution to everything recorded and package it.
    ///
    /// Variables still free in a binder's scheme after the final
    /// substitution are unconstrained, so they are quantified as well.
    pub fn finish(self, subst: &Subst, ty: Ty) -> TypeckResult {
        let types: FxHashMap<Span, Ty> = self
            .node_types
            .into_iter()
            .map(|(span, ty)| (span, ty.apply(subst)))
            .collect();
        let bindings: FxHashMap<Span, Scheme> = self
            .bindings
            .into_iter()
            .map(|(span, scheme)| {
                let ty = scheme.apply(subst).ty;
                (span, close_over(ty))
            })
            .collect();
        let scheme = close_over(ty.clone());
        TypeckResult {
            ty,
            scheme,
            types,
            bindings,
        }
    }
}

/// Quantify over every variable in `ty`.
fn close_over(ty: Ty) -> Scheme {
    Scheme {
        vars: ty.vars_in_order(),
        ty,
    }
}

/// `(operand type, result type)` of a binary operator.
fn binop_signature(op: BinOp) -> (Ty, Ty) {
    if op.is_logical() {
        (Ty::bool(), Ty::bool())
    } else if op.is_comparison() {
        (Ty::int(), Ty::bool())
    } else {
        (Ty::int(), Ty::int())
    }
}

/// Run Algorithm W on `expr` under `env`.
///
/// Returns the inferred type (fully substituted) and the substitution.
pub fn infer(expr: &Expr, env: &TypeEnv) -> Result<(Ty, Subst), TypeError> {
    let mut ctx = InferCtx::for_env(env);
    let (subst, ty) = ctx.infer(env, expr)?;
    Ok((ty, subst))
}

/// Type-check a closed program.
///
/// On success the result holds the generalized type of the whole program,
/// the type of every node keyed by span and the scheme of every let binder.
pub fn check(expr: &Expr) -> Result<TypeckResult, TypeError> {
    let env = TypeEnv::new();
    let mut ctx = InferCtx::new();
    let (subst, ty) = ctx.infer(&env, expr)?;
    let result = ctx.finish(&subst, ty);
    debug!(scheme = %result.scheme, nodes = result.types.len(), "type check complete");
    Ok(result)
}
