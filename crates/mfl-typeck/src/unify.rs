//! Unification with occurs check.
//!
//! `unify` is a pure function: it returns the most general substitution
//! making both types equal, or an error. Nothing is committed on failure.

use tracing::trace;

use crate::error::{ConstraintOrigin, TypeError};
use crate::subst::{Subst, Types};
use crate::ty::{Ty, TyVar};

/// Compute the most general unifier of `left` and `right`.
///
/// Function types unify component-wise, parameter first, with the parameter
/// substitution applied to the results before they are unified.
pub fn unify(left: &Ty, right: &Ty, origin: &ConstraintOrigin) -> Result<Subst, TypeError> {
    trace!(%left, %right, "unify");
    match (left, right) {
        (Ty::Con(a), Ty::Con(b)) if a == b => Ok(Subst::empty()),
        (Ty::Var(v), ty) | (ty, Ty::Var(v)) => bind(*v, ty, origin),
        (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
            let s1 = unify(p1, p2, origin)?;
            let s2 = unify(&r1.apply(&s1), &r2.apply(&s1), origin)?;
            Ok(s2.compose(&s1))
        }
        _ => Err(TypeError::Mismatch {
            left: left.clone(),
            right: right.clone(),
            origin: origin.clone(),
        }),
    }
}

fn bind(var: TyVar, ty: &Ty, origin: &ConstraintOrigin) -> Result<Subst, TypeError> {
    if *ty == Ty::Var(var) {
        return Ok(Subst::empty());
    }
    if ty.occurs(var) {
        return Err(TypeError::InfiniteType {
            var,
            ty: ty.clone(),
            origin: origin.clone(),
        });
    }
    Ok(Subst::singleton(var, ty.clone()))
}
