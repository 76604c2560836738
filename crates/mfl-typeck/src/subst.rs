//! Substitutions: persistent maps from type variables to types.
//!
//! A `Subst` is never mutated once built. Composition and application
//! return new values, so a failed unification cannot leave half-applied
//! bindings behind.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::ty::{Scheme, Ty, TyVar};

/// A finite map `TyVar -> Ty`, kept idempotent: no variable in the domain
/// occurs in any type of the range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Subst {
    map: FxHashMap<TyVar, Ty>,
}

impl Subst {
    /// The identity substitution.
    pub fn empty() -> Self {
        Subst::default()
    }

    pub fn singleton(var: TyVar, ty: Ty) -> Self {
        let mut map = FxHashMap::default();
        map.insert(var, ty);
        Subst { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get(&self, var: TyVar) -> Option<&Ty> {
        self.map.get(&var)
    }

    /// `self ∘ other`: the substitution that applies `other` first and then
    /// `self`.
    pub fn compose(&self, other: &Subst) -> Subst {
        let mut map: FxHashMap<TyVar, Ty> = other
            .map
            .iter()
            .map(|(var, ty)| (*var, ty.apply(self)))
            .collect();
        for (var, ty) in &self.map {
            map.entry(*var).or_insert_with(|| ty.clone());
        }
        Subst { map }
    }

    /// A copy of this substitution without bindings for `vars`.
    pub fn without(&self, vars: &[TyVar]) -> Subst {
        Subst {
            map: self
                .map
                .iter()
                .filter(|(var, _)| !vars.contains(var))
                .map(|(var, ty)| (*var, ty.clone()))
                .collect(),
        }
    }

    /// Bindings sorted by variable, for stable output.
    pub fn bindings(&self) -> Vec<(TyVar, &Ty)> {
        let mut out: Vec<_> = self.map.iter().map(|(v, t)| (*v, t)).collect();
        out.sort_by_key(|(v, _)| *v);
        out
    }
}

impl FromIterator<(TyVar, Ty)> for Subst {
    fn from_iter<I: IntoIterator<Item = (TyVar, Ty)>>(iter: I) -> Self {
        Subst {
            map: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Subst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (var, ty)) in self.bindings().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{var} := {ty}")?;
        }
        write!(f, "]")
    }
}

/// Things a substitution can be applied to.
pub trait Types {
    fn apply(&self, subst: &Subst) -> Self;
    fn free_vars(&self) -> BTreeSet<TyVar>;
}

impl Types for Ty {
    fn apply(&self, subst: &Subst) -> Ty {
        match self {
            Ty::Var(v) => subst.get(*v).cloned().unwrap_or(Ty::Var(*v)),
            Ty::Con(_) => self.clone(),
            Ty::Fun(param, result) => Ty::fun(param.apply(subst), result.apply(subst)),
        }
    }

    fn free_vars(&self) -> BTreeSet<TyVar> {
        self.vars_in_order().into_iter().collect()
    }
}

impl Types for Scheme {
    /// Quantified variables are bound, so the substitution skips them.
    fn apply(&self, subst: &Subst) -> Scheme {
        let restricted = subst.without(&self.vars);
        Scheme {
            vars: self.vars.clone(),
            ty: self.ty.apply(&restricted),
        }
    }

    fn free_vars(&self) -> BTreeSet<TyVar> {
        let mut free = self.ty.free_vars();
        for v in &self.vars {
            free.remove(v);
        }
        free
    }
}
