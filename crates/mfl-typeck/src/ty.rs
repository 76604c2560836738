//! Type representation for the MFL type system.
//!
//! Defines the core `Ty` enum, type constructors (`TyCon`), type variables
//! (`TyVar`), and polymorphic type schemes (`Scheme`). These form the
//! foundation of Hindley-Milner type inference.

use std::fmt;

use rustc_hash::FxHashMap;

/// A type variable, identified by the `u32` handed out by a `VarSupply`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVar(pub u32);

impl fmt::Display for TyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'t{}", self.0)
    }
}

/// A type constructor -- a named base type. MFL has exactly two: `int` and
/// `bool`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyCon {
    pub name: String,
}

impl TyCon {
    pub fn new(name: impl Into<String>) -> Self {
        TyCon { name: name.into() }
    }
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An MFL type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// A type variable (unresolved during inference).
    Var(TyVar),
    /// A concrete type constructor.
    Con(TyCon),
    /// A function type: `param -> result`.
    Fun(Box<Ty>, Box<Ty>),
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Con(TyCon::new("int"))
    }

    pub fn bool() -> Ty {
        Ty::Con(TyCon::new("bool"))
    }

    pub fn var(id: u32) -> Ty {
        Ty::Var(TyVar(id))
    }

    pub fn fun(param: Ty, result: Ty) -> Ty {
        Ty::Fun(Box::new(param), Box::new(result))
    }

    /// Whether `var` occurs anywhere inside this type.
    pub fn occurs(&self, var: TyVar) -> bool {
        match self {
            Ty::Var(v) => *v == var,
            Ty::Con(_) => false,
            Ty::Fun(param, result) => param.occurs(var) || result.occurs(var),
        }
    }

    /// Type variables in order of first occurrence, without duplicates.
    pub fn vars_in_order(&self) -> Vec<TyVar> {
        fn walk(ty: &Ty, out: &mut Vec<TyVar>) {
            match ty {
                Ty::Var(v) => {
                    if !out.contains(v) {
                        out.push(*v);
                    }
                }
                Ty::Con(_) => {}
                Ty::Fun(param, result) => {
                    walk(param, out);
                    walk(result, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Whether the type contains no type variables.
    pub fn is_ground(&self) -> bool {
        match self {
            Ty::Var(_) => false,
            Ty::Con(_) => true,
            Ty::Fun(param, result) => param.is_ground() && result.is_ground(),
        }
    }

    /// Number of arrows along the result spine, e.g. 2 for `int -> int -> int`.
    pub fn arity(&self) -> usize {
        match self {
            Ty::Fun(_, result) => 1 + result.arity(),
            _ => 0,
        }
    }

    fn fmt_named(&self, names: &FxHashMap<TyVar, String>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => match names.get(v) {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "{v}"),
            },
            Ty::Con(c) => write!(f, "{c}"),
            Ty::Fun(param, result) => {
                if matches!(**param, Ty::Fun(..)) {
                    write!(f, "(")?;
                    param.fmt_named(names, f)?;
                    write!(f, ")")?;
                } else {
                    param.fmt_named(names, f)?;
                }
                write!(f, " -> ")?;
                result.fmt_named(names, f)
            }
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_named(&FxHashMap::default(), f)
    }
}

/// A polymorphic type scheme: a type with universally quantified variables.
///
/// The type of a let-bound identity function is `forall a. a -> a`,
/// represented as `Scheme { vars: [t0], ty: Fun(Var(t0), Var(t0)) }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    /// The quantified (generic) type variables.
    pub vars: Vec<TyVar>,
    /// The underlying type (may reference vars).
    pub ty: Ty,
}

impl Scheme {
    /// Create a monomorphic scheme (no quantified variables).
    pub fn mono(ty: Ty) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }

    pub fn is_mono(&self) -> bool {
        self.vars.is_empty()
    }

    /// Rename the quantified variables to `'t0, 't1, ...` in order of first
    /// occurrence and drop quantifiers that do not occur.
    ///
    /// Two closed schemes are equal up to renaming exactly when their
    /// normalized forms are equal.
    pub fn normalize(&self) -> Scheme {
        let order: Vec<TyVar> = self
            .ty
            .vars_in_order()
            .into_iter()
            .filter(|v| self.vars.contains(v))
            .collect();
        let mapping: FxHashMap<TyVar, TyVar> = order
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, TyVar(i as u32)))
            .collect();

        fn rename(ty: &Ty, mapping: &FxHashMap<TyVar, TyVar>) -> Ty {
            match ty {
                Ty::Var(v) => Ty::Var(mapping.get(v).copied().unwrap_or(*v)),
                Ty::Con(c) => Ty::Con(c.clone()),
                Ty::Fun(param, result) => Ty::fun(rename(param, mapping), rename(result, mapping)),
            }
        }

        Scheme {
            vars: (0..order.len() as u32).map(TyVar).collect(),
            ty: rename(&self.ty, &mapping),
        }
    }

    /// Display names for the quantified variables: `a`, `b`, ..., `z`, `a1`, ...
    fn var_names(&self) -> FxHashMap<TyVar, String> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let letter = (b'a' + (i % 26) as u8) as char;
                let name = match i / 26 {
                    0 => letter.to_string(),
                    round => format!("{letter}{round}"),
                };
                (*v, name)
            })
            .collect()
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            return write!(f, "{}", self.ty);
        }
        let names = self.var_names();
        write!(f, "forall")?;
        for v in &self.vars {
            write!(f, " {}", names[v])?;
        }
        write!(f, ". ")?;
        self.ty.fmt_named(&names, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_types_display_lowercase() {
        assert_eq!(Ty::int().to_string(), "int");
        assert_eq!(Ty::bool().to_string(), "bool");
        assert_eq!(Ty::var(3).to_string(), "'t3");
    }

    #[test]
    fn arrows_associate_right() {
        let curried = Ty::fun(Ty::int(), Ty::fun(Ty::int(), Ty::int()));
        assert_eq!(curried.to_string(), "int -> int -> int");
        assert_eq!(curried.arity(), 2);

        let higher = Ty::fun(Ty::fun(Ty::int(), Ty::bool()), Ty::int());
        assert_eq!(higher.to_string(), "(int -> bool) -> int");
    }

    #[test]
    fn occurs_and_vars_in_order() {
        let ty = Ty::fun(Ty::var(2), Ty::fun(Ty::var(0), Ty::var(2)));
        assert!(ty.occurs(TyVar(0)));
        assert!(!ty.occurs(TyVar(1)));
        assert_eq!(ty.vars_in_order(), vec![TyVar(2), TyVar(0)]);
        assert!(!ty.is_ground());
        assert!(Ty::fun(Ty::int(), Ty::bool()).is_ground());
    }

    #[test]
    fn scheme_display_names_quantified_vars() {
        let scheme = Scheme {
            vars: vec![TyVar(7), TyVar(4)],
            ty: Ty::fun(Ty::var(7), Ty::fun(Ty::var(4), Ty::var(7))),
        };
        assert_eq!(scheme.to_string(), "forall a b. a -> b -> a");
        assert_eq!(Scheme::mono(Ty::int()).to_string(), "int");
    }

    #[test]
    fn scheme_display_keeps_free_vars() {
        let scheme = Scheme {
            vars: vec![TyVar(1)],
            ty: Ty::fun(Ty::var(1), Ty::var(9)),
        };
        assert_eq!(scheme.to_string(), "forall a. a -> 't9");
    }

    #[test]
    fn normalize_renames_in_occurrence_order() {
        let a = Scheme {
            vars: vec![TyVar(5), TyVar(3)],
            ty: Ty::fun(Ty::var(3), Ty::var(5)),
        };
        let b = Scheme {
            vars: vec![TyVar(0), TyVar(11)],
            ty: Ty::fun(Ty::var(11), Ty::var(0)),
        };
        assert_eq!(a.normalize(), b.normalize());
        assert_eq!(a.normalize().vars, vec![TyVar(0), TyVar(1)]);
        assert_eq!(a.normalize().ty, Ty::fun(Ty::var(0), Ty::var(1)));
    }

    #[test]
    fn normalize_drops_unused_quantifiers() {
        let scheme = Scheme {
            vars: vec![TyVar(1), TyVar(2)],
            ty: Ty::fun(Ty::var(2), Ty::int()),
        };
        assert_eq!(scheme.normalize().vars.len(), 1);
    }
}
