//! Persistent type environment.
//!
//! The environment maps variable names to their type schemes. It is a
//! shared linked chain of bindings: `extend` returns a new environment whose
//! head is the new binding and whose tail is the old chain, so the caller's
//! environment is never mutated. Lookups walk from the newest binding
//! outward, which gives lexical shadowing for free.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::subst::{Subst, Types};
use crate::ty::{Scheme, TyVar};

#[derive(Debug)]
struct Binding {
    name: String,
    scheme: Scheme,
    parent: Option<Rc<Binding>>,
}

/// A type environment: an immutable chain of name-scheme bindings.
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    head: Option<Rc<Binding>>,
    len: usize,
}

impl TypeEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        TypeEnv::default()
    }

    /// A new environment with `name` bound to `scheme`, shadowing any
    /// earlier binding of the same name.
    pub fn extend(&self, name: impl Into<String>, scheme: Scheme) -> TypeEnv {
        TypeEnv {
            head: Some(Rc::new(Binding {
                name: name.into(),
                scheme,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Look up a name, searching from the innermost binding outward.
    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.iter()
            .find(|(bound, _)| *bound == name)
            .map(|(_, scheme)| scheme)
    }

    /// Number of bindings, shadowed ones included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bindings from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scheme)> {
        let mut cursor = self.head.as_deref();
        std::iter::from_fn(move || {
            let binding = cursor?;
            cursor = binding.parent.as_deref();
            Some((binding.name.as_str(), &binding.scheme))
        })
    }

    /// Largest type variable mentioned anywhere in the environment.
    pub(crate) fn max_var(&self) -> Option<TyVar> {
        self.iter()
            .flat_map(|(_, scheme)| scheme.ty.vars_in_order().into_iter().chain(scheme.vars.iter().copied()))
            .max()
    }
}

impl Types for TypeEnv {
    fn apply(&self, subst: &Subst) -> TypeEnv {
        if subst.is_empty() {
            return self.clone();
        }
        let bindings: Vec<(&str, &Scheme)> = self.iter().collect();
        bindings
            .into_iter()
            .rev()
            .fold(TypeEnv::new(), |env, (name, scheme)| {
                env.extend(name, scheme.apply(subst))
            })
    }

    fn free_vars(&self) -> BTreeSet<TyVar> {
        self.iter()
            .flat_map(|(_, scheme)| scheme.free_vars())
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, Scheme)> for TypeEnv {
    fn from_iter<I: IntoIterator<Item = (S, Scheme)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TypeEnv::new(), |env, (name, scheme)| env.extend(name, scheme))
    }
}
