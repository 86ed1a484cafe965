//! Type substitutions
//!
//! Two layers. `Substitution` is the ordinary map from type variables to
//! types: applying it leaves unmapped variables alone and performs no
//! simplification. `StrictSubstitution` wraps one together with the
//! equality environment; applying it additionally defaults every unmapped
//! variable by kind, collapses named effects to the universal effect set,
//! reduces associated types, and simplifies effect and case-set operator
//! applications through the smart constructors.
//!
//! The raw, non-defaulting layer stays reachable through
//! [`StrictSubstitution::raw`]: runtime type-match rules must unify against
//! the un-defaulted scrutinee type.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::{Span, TypeVarSym};
use crate::erase::default_for_kind;
use crate::errors::MonoError;
use crate::types::{EqualityEnv, Type, TypeCtor};

// ============================================================================
// Raw Substitution
// ============================================================================

/// A mapping from type variables to types. Application is structural.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    m: FxHashMap<TypeVarSym, Type>,
}

impl Substitution {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn singleton(sym: TypeVarSym, tpe: Type) -> Self {
        let mut m = FxHashMap::default();
        m.insert(sym, tpe);
        Substitution { m }
    }

    pub fn is_empty(&self) -> bool {
        self.m.is_empty()
    }

    pub fn get(&self, sym: &TypeVarSym) -> Option<&Type> {
        self.m.get(sym)
    }

    pub fn insert(&mut self, sym: TypeVarSym, tpe: Type) {
        self.m.insert(sym, tpe);
    }

    /// Apply this substitution to a type, leaving unmapped variables as
    /// they are.
    pub fn apply(&self, tpe: &Type) -> Type {
        if self.m.is_empty() {
            return tpe.clone();
        }
        match tpe {
            Type::Var(sym, _) => match self.m.get(sym) {
                Some(t) => t.clone(),
                None => tpe.clone(),
            },
            Type::Cst(_, _) => tpe.clone(),
            Type::Apply(t1, t2, loc) => {
                Type::mk_apply(self.apply(t1), self.apply(t2), *loc)
            }
            Type::Alias { sym, args, tpe, loc } => Type::Alias {
                sym: sym.clone(),
                args: args.iter().map(|arg| self.apply(arg)).collect(),
                tpe: self.apply(tpe).into(),
                loc: *loc,
            },
            Type::AssocType { sym, arg, kind, loc } => Type::AssocType {
                sym: sym.clone(),
                arg: self.apply(arg).into(),
                kind: kind.clone(),
                loc: *loc,
            },
        }
    }

    /// The composition `self ∘ inner`: applying the result is equivalent
    /// to applying `inner` first and `self` second.
    pub fn compose(&self, inner: &Substitution) -> Substitution {
        let mut m = FxHashMap::default();
        for (sym, tpe) in &inner.m {
            m.insert(sym.clone(), self.apply(tpe));
        }
        for (sym, tpe) in &self.m {
            m.entry(sym.clone()).or_insert_with(|| tpe.clone());
        }
        Substitution { m }
    }
}

// ============================================================================
// Strict Substitution
// ============================================================================

/// A substitution that also erases: unmapped variables become the default
/// of their kind, named effects become the universal effect set, and
/// associated types are reduced through the equality environment. The
/// result of applying a strict substitution is always ground.
#[derive(Debug, Clone)]
pub struct StrictSubstitution {
    s: Substitution,
    eq_env: Arc<EqualityEnv>,
}

impl StrictSubstitution {
    pub fn empty(eq_env: Arc<EqualityEnv>) -> Self {
        StrictSubstitution {
            s: Substitution::empty(),
            eq_env,
        }
    }

    pub fn new(s: Substitution, eq_env: Arc<EqualityEnv>) -> Self {
        StrictSubstitution { s, eq_env }
    }

    /// The underlying non-defaulting substitution. Needed only for runtime
    /// type-match unification, which must see residual variables.
    pub fn raw(&self) -> &Substitution {
        &self.s
    }

    pub fn eq_env(&self) -> &Arc<EqualityEnv> {
        &self.eq_env
    }

    /// Extend with one binding.
    pub fn extend(&self, sym: TypeVarSym, tpe: Type) -> Self {
        let mut s = self.s.clone();
        s.insert(sym, tpe);
        StrictSubstitution {
            s,
            eq_env: Arc::clone(&self.eq_env),
        }
    }

    /// Rebind a region effect variable to the impure effect for the extent
    /// of a scope body, replacing any previous binding.
    pub fn bind_region(&self, regvar: &TypeVarSym, loc: Span) -> Self {
        let mut s = self.s.clone();
        s.m.remove(regvar);
        s.insert(regvar.clone(), Type::univ_eff(loc));
        StrictSubstitution {
            s,
            eq_env: Arc::clone(&self.eq_env),
        }
    }

    /// Apply, defaulting free variables and simplifying as concrete
    /// operator constants are revealed.
    pub fn apply(&self, tpe: &Type) -> Result<Type, MonoError> {
        match tpe {
            Type::Var(sym, loc) => match self.s.get(sym) {
                Some(t) => Ok(t.clone()),
                None => Ok(default_for_kind(&sym.kind, *loc)),
            },

            Type::Cst(TypeCtor::Effect(_), loc) => Ok(Type::univ_eff(*loc)),
            Type::Cst(_, _) => Ok(tpe.clone()),

            Type::Apply(t1, t2, loc) => {
                let y = self.apply(t2)?;
                let x = self.apply(t1)?;
                // Substitution may expose an effect or case-set operator at
                // the head of the spine; normalize through the smart
                // constructors when it does.
                match &x {
                    Type::Cst(TypeCtor::Complement, _) => Ok(Type::mk_complement(y, *loc)),
                    Type::Cst(TypeCtor::CaseComplement(e), _) => {
                        Ok(Type::mk_case_complement(y, e, *loc))
                    }
                    Type::Apply(op, lhs, _) => match op.as_ref() {
                        Type::Cst(TypeCtor::Union, _) => {
                            Ok(Type::mk_union(lhs.as_ref().clone(), y, *loc))
                        }
                        Type::Cst(TypeCtor::Intersection, _) => {
                            Ok(Type::mk_intersection(lhs.as_ref().clone(), y, *loc))
                        }
                        Type::Cst(TypeCtor::CaseUnion(e), _) => {
                            Ok(Type::mk_case_union(lhs.as_ref().clone(), y, e, *loc))
                        }
                        Type::Cst(TypeCtor::CaseIntersection(e), _) => {
                            Ok(Type::mk_case_intersection(lhs.as_ref().clone(), y, e, *loc))
                        }
                        _ => Ok(Type::mk_apply(x, y, *loc)),
                    },
                    _ => Ok(Type::mk_apply(x, y, *loc)),
                }
            }

            Type::Alias { sym, args, tpe, loc } => {
                let args = args
                    .iter()
                    .map(|arg| self.apply(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let tpe = self.apply(tpe)?;
                Ok(Type::Alias {
                    sym: sym.clone(),
                    args,
                    tpe: tpe.into(),
                    loc: *loc,
                })
            }

            Type::AssocType { sym, arg, loc, .. } => {
                let arg = self.apply(arg)?;
                match self.eq_env.reduce(sym, &arg) {
                    Some(reduced) => {
                        let reduced = reduced.clone();
                        self.apply(&reduced)
                    }
                    None => Err(MonoError::IrreducibleAssocType {
                        sym: sym.clone(),
                        tpe: arg,
                        loc: *loc,
                    }),
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EffectSym, TypeVarSym};
    use crate::types::Kind;

    fn sp() -> Span {
        Span::default()
    }

    fn strict(s: Substitution) -> StrictSubstitution {
        StrictSubstitution::new(s, Arc::new(EqualityEnv::new()))
    }

    #[test]
    fn test_raw_apply_leaves_free_vars() {
        let a = TypeVarSym::new(1, "a", Kind::Star);
        let b = TypeVarSym::new(2, "b", Kind::Star);
        let s = Substitution::singleton(a.clone(), Type::cst(TypeCtor::Int32, sp()));

        let t = Type::mk_tuple(
            vec![Type::var(a, sp()), Type::var(b.clone(), sp())],
            sp(),
        );
        let expected = Type::mk_tuple(
            vec![Type::cst(TypeCtor::Int32, sp()), Type::var(b, sp())],
            sp(),
        );
        assert_eq!(s.apply(&t), expected);
    }

    #[test]
    fn test_strict_apply_defaults_free_vars() {
        let a = TypeVarSym::new(1, "a", Kind::Star);
        let e = TypeVarSym::new(2, "e", Kind::Eff);
        let s = strict(Substitution::empty());

        assert_eq!(s.apply(&Type::var(a, sp())).unwrap(), Type::unit(sp()));
        assert!(s.apply(&Type::var(e, sp())).unwrap().is_pure());
    }

    #[test]
    fn test_strict_apply_erases_named_effects() {
        let io = Type::cst(TypeCtor::Effect(EffectSym::new(vec![], "IO")), sp());
        let s = strict(Substitution::empty());
        assert!(s.apply(&io).unwrap().is_univ());
    }

    #[test]
    fn test_strict_apply_simplifies_revealed_union() {
        // e + Pure simplifies to the binding of e once substitution reveals
        // that both operands are concrete.
        let e = TypeVarSym::new(1, "e", Kind::Eff);
        let union = Type::mk_apply(
            Type::mk_apply(
                Type::cst(TypeCtor::Union, sp()),
                Type::var(e.clone(), sp()),
                sp(),
            ),
            Type::pure_eff(sp()),
            sp(),
        );

        let s = strict(Substitution::singleton(e, Type::univ_eff(sp())));
        assert!(s.apply(&union).unwrap().is_univ());

        // Unbound: e defaults to Pure, and Pure + Pure is Pure.
        let s = strict(Substitution::empty());
        assert!(s.apply(&union).unwrap().is_pure());
    }

    #[test]
    fn test_extend_adds_one_binding() {
        let a = TypeVarSym::new(1, "a", Kind::Star);
        let b = TypeVarSym::new(2, "b", Kind::Star);
        let s = strict(Substitution::empty()).extend(a.clone(), Type::cst(TypeCtor::Bool, sp()));

        assert_eq!(
            s.apply(&Type::var(a, sp())).unwrap(),
            Type::cst(TypeCtor::Bool, sp())
        );
        // Variables outside the extension still default.
        assert_eq!(s.apply(&Type::var(b, sp())).unwrap(), Type::unit(sp()));
    }

    #[test]
    fn test_bind_region_overrides_existing_binding() {
        let r = TypeVarSym::new(1, "r", Kind::Eff);
        let s = strict(Substitution::singleton(r.clone(), Type::pure_eff(sp())));
        let s1 = s.bind_region(&r, sp());

        assert!(s.apply(&Type::var(r.clone(), sp())).unwrap().is_pure());
        assert!(s1.apply(&Type::var(r, sp())).unwrap().is_univ());
    }

    #[test]
    fn test_compose_applies_outer_to_inner_range() {
        let a = TypeVarSym::new(1, "a", Kind::Star);
        let b = TypeVarSym::new(2, "b", Kind::Star);

        // inner: a -> b, outer: b -> Int32
        let inner = Substitution::singleton(a.clone(), Type::var(b.clone(), sp()));
        let outer = Substitution::singleton(b.clone(), Type::cst(TypeCtor::Int32, sp()));
        let composed = outer.compose(&inner);

        assert_eq!(
            composed.apply(&Type::var(a, sp())),
            Type::cst(TypeCtor::Int32, sp())
        );
        assert_eq!(
            composed.apply(&Type::var(b, sp())),
            Type::cst(TypeCtor::Int32, sp())
        );
    }
}
