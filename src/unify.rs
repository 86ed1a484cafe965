//! First-order unification over IR types
//!
//! The inference phase owns the full constraint solver; by the time this
//! pass runs, every type equation it poses is between a declared scheme and
//! a ground, erased instantiation. The unifier here therefore handles the
//! erased fragment: syntactic unification with alias transparency, rigidity
//! for type-match scrutinees, recorded equality constraints for residual
//! associated types, and effect equations whose ground side is always Pure
//! or Univ.
//!
//! A failure after type checking is an invariant violation; the adapter
//! [`unify_or_ice`] converts it into an internal-compiler error carrying
//! both operands.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::ast::{Span, TypeVarSym};
use crate::errors::MonoError;
use crate::subst::{StrictSubstitution, Substitution};
use crate::types::{EqualityConstraint, EqualityEnv, Type, TypeCtor};

// ============================================================================
// Rigidity
// ============================================================================

/// The set of type variables that may not be bound during unification.
#[derive(Debug, Clone, Default)]
pub struct RigidityEnv {
    rigid: FxHashSet<TypeVarSym>,
}

impl RigidityEnv {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mark every variable of the given type rigid.
    pub fn of_type(tpe: &Type) -> Self {
        let mut rigid = FxHashSet::default();
        tpe.type_vars(&mut rigid);
        RigidityEnv { rigid }
    }

    pub fn is_rigid(&self, sym: &TypeVarSym) -> bool {
        self.rigid.contains(sym)
    }
}

// ============================================================================
// Unification
// ============================================================================

/// Unification failure: the two types that could not be made equal.
#[derive(Debug, Clone)]
pub struct UnifyError {
    pub tpe1: Type,
    pub tpe2: Type,
}

/// Unify two types under the given rigidity environment.
///
/// On success returns the most general substitution together with the
/// equality constraints generated by residual associated types. The caller
/// records those constraints; acting on them is future work.
pub fn unify_types(
    t1: &Type,
    t2: &Type,
    renv: &RigidityEnv,
) -> Result<(Substitution, Vec<EqualityConstraint>), UnifyError> {
    let mut subst = Substitution::empty();
    let mut econstrs = Vec::new();
    unify(t1, t2, renv, &mut subst, &mut econstrs)?;
    Ok((subst, econstrs))
}

fn unify(
    t1: &Type,
    t2: &Type,
    renv: &RigidityEnv,
    subst: &mut Substitution,
    econstrs: &mut Vec<EqualityConstraint>,
) -> Result<(), UnifyError> {
    let t1 = subst.apply(t1);
    let t2 = subst.apply(t2);

    if t1 == t2 {
        return Ok(());
    }

    // Aliases are transparent to unification.
    if let Type::Alias { tpe, .. } = &t1 {
        return unify(tpe, &t2, renv, subst, econstrs);
    }
    if let Type::Alias { tpe, .. } = &t2 {
        return unify(&t1, tpe, renv, subst, econstrs);
    }

    // A residual associated type yields a recorded equality constraint
    // rather than a failure; the equality environment discharges it.
    match (&t1, &t2) {
        (Type::AssocType { sym: s1, arg: a1, .. }, Type::AssocType { sym: s2, arg: a2, .. })
            if s1 == s2 =>
        {
            return unify(a1, a2, renv, subst, econstrs);
        }
        (Type::AssocType { sym, loc, .. }, _) | (_, Type::AssocType { sym, loc, .. }) => {
            econstrs.push(EqualityConstraint {
                assoc_sym: sym.clone(),
                tpe1: t1.clone(),
                tpe2: t2.clone(),
                loc: *loc,
            });
            return Ok(());
        }
        _ => {}
    }

    // Effect equations have their own decomposition rules.
    if is_eff_term(&t1) || is_eff_term(&t2) {
        return unify_eff(&t1, &t2, renv, subst);
    }

    match (&t1, &t2) {
        (Type::Var(sym, _), _) if !renv.is_rigid(sym) => bind(sym, &t2, subst, &t1),
        (_, Type::Var(sym, _)) if !renv.is_rigid(sym) => bind(sym, &t1, subst, &t2),

        (Type::Apply(a1, b1, _), Type::Apply(a2, b2, _)) => {
            unify(a1, a2, renv, subst, econstrs)?;
            unify(b1, b2, renv, subst, econstrs)
        }

        _ => Err(UnifyError { tpe1: t1, tpe2: t2 }),
    }
}

fn bind(
    sym: &TypeVarSym,
    tpe: &Type,
    subst: &mut Substitution,
    var: &Type,
) -> Result<(), UnifyError> {
    if occurs(sym, tpe) {
        return Err(UnifyError {
            tpe1: var.clone(),
            tpe2: tpe.clone(),
        });
    }
    subst.insert(sym.clone(), tpe.clone());
    Ok(())
}

fn occurs(sym: &TypeVarSym, tpe: &Type) -> bool {
    match tpe {
        Type::Var(s, _) => s == sym,
        Type::Cst(_, _) => false,
        Type::Apply(t1, t2, _) => occurs(sym, t1) || occurs(sym, t2),
        Type::Alias { args, tpe, .. } => {
            args.iter().any(|arg| occurs(sym, arg)) || occurs(sym, tpe)
        }
        Type::AssocType { arg, .. } => occurs(sym, arg),
    }
}

// ============================================================================
// Effect Equations
// ============================================================================

/// Does the head of this type's application spine name an effect-set
/// constructor?
fn is_eff_term(tpe: &Type) -> bool {
    match tpe {
        Type::Cst(ctor, _) => matches!(
            ctor,
            TypeCtor::Pure
                | TypeCtor::Univ
                | TypeCtor::Effect(_)
                | TypeCtor::Complement
                | TypeCtor::Union
                | TypeCtor::Intersection
        ),
        Type::Apply(t1, _, _) => is_eff_term(t1),
        _ => false,
    }
}

/// Destructure `op x y` for a binary effect operator.
fn as_binary_eff(tpe: &Type) -> Option<(&TypeCtor, &Type, &Type)> {
    if let Type::Apply(t1, y, _) = tpe {
        if let Type::Apply(op, x, _) = t1.as_ref() {
            if let Type::Cst(ctor @ (TypeCtor::Union | TypeCtor::Intersection), _) = op.as_ref() {
                return Some((ctor, x, y));
            }
        }
    }
    None
}

/// Destructure `~x`.
fn as_complement(tpe: &Type) -> Option<&Type> {
    if let Type::Apply(op, x, _) = tpe {
        if matches!(op.as_ref(), Type::Cst(TypeCtor::Complement, _)) {
            return Some(x);
        }
    }
    None
}

/// Evaluate a variable-free effect term to its impurity. Named effects are
/// non-empty sets, which erasure identifies with Univ.
fn eval_eff(tpe: &Type) -> Option<bool> {
    match tpe {
        Type::Cst(TypeCtor::Pure, _) => Some(false),
        Type::Cst(TypeCtor::Univ, _) | Type::Cst(TypeCtor::Effect(_), _) => Some(true),
        _ => {
            if let Some((op, x, y)) = as_binary_eff(tpe) {
                let a = eval_eff(x)?;
                let b = eval_eff(y)?;
                return match op {
                    TypeCtor::Union => Some(a || b),
                    TypeCtor::Intersection => Some(a && b),
                    _ => None,
                };
            }
            if let Some(x) = as_complement(tpe) {
                return eval_eff(x).map(|b| !b);
            }
            None
        }
    }
}

fn unify_eff(
    t1: &Type,
    t2: &Type,
    renv: &RigidityEnv,
    subst: &mut Substitution,
) -> Result<(), UnifyError> {
    let t1 = subst.apply(t1);
    let t2 = subst.apply(t2);

    if t1 == t2 {
        return Ok(());
    }

    // A flexible variable takes the whole other side.
    if let Type::Var(sym, _) = &t1 {
        if !renv.is_rigid(sym) {
            return bind(sym, &t2, subst, &t1);
        }
    }
    if let Type::Var(sym, _) = &t2 {
        if !renv.is_rigid(sym) {
            return bind(sym, &t1, subst, &t2);
        }
    }

    match (eval_eff(&t1), eval_eff(&t2)) {
        (Some(a), Some(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(UnifyError { tpe1: t1, tpe2: t2 })
            }
        }
        (Some(ground), None) => force_eff(&t2, ground, renv, subst, &t1),
        (None, Some(ground)) => force_eff(&t1, ground, renv, subst, &t2),
        (None, None) => match (&t1, &t2) {
            // Neither side ground; decompose structurally.
            (Type::Apply(a1, b1, _), Type::Apply(a2, b2, _)) => {
                unify_eff(a1, a2, renv, subst)?;
                unify_eff(b1, b2, renv, subst)
            }
            _ => Err(UnifyError { tpe1: t1, tpe2: t2 }),
        },
    }
}

/// Constrain an effect term to be Pure (`impure == false`) or Univ
/// (`impure == true`), binding flexible variables as required.
fn force_eff(
    tpe: &Type,
    impure: bool,
    renv: &RigidityEnv,
    subst: &mut Substitution,
    other: &Type,
) -> Result<(), UnifyError> {
    let tpe = subst.apply(tpe);

    if let Some(ground) = eval_eff(&tpe) {
        return if ground == impure {
            Ok(())
        } else {
            Err(UnifyError {
                tpe1: tpe,
                tpe2: other.clone(),
            })
        };
    }

    if let Type::Var(sym, loc) = &tpe {
        if !renv.is_rigid(sym) {
            let target = if impure {
                Type::univ_eff(*loc)
            } else {
                Type::pure_eff(*loc)
            };
            return bind(sym, &target, subst, &tpe);
        }
        return Err(UnifyError {
            tpe1: tpe,
            tpe2: other.clone(),
        });
    }

    if let Some((op, x, y)) = as_binary_eff(&tpe) {
        let (x, y) = (x.clone(), y.clone());
        return match (op, impure) {
            // x + y == Pure forces both operands empty.
            (TypeCtor::Union, false) => {
                force_eff(&x, false, renv, subst, other)?;
                force_eff(&y, false, renv, subst, other)
            }
            // x + y == Univ holds if either operand is already impure;
            // otherwise a flexible operand absorbs the whole set.
            (TypeCtor::Union, true) => {
                if eval_eff(&subst.apply(&x)) == Some(true)
                    || eval_eff(&subst.apply(&y)) == Some(true)
                {
                    return Ok(());
                }
                force_eff(&x, true, renv, subst, other)
            }
            // x & y == Univ forces both operands universal.
            (TypeCtor::Intersection, true) => {
                force_eff(&x, true, renv, subst, other)?;
                force_eff(&y, true, renv, subst, other)
            }
            // x & y == Pure holds if either operand is already empty.
            (TypeCtor::Intersection, false) => {
                if eval_eff(&subst.apply(&x)) == Some(false)
                    || eval_eff(&subst.apply(&y)) == Some(false)
                {
                    return Ok(());
                }
                force_eff(&x, false, renv, subst, other)
            }
            _ => Err(UnifyError {
                tpe1: tpe.clone(),
                tpe2: other.clone(),
            }),
        };
    }

    if let Some(x) = as_complement(&tpe) {
        let x = x.clone();
        return force_eff(&x, !impure, renv, subst, other);
    }

    Err(UnifyError {
        tpe1: tpe,
        tpe2: other.clone(),
    })
}

// ============================================================================
// Infallible Adapter
// ============================================================================

/// Unify a declared scheme base with a concrete instantiation type.
///
/// The type checker guarantees unifiability, so failure is reported as an
/// internal-compiler error with both operands attached. The resulting
/// substitution is wrapped strictly; the equality constraints are handed
/// back for the caller to record.
pub fn unify_or_ice(
    declared: &Type,
    concrete: &Type,
    eq_env: &Arc<EqualityEnv>,
    loc: Span,
) -> Result<(StrictSubstitution, Vec<EqualityConstraint>), MonoError> {
    match unify_types(declared, concrete, &RigidityEnv::empty()) {
        Ok((subst, econstrs)) => Ok((
            StrictSubstitution::new(subst, Arc::clone(eq_env)),
            econstrs,
        )),
        Err(err) => Err(MonoError::UnificationFailure {
            tpe1: err.tpe1,
            tpe2: err.tpe2,
            loc,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssocTypeSym, EffectSym, EnumSym, TraitSym};
    use crate::types::Kind;

    fn sp() -> Span {
        Span::default()
    }

    fn tvar(id: u64, kind: Kind) -> TypeVarSym {
        TypeVarSym::new(id, format!("t{}", id), kind)
    }

    #[test]
    fn test_unify_var_with_ground_type() {
        let a = tvar(1, Kind::Star);
        let (subst, econstrs) = unify_types(
            &Type::var(a.clone(), sp()),
            &Type::cst(TypeCtor::Int32, sp()),
            &RigidityEnv::empty(),
        )
        .unwrap();
        assert!(econstrs.is_empty());
        assert_eq!(
            subst.apply(&Type::var(a, sp())),
            Type::cst(TypeCtor::Int32, sp())
        );
    }

    #[test]
    fn test_unify_arrow_instantiation() {
        let a = tvar(1, Kind::Star);
        let b = tvar(2, Kind::Star);
        let e = tvar(3, Kind::Eff);

        // (a, b) -> a \ e  against  (Bool, Char) -> Bool \ Pure
        let declared = Type::mk_arrow(
            vec![Type::mk_tuple(
                vec![Type::var(a.clone(), sp()), Type::var(b.clone(), sp())],
                sp(),
            )],
            Type::var(e.clone(), sp()),
            Type::var(a.clone(), sp()),
            sp(),
        );
        let concrete = Type::mk_arrow(
            vec![Type::mk_tuple(
                vec![
                    Type::cst(TypeCtor::Bool, sp()),
                    Type::cst(TypeCtor::Char, sp()),
                ],
                sp(),
            )],
            Type::pure_eff(sp()),
            Type::cst(TypeCtor::Bool, sp()),
            sp(),
        );

        let (subst, _) = unify_types(&declared, &concrete, &RigidityEnv::empty()).unwrap();
        assert_eq!(
            subst.apply(&Type::var(a, sp())),
            Type::cst(TypeCtor::Bool, sp())
        );
        assert_eq!(
            subst.apply(&Type::var(b, sp())),
            Type::cst(TypeCtor::Char, sp())
        );
        assert!(subst.apply(&Type::var(e, sp())).is_pure());
    }

    #[test]
    fn test_unify_mismatched_constructors_fails() {
        let result = unify_types(
            &Type::cst(TypeCtor::Int32, sp()),
            &Type::cst(TypeCtor::Bool, sp()),
            &RigidityEnv::empty(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rigid_var_does_not_bind() {
        let a = tvar(1, Kind::Star);
        let scrutinee = Type::mk_enum(
            EnumSym::new(vec![], "List"),
            vec![Type::var(a.clone(), sp())],
            sp(),
        );
        let renv = RigidityEnv::of_type(&scrutinee);

        // List[a] with a rigid must not unify with List[Int32].
        let candidate = Type::mk_enum(
            EnumSym::new(vec![], "List"),
            vec![Type::cst(TypeCtor::Int32, sp())],
            sp(),
        );
        assert!(unify_types(&scrutinee, &candidate, &renv).is_err());

        // But it still unifies with a flexible rule variable.
        let b = tvar(2, Kind::Star);
        let pattern = Type::mk_enum(
            EnumSym::new(vec![], "List"),
            vec![Type::var(b.clone(), sp())],
            sp(),
        );
        let (subst, _) = unify_types(&scrutinee, &pattern, &renv).unwrap();
        assert_eq!(
            subst.apply(&Type::var(b, sp())),
            Type::var(a, sp())
        );
    }

    #[test]
    fn test_occurs_check() {
        let a = tvar(1, Kind::Star);
        let t = Type::mk_enum(
            EnumSym::new(vec![], "List"),
            vec![Type::var(a.clone(), sp())],
            sp(),
        );
        assert!(unify_types(&Type::var(a, sp()), &t, &RigidityEnv::empty()).is_err());
    }

    #[test]
    fn test_named_effect_unifies_with_univ() {
        let io = Type::cst(TypeCtor::Effect(EffectSym::new(vec![], "IO")), sp());
        let (subst, _) =
            unify_types(&io, &Type::univ_eff(sp()), &RigidityEnv::empty()).unwrap();
        assert!(subst.is_empty());
    }

    #[test]
    fn test_effect_union_against_pure_forces_operands() {
        let e1 = tvar(1, Kind::Eff);
        let e2 = tvar(2, Kind::Eff);
        let union = Type::mk_apply(
            Type::mk_apply(
                Type::cst(TypeCtor::Union, sp()),
                Type::var(e1.clone(), sp()),
                sp(),
            ),
            Type::var(e2.clone(), sp()),
            sp(),
        );

        let (subst, _) =
            unify_types(&union, &Type::pure_eff(sp()), &RigidityEnv::empty()).unwrap();
        assert!(subst.apply(&Type::var(e1, sp())).is_pure());
        assert!(subst.apply(&Type::var(e2, sp())).is_pure());
    }

    #[test]
    fn test_effect_union_with_named_effect_against_univ() {
        // ef + IO ~ Univ holds without binding ef; the strict substitution
        // later defaults ef to Pure.
        let ef = tvar(1, Kind::Eff);
        let io = Type::cst(TypeCtor::Effect(EffectSym::new(vec![], "IO")), sp());
        let union = Type::mk_apply(
            Type::mk_apply(
                Type::cst(TypeCtor::Union, sp()),
                Type::var(ef.clone(), sp()),
                sp(),
            ),
            io,
            sp(),
        );

        let (subst, _) =
            unify_types(&union, &Type::univ_eff(sp()), &RigidityEnv::empty()).unwrap();
        assert!(subst.get(&ef).is_none());
    }

    #[test]
    fn test_assoc_type_records_equality_constraint() {
        let elm = AssocTypeSym::new(TraitSym::new(vec![], "Coll"), "Elm");
        let assoc = Type::AssocType {
            sym: elm.clone(),
            arg: Type::unit(sp()).into(),
            kind: Kind::Star,
            loc: sp(),
        };

        let (_, econstrs) = unify_types(
            &assoc,
            &Type::cst(TypeCtor::Int32, sp()),
            &RigidityEnv::empty(),
        )
        .unwrap();
        assert_eq!(econstrs.len(), 1);
        assert_eq!(econstrs[0].assoc_sym, elm);
    }

    #[test]
    fn test_unify_or_ice_reports_both_operands() {
        let eq_env = Arc::new(EqualityEnv::new());
        let err = unify_or_ice(
            &Type::cst(TypeCtor::Int32, sp()),
            &Type::cst(TypeCtor::Bool, sp()),
            &eq_env,
            sp(),
        )
        .unwrap_err();
        assert!(matches!(err, MonoError::UnificationFailure { .. }));
    }
}
