//! Type erasure
//!
//! Normalizes a fully-substituted type into its erased form: every residual
//! type variable collapses to the default of its kind and every concrete
//! named effect collapses to the universal effect set. The erased form is
//! the canonical key under which the registry memoizes specializations and
//! the target against which declared schemes are unified.
//!
//! No algebraic simplification happens here; the strict substitution
//! performs that while substituting, once concrete operator constants are
//! revealed.

use std::collections::BTreeSet;

use crate::ast::Span;
use crate::errors::MonoError;
use crate::types::{EqualityEnv, Kind, Type, TypeCtor};

/// The default a free variable of the given kind erases to: Unit for value
/// kinds, Pure for effect kinds, the empty row for row kinds, and the empty
/// case set for case-set kinds.
pub(crate) fn default_for_kind(kind: &Kind, loc: Span) -> Type {
    match kind {
        Kind::Star => Type::cst(TypeCtor::Unit, loc),
        Kind::Eff => Type::cst(TypeCtor::Pure, loc),
        Kind::RecordRow => Type::cst(TypeCtor::RecordRowEmpty, loc),
        Kind::SchemaRow => Type::cst(TypeCtor::SchemaRowEmpty, loc),
        Kind::CaseSet(enum_sym) => {
            Type::cst(TypeCtor::CaseSet(BTreeSet::new(), enum_sym.clone()), loc)
        }
    }
}

/// Erase a type to its canonical concrete form.
pub fn erase_type(tpe: &Type, eq_env: &EqualityEnv) -> Result<Type, MonoError> {
    match tpe {
        Type::Var(sym, loc) => Ok(default_for_kind(&sym.kind, *loc)),

        Type::Cst(TypeCtor::Effect(_), loc) => Ok(Type::univ_eff(*loc)),
        Type::Cst(_, _) => Ok(tpe.clone()),

        Type::Apply(t1, t2, loc) => {
            let e1 = erase_type(t1, eq_env)?;
            let e2 = erase_type(t2, eq_env)?;
            Ok(Type::mk_apply(e1, e2, *loc))
        }

        Type::Alias { sym, args, tpe, loc } => {
            let erased_args = args
                .iter()
                .map(|arg| erase_type(arg, eq_env))
                .collect::<Result<Vec<_>, _>>()?;
            let erased_tpe = erase_type(tpe, eq_env)?;
            Ok(Type::Alias {
                sym: sym.clone(),
                args: erased_args,
                tpe: erased_tpe.into(),
                loc: *loc,
            })
        }

        Type::AssocType { sym, arg, loc, .. } => {
            let erased_arg = erase_type(arg, eq_env)?;
            match eq_env.reduce(sym, &erased_arg) {
                Some(reduced) => erase_type(&reduced.clone(), eq_env),
                None => Err(MonoError::IrreducibleAssocType {
                    sym: sym.clone(),
                    tpe: erased_arg,
                    loc: *loc,
                }),
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
    use crate::ast::{AssocTypeSym, EffectSym, EnumSym, TraitSym, TypeVarSym};

    fn sp() -> Span {
        Span::default()
    }

    fn env() -> EqualityEnv {
        EqualityEnv::new()
    }

    #[test]
    fn test_value_var_erases_to_unit() {
        let a = Type::var(TypeVarSym::new(1, "a", Kind::Star), sp());
        assert_eq!(erase_type(&a, &env()).unwrap(), Type::unit(sp()));
    }

    #[test]
    fn test_effect_var_erases_to_pure() {
        let e = Type::var(TypeVarSym::new(2, "e", Kind::Eff), sp());
        assert!(erase_type(&e, &env()).unwrap().is_pure());
    }

    #[test]
    fn test_row_vars_erase_to_empty_rows() {
        let r = Type::var(TypeVarSym::new(3, "r", Kind::RecordRow), sp());
        assert_eq!(
            erase_type(&r, &env()).unwrap(),
            Type::cst(TypeCtor::RecordRowEmpty, sp())
        );

        let s = Type::var(TypeVarSym::new(4, "s", Kind::SchemaRow), sp());
        assert_eq!(
            erase_type(&s, &env()).unwrap(),
            Type::cst(TypeCtor::SchemaRowEmpty, sp())
        );
    }

    #[test]
    fn test_case_set_var_erases_to_empty_set() {
        let color = EnumSym::new(vec![], "Color");
        let c = Type::var(TypeVarSym::new(5, "c", Kind::CaseSet(color.clone())), sp());
        assert_eq!(
            erase_type(&c, &env()).unwrap(),
            Type::cst(TypeCtor::CaseSet(BTreeSet::new(), color), sp())
        );
    }

    #[test]
    fn test_named_effect_erases_to_univ() {
        let io = Type::cst(TypeCtor::Effect(EffectSym::new(vec![], "IO")), sp());
        assert!(erase_type(&io, &env()).unwrap().is_univ());
    }

    #[test]
    fn test_application_erases_structurally() {
        let a = Type::var(TypeVarSym::new(1, "a", Kind::Star), sp());
        let list_a = Type::mk_enum(EnumSym::new(vec![], "List"), vec![a], sp());
        let expected = Type::mk_enum(EnumSym::new(vec![], "List"), vec![Type::unit(sp())], sp());
        assert_eq!(erase_type(&list_a, &env()).unwrap(), expected);
    }

    #[test]
    fn test_assoc_type_reduces_through_env() {
        let elm = AssocTypeSym::new(TraitSym::new(vec![], "Coll"), "Elm");
        let list_int = Type::mk_enum(
            EnumSym::new(vec![], "List"),
            vec![Type::cst(TypeCtor::Int32, sp())],
            sp(),
        );

        let mut eq_env = EqualityEnv::new();
        eq_env.insert(elm.clone(), list_int.clone(), Type::cst(TypeCtor::Int32, sp()));

        let assoc = Type::AssocType {
            sym: elm,
            arg: list_int.into(),
            kind: Kind::Star,
            loc: sp(),
        };
        assert_eq!(
            erase_type(&assoc, &eq_env).unwrap(),
            Type::cst(TypeCtor::Int32, sp())
        );
    }

    #[test]
    fn test_irreducible_assoc_type_is_an_error() {
        let elm = AssocTypeSym::new(TraitSym::new(vec![], "Coll"), "Elm");
        let assoc = Type::AssocType {
            sym: elm,
            arg: Type::unit(sp()).into(),
            kind: Kind::Star,
            loc: sp(),
        };
        assert!(matches!(
            erase_type(&assoc, &env()),
            Err(MonoError::IrreducibleAssocType { .. })
        ));
    }
}
