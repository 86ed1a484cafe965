//! Property-based tests for the monomorphization pass invariants
//!
//! These tests verify the universal output properties over generated demand
//! sets for a polymorphic identity function:
//! - Memo coherence: one specialization per distinct erased demand type
//! - Monomorphic output: no specialized definition has type parameters
//! - No signature references survive; every Def reference resolves
//! - Local binders of distinct output definitions are disjoint
//!
//! Output order is nondeterministic, so every assertion compares sets.

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use schist_mono::monomorphize;
use schist_mono::tast::{Def, Expr};
use schist_mono::test_support::*;
use schist_mono::types::Type;

// ============================================================================
// Demand Type Generator
// ============================================================================

/// A ground type a call site can demand, paired with a value of that type.
#[derive(Debug, Clone)]
enum Ground {
    Int,
    Boolean,
    Text,
    Unit,
    Pair(Box<Ground>, Box<Ground>),
}

fn arb_ground() -> impl Strategy<Value = Ground> {
    let leaf = prop_oneof![
        Just(Ground::Int),
        Just(Ground::Boolean),
        Just(Ground::Text),
        Just(Ground::Unit),
    ];
    leaf.prop_recursive(2, 8, 2, |inner| {
        (inner.clone(), inner).prop_map(|(a, b)| Ground::Pair(Box::new(a), Box::new(b)))
    })
}

fn ground_type(g: &Ground) -> Type {
    match g {
        Ground::Int => int32_t(),
        Ground::Boolean => bool_t(),
        Ground::Text => str_t(),
        Ground::Unit => unit_t(),
        Ground::Pair(a, b) => tuple_t(vec![ground_type(a), ground_type(b)]),
    }
}

fn ground_value(g: &Ground) -> Expr {
    match g {
        Ground::Int => int_exp(1),
        Ground::Boolean => bool_exp(true),
        Ground::Text => str_exp("v"),
        Ground::Unit => unit_exp(),
        Ground::Pair(a, b) => tuple_exp(
            vec![ground_value(a), ground_value(b)],
            ground_type(g),
        ),
    }
}

// ============================================================================
// Program Construction
// ============================================================================

/// `id[a](x: a): a = x`
fn id_def() -> Def {
    let a = tvar_star(1, "a");
    let x = var_sym(10, "x");
    def(
        "id",
        fn_spec(
            vec![tparam(&a)],
            vec![fparam(&x, Type::var(a.clone(), sp()))],
            Type::var(a.clone(), sp()),
            pure_t(),
        ),
        var_exp(&x, Type::var(a.clone(), sp())),
    )
}

/// `main(): Int32 = id(v1); id(v2); ...; 0`
fn main_def(id: &Def, demands: &[Ground]) -> Def {
    let mut body = int_exp(0);
    for g in demands {
        let t = ground_type(g);
        let call_exp = call(
            def_ref(&id.sym, fn_t(vec![t.clone()], pure_t(), t.clone())),
            vec![ground_value(g)],
            t,
        );
        body = Expr::Stm {
            exp1: Box::new(call_exp),
            exp2: Box::new(body),
            tpe: int32_t(),
            eff: pure_t(),
            loc: sp(),
        };
    }
    def("main", fn_spec(vec![], vec![], int32_t(), pure_t()), body)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn specializations_match_distinct_demands(demands in prop::collection::vec(arb_ground(), 1..8)) {
        let id = id_def();
        let main = main_def(&id, &demands);
        let out = monomorphize(root_of(vec![id, main])).unwrap();

        let distinct: FxHashSet<Type> = demands
            .iter()
            .map(|g| fn_t(vec![ground_type(g)], pure_t(), ground_type(g)))
            .collect();

        // Memo coherence: one specialization of id per distinct demand.
        let id_specs: Vec<_> = out.defs.values().filter(|d| d.sym.name == "id").collect();
        prop_assert_eq!(id_specs.len(), distinct.len());
        prop_assert_eq!(out.defs.len(), distinct.len() + 1);

        // Each specialization's scheme is one of the demanded arrows.
        for spec in &id_specs {
            prop_assert!(distinct.contains(&spec.spec.declared_scheme.base));
        }
    }

    #[test]
    fn output_is_monomorphic_and_closed(demands in prop::collection::vec(arb_ground(), 1..8)) {
        let id = id_def();
        let main = main_def(&id, &demands);
        let out = monomorphize(root_of(vec![id, main])).unwrap();

        for d in out.defs.values() {
            // No type parameters and no quantifiers survive.
            prop_assert!(d.spec.tparams.is_empty());
            prop_assert!(d.spec.declared_scheme.quantifiers.is_empty());

            // No signature references survive, and every definition
            // reference targets an output definition.
            prop_assert!(!has_sig_refs(d));
            for target in def_refs(d) {
                prop_assert!(out.defs.contains_key(&target));
            }
        }
    }

    #[test]
    fn local_binders_are_disjoint_across_definitions(demands in prop::collection::vec(arb_ground(), 1..8)) {
        let id = id_def();
        let main = main_def(&id, &demands);
        let out = monomorphize(root_of(vec![id, main])).unwrap();

        let defs: Vec<_> = out.defs.values().collect();
        for (i, d1) in defs.iter().enumerate() {
            for d2 in defs.iter().skip(i + 1) {
                let b1 = local_binders(d1);
                let b2 = local_binders(d2);
                prop_assert!(b1.is_disjoint(&b2));
            }
        }
    }
}
