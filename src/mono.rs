//! Monomorphization Pass
//!
//! Transforms a polymorphic, trait-based root into a program in which every
//! definition is monomorphic: no type parameters, no signature references,
//! every call targeting a concrete specialization. This eliminates all
//! polymorphism before lowering.
//!
//! The pass is demand driven. Non-parametric definitions seed the registry;
//! specializing a body discovers further demands, which the registry queues;
//! the driver drains the queue in parallel waves until it is empty. Because
//! erased types form a finite set per program and every demand is memoized
//! by `(source symbol, erased type)`, the queue admits only finitely many
//! distinct entries and the loop terminates.
//!
//! Key insight: the memo entry is installed *before* the body is
//! specialized, so mutually recursive definitions demanding each other at
//! the same type observe the fresh symbol instead of re-enqueueing.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::{DefnSym, VarSym};
use crate::erase::erase_type;
use crate::errors::MonoError;
use crate::registry::{Registry, WorkItem};
use crate::resolve::specialize_sig_sym;
use crate::subst::StrictSubstitution;
use crate::tast::{
    CatchRule, Def, Expr, FormalParam, HandlerRule, JvmMethod, MatchRule, Pattern,
    RecordLabelPattern, Root, Spec,
};
use crate::types::{Scheme, Type};
use crate::unify::{unify_or_ice, unify_types, RigidityEnv};

/// Mapping from source-local symbols to their freshened copies.
type VarEnv = FxHashMap<VarSym, VarSym>;

/// Shared, read-mostly state of one invocation of the pass.
pub(crate) struct Context {
    pub(crate) root: Arc<Root>,
    pub(crate) registry: Registry,
}

// ============================================================================
// Driver
// ============================================================================

/// Monomorphize a root. Returns a new root whose definitions are all
/// monomorphic; the signature, trait, and instance tables are cleared
/// because specialization has absorbed them.
pub fn monomorphize(root: Root) -> Result<Root, MonoError> {
    let eq_env = Arc::clone(&root.eq_env);
    let ctx = Context {
        root: Arc::new(root),
        registry: Registry::new(),
    };

    // Seed with every definition that has no type parameters. Each seed is
    // an ordinary demand at its own erased base type: it enters the result
    // store and primes the queue through the references in its body.
    let seeds: Vec<&Def> = ctx
        .root
        .defs
        .values()
        .filter(|def| def.spec.tparams.is_empty())
        .collect();
    debug!(count = seeds.len(), "seeding non-parametric definitions");
    seeds
        .par_iter()
        .map(|def| {
            let tpe = erase_type(&def.spec.declared_scheme.base, &ctx.root.eq_env)?;
            specialize_def_sym(&ctx, *def, &tpe).map(|_| ())
        })
        .collect::<Result<(), MonoError>>()?;

    // Drain the queue in waves until fixpoint. Workers within a wave run
    // on disjoint items and may enqueue further work.
    let mut wave = 0usize;
    while !ctx.registry.pending_is_empty() {
        let items = ctx.registry.drain();
        wave += 1;
        debug!(wave, count = items.len(), "specializing wave");
        items
            .into_par_iter()
            .map(|item| specialize_def(&ctx, item))
            .collect::<Result<(), MonoError>>()?;
    }

    let Context { root, registry } = ctx;
    let defs = registry.into_defs();
    debug!(count = defs.len(), "monomorphization complete");
    Ok(Root {
        defs,
        sigs: FxHashMap::default(),
        traits: FxHashMap::default(),
        instances: FxHashMap::default(),
        type_aliases: root.type_aliases.clone(),
        eq_env,
    })
}

// ============================================================================
// Demand
// ============================================================================

/// Demand a specialization of `def` at the concrete (erased) type `tpe`,
/// returning the fresh symbol that will hold it.
///
/// On a memo miss the fresh symbol is minted and the work is queued; the
/// body is specialized later by a worker. Non-parametric definitions are
/// the degenerate case: their one specialization uses the empty
/// substitution, and the memo keyed by the erased base type makes repeated
/// demand idempotent.
pub(crate) fn specialize_def_sym(
    ctx: &Context,
    def: &Def,
    tpe: &Type,
) -> Result<DefnSym, MonoError> {
    let demand = ctx.registry.lookup_or_mint(&def.sym, tpe);
    if !demand.minted {
        return Ok(demand.sym);
    }

    let (subst, econstrs) = if def.spec.tparams.is_empty() {
        (
            StrictSubstitution::empty(Arc::clone(&ctx.root.eq_env)),
            Vec::new(),
        )
    } else {
        unify_or_ice(
            &def.spec.declared_scheme.base,
            tpe,
            &ctx.root.eq_env,
            def.spec.loc,
        )?
    };

    ctx.registry.enqueue(WorkItem {
        sym: demand.sym.clone(),
        def: def.clone(),
        subst,
        econstrs,
    });
    Ok(demand.sym)
}

/// Specialize one queued definition and record the result.
fn specialize_def(ctx: &Context, item: WorkItem) -> Result<(), MonoError> {
    let WorkItem {
        sym, def, subst, ..
    } = item;

    let mut env = VarEnv::default();
    let fparams = def
        .spec
        .fparams
        .iter()
        .map(|fparam| freshen_fparam(ctx, fparam, &subst, &mut env))
        .collect::<Result<Vec<_>, _>>()?;
    let exp = specialize_exp(ctx, &def.exp, &env, &subst)?;

    // The specialized spec has no type parameters and a monomorphic scheme.
    // Doc, annotations, modifiers, and locations carry through verbatim;
    // the trait constraints are kept textually for downstream diagnostics
    // even though specialization has discharged them.
    let spec = Spec {
        doc: def.spec.doc.clone(),
        ann: def.spec.ann.clone(),
        mods: def.spec.mods.clone(),
        tparams: Vec::new(),
        fparams,
        declared_scheme: Scheme {
            quantifiers: Vec::new(),
            tconstrs: def.spec.tconstrs.clone(),
            econstrs: def.spec.econstrs.clone(),
            base: subst.apply(&def.spec.declared_scheme.base)?,
        },
        ret_tpe: subst.apply(&def.spec.ret_tpe)?,
        eff: subst.apply(&def.spec.eff)?,
        tconstrs: def.spec.tconstrs.clone(),
        econstrs: def.spec.econstrs.clone(),
        loc: def.spec.loc,
    };

    ctx.registry.insert_specialized(Def { sym, spec, exp });
    Ok(())
}

// ============================================================================
// Expressions
// ============================================================================

/// Specialize an expression under a variable environment and a strict
/// substitution: apply the substitution to every carried type, freshen
/// every binder, and rewrite definition and signature references to
/// concrete specializations.
fn specialize_exp(
    ctx: &Context,
    exp: &Expr,
    env: &VarEnv,
    subst: &StrictSubstitution,
) -> Result<Expr, MonoError> {
    match exp {
        Expr::Var { sym, tpe, loc } => match env.get(sym) {
            Some(fresh) => Ok(Expr::Var {
                sym: fresh.clone(),
                tpe: subst.apply(tpe)?,
                loc: *loc,
            }),
            None => Err(MonoError::UnboundVar {
                sym: sym.clone(),
                loc: *loc,
            }),
        },

        Expr::Def { sym, tpe, loc } => {
            let tpe = subst.apply(tpe)?;
            let def = ctx.root.defs.get(sym).ok_or_else(|| MonoError::UnboundDef {
                sym: sym.clone(),
                loc: *loc,
            })?;
            let fresh = specialize_def_sym(ctx, def, &tpe)?;
            Ok(Expr::Def {
                sym: fresh,
                tpe,
                loc: *loc,
            })
        }

        Expr::Sig { sym, tpe, loc } => {
            let tpe = subst.apply(tpe)?;
            let fresh = specialize_sig_sym(ctx, sym, &tpe, *loc)?;
            Ok(Expr::Def {
                sym: fresh,
                tpe,
                loc: *loc,
            })
        }

        Expr::Cst { cst, tpe, loc } => Ok(Expr::Cst {
            cst: cst.clone(),
            tpe: subst.apply(tpe)?,
            loc: *loc,
        }),

        Expr::Lambda {
            fparam,
            exp,
            tpe,
            loc,
        } => {
            let mut env1 = env.clone();
            let fparam = freshen_fparam(ctx, fparam, subst, &mut env1)?;
            let exp = specialize_exp(ctx, exp, &env1, subst)?;
            Ok(Expr::Lambda {
                fparam,
                exp: Box::new(exp),
                tpe: subst.apply(tpe)?,
                loc: *loc,
            })
        }

        Expr::Apply {
            exp,
            exps,
            tpe,
            eff,
            loc,
        } => Ok(Expr::Apply {
            exp: Box::new(specialize_exp(ctx, exp, env, subst)?),
            exps: specialize_exps(ctx, exps, env, subst)?,
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::ApplyAtomic {
            op,
            exps,
            tpe,
            eff,
            loc,
        } => Ok(Expr::ApplyAtomic {
            op: op.clone(),
            exps: specialize_exps(ctx, exps, env, subst)?,
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::Let {
            sym,
            exp1,
            exp2,
            tpe,
            eff,
            loc,
        } => {
            let exp1 = specialize_exp(ctx, exp1, env, subst)?;
            let fresh = ctx.registry.fresh_var_sym(sym);
            let mut env1 = env.clone();
            env1.insert(sym.clone(), fresh.clone());
            let exp2 = specialize_exp(ctx, exp2, &env1, subst)?;
            Ok(Expr::Let {
                sym: fresh,
                exp1: Box::new(exp1),
                exp2: Box::new(exp2),
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                loc: *loc,
            })
        }

        Expr::LetRec {
            sym,
            exp1,
            exp2,
            tpe,
            eff,
            loc,
        } => {
            // The binder scopes over both sub-expressions.
            let fresh = ctx.registry.fresh_var_sym(sym);
            let mut env1 = env.clone();
            env1.insert(sym.clone(), fresh.clone());
            let exp1 = specialize_exp(ctx, exp1, &env1, subst)?;
            let exp2 = specialize_exp(ctx, exp2, &env1, subst)?;
            Ok(Expr::LetRec {
                sym: fresh,
                exp1: Box::new(exp1),
                exp2: Box::new(exp2),
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                loc: *loc,
            })
        }

        Expr::Scope {
            sym,
            regvar,
            exp,
            tpe,
            eff,
            loc,
        } => {
            let fresh = ctx.registry.fresh_var_sym(sym);
            let mut env1 = env.clone();
            env1.insert(sym.clone(), fresh.clone());
            // Inside the body the region effect variable is impure; the
            // surrounding types keep the outer substitution, which
            // discharges the variable outside its scope.
            let subst1 = subst.bind_region(regvar, *loc);
            let exp = specialize_exp(ctx, exp, &env1, &subst1)?;
            Ok(Expr::Scope {
                sym: fresh,
                regvar: regvar.clone(),
                exp: Box::new(exp),
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                loc: *loc,
            })
        }

        Expr::IfThenElse {
            exp1,
            exp2,
            exp3,
            tpe,
            eff,
            loc,
        } => Ok(Expr::IfThenElse {
            exp1: Box::new(specialize_exp(ctx, exp1, env, subst)?),
            exp2: Box::new(specialize_exp(ctx, exp2, env, subst)?),
            exp3: Box::new(specialize_exp(ctx, exp3, env, subst)?),
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::Stm {
            exp1,
            exp2,
            tpe,
            eff,
            loc,
        } => Ok(Expr::Stm {
            exp1: Box::new(specialize_exp(ctx, exp1, env, subst)?),
            exp2: Box::new(specialize_exp(ctx, exp2, env, subst)?),
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::Discard { exp, eff, loc } => Ok(Expr::Discard {
            exp: Box::new(specialize_exp(ctx, exp, env, subst)?),
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::Match {
            exp,
            rules,
            tpe,
            eff,
            loc,
        } => {
            let exp = specialize_exp(ctx, exp, env, subst)?;
            let rules = rules
                .iter()
                .map(|rule| {
                    let mut env1 = env.clone();
                    let pat = specialize_pat(ctx, &rule.pat, subst, &mut env1)?;
                    let guard = rule
                        .guard
                        .as_ref()
                        .map(|g| specialize_exp(ctx, g, &env1, subst))
                        .transpose()?;
                    let exp = specialize_exp(ctx, &rule.exp, &env1, subst)?;
                    Ok(MatchRule { pat, guard, exp })
                })
                .collect::<Result<Vec<_>, MonoError>>()?;
            Ok(Expr::Match {
                exp: Box::new(exp),
                rules,
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                loc: *loc,
            })
        }

        Expr::TypeMatch {
            exp,
            rules,
            tpe,
            loc,
        } => {
            // The test runs over the non-strict form of the scrutinee type:
            // residual variables must stay visible, and pinning them rigid
            // keeps a rule from matching more generally than the scrutinee
            // warrants.
            let scrutinee_tpe = subst.raw().apply(&exp.tpe());
            let renv = RigidityEnv::of_type(&scrutinee_tpe);
            for rule in rules {
                let rule_tpe = subst.raw().apply(&rule.tpe);
                let Ok((case_subst, _)) = unify_types(&scrutinee_tpe, &rule_tpe, &renv) else {
                    continue;
                };
                // The matching rule becomes a let over the scrutinee,
                // specialized under the composed substitution.
                let subst1 = StrictSubstitution::new(
                    case_subst.compose(subst.raw()),
                    Arc::clone(subst.eq_env()),
                );
                let scrutinee = specialize_exp(ctx, exp, env, subst)?;
                let fresh = ctx.registry.fresh_var_sym(&rule.sym);
                let mut env1 = env.clone();
                env1.insert(rule.sym.clone(), fresh.clone());
                let body = specialize_exp(ctx, &rule.exp, &env1, &subst1)?;
                let eff = Type::mk_union(scrutinee.eff(), body.eff(), *loc);
                return Ok(Expr::Let {
                    sym: fresh,
                    exp1: Box::new(scrutinee),
                    exp2: Box::new(body),
                    tpe: subst.apply(tpe)?,
                    eff,
                    loc: *loc,
                });
            }
            // The upstream pass guarantees a total catch-all rule.
            Err(MonoError::NonExhaustiveTypeMatch {
                tpe: scrutinee_tpe,
                loc: *loc,
            })
        }

        Expr::VectorLit {
            exps,
            tpe,
            eff,
            loc,
        } => Ok(Expr::VectorLit {
            exps: specialize_exps(ctx, exps, env, subst)?,
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::VectorLoad {
            exp1,
            exp2,
            tpe,
            eff,
            loc,
        } => Ok(Expr::VectorLoad {
            exp1: Box::new(specialize_exp(ctx, exp1, env, subst)?),
            exp2: Box::new(specialize_exp(ctx, exp2, env, subst)?),
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::VectorLength { exp, loc } => Ok(Expr::VectorLength {
            exp: Box::new(specialize_exp(ctx, exp, env, subst)?),
            loc: *loc,
        }),

        Expr::Ascribe { exp, tpe, eff, loc } => Ok(Expr::Ascribe {
            exp: Box::new(specialize_exp(ctx, exp, env, subst)?),
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::Cast {
            exp,
            tpe,
            eff,
            loc,
            ..
        } => {
            // The source-declared type and effect are erased here.
            Ok(Expr::Cast {
                exp: Box::new(specialize_exp(ctx, exp, env, subst)?),
                declared_tpe: None,
                declared_eff: None,
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                loc: *loc,
            })
        }

        Expr::TryCatch {
            exp,
            rules,
            tpe,
            eff,
            loc,
        } => {
            let exp = specialize_exp(ctx, exp, env, subst)?;
            let rules = rules
                .iter()
                .map(|rule| {
                    let fresh = ctx.registry.fresh_var_sym(&rule.sym);
                    let mut env1 = env.clone();
                    env1.insert(rule.sym.clone(), fresh.clone());
                    let exp = specialize_exp(ctx, &rule.exp, &env1, subst)?;
                    Ok(CatchRule {
                        sym: fresh,
                        clazz: rule.clazz.clone(),
                        exp,
                    })
                })
                .collect::<Result<Vec<_>, MonoError>>()?;
            Ok(Expr::TryCatch {
                exp: Box::new(exp),
                rules,
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                loc: *loc,
            })
        }

        Expr::TryWith {
            exp,
            effect_sym,
            rules,
            tpe,
            eff,
            loc,
        } => {
            let exp = specialize_exp(ctx, exp, env, subst)?;
            let rules = rules
                .iter()
                .map(|rule| {
                    // The handler parameters include the continuation.
                    let mut env1 = env.clone();
                    let fparams = rule
                        .fparams
                        .iter()
                        .map(|fparam| freshen_fparam(ctx, fparam, subst, &mut env1))
                        .collect::<Result<Vec<_>, _>>()?;
                    let exp = specialize_exp(ctx, &rule.exp, &env1, subst)?;
                    Ok(HandlerRule {
                        op: rule.op.clone(),
                        fparams,
                        exp,
                    })
                })
                .collect::<Result<Vec<_>, MonoError>>()?;
            Ok(Expr::TryWith {
                exp: Box::new(exp),
                effect_sym: effect_sym.clone(),
                rules,
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                loc: *loc,
            })
        }

        Expr::Do {
            op,
            exps,
            tpe,
            eff,
            loc,
        } => Ok(Expr::Do {
            op: op.clone(),
            exps: specialize_exps(ctx, exps, env, subst)?,
            tpe: subst.apply(tpe)?,
            eff: subst.apply(eff)?,
            loc: *loc,
        }),

        Expr::NewObject {
            name,
            tpe,
            eff,
            methods,
            loc,
        } => {
            let methods = methods
                .iter()
                .map(|method| {
                    let mut env1 = env.clone();
                    let fparams = method
                        .fparams
                        .iter()
                        .map(|fparam| freshen_fparam(ctx, fparam, subst, &mut env1))
                        .collect::<Result<Vec<_>, _>>()?;
                    let exp = specialize_exp(ctx, &method.exp, &env1, subst)?;
                    Ok(JvmMethod {
                        name: method.name.clone(),
                        fparams,
                        exp,
                        ret_tpe: subst.apply(&method.ret_tpe)?,
                        eff: subst.apply(&method.eff)?,
                        loc: method.loc,
                    })
                })
                .collect::<Result<Vec<_>, MonoError>>()?;
            Ok(Expr::NewObject {
                name: name.clone(),
                tpe: subst.apply(tpe)?,
                eff: subst.apply(eff)?,
                methods,
                loc: *loc,
            })
        }
    }
}

fn specialize_exps(
    ctx: &Context,
    exps: &[Expr],
    env: &VarEnv,
    subst: &StrictSubstitution,
) -> Result<Vec<Expr>, MonoError> {
    exps.iter()
        .map(|exp| specialize_exp(ctx, exp, env, subst))
        .collect()
}

// ============================================================================
// Freshening
// ============================================================================

/// Freshen a formal parameter: mint a new local symbol, substitute the
/// parameter type, and record the mapping.
fn freshen_fparam(
    ctx: &Context,
    fparam: &FormalParam,
    subst: &StrictSubstitution,
    env: &mut VarEnv,
) -> Result<FormalParam, MonoError> {
    let fresh = ctx.registry.fresh_var_sym(&fparam.sym);
    env.insert(fparam.sym.clone(), fresh.clone());
    Ok(FormalParam {
        sym: fresh,
        tpe: subst.apply(&fparam.tpe)?,
        loc: fparam.loc,
    })
}

/// Freshen a pattern, collecting the binder mappings. Child environments
/// concatenate disjointly because source binders are unique within their
/// definition.
fn specialize_pat(
    ctx: &Context,
    pat: &Pattern,
    subst: &StrictSubstitution,
    env: &mut VarEnv,
) -> Result<Pattern, MonoError> {
    match pat {
        Pattern::Wild { tpe, loc } => Ok(Pattern::Wild {
            tpe: subst.apply(tpe)?,
            loc: *loc,
        }),

        Pattern::Var { sym, tpe, loc } => {
            let fresh = ctx.registry.fresh_var_sym(sym);
            env.insert(sym.clone(), fresh.clone());
            Ok(Pattern::Var {
                sym: fresh,
                tpe: subst.apply(tpe)?,
                loc: *loc,
            })
        }

        Pattern::Cst { cst, tpe, loc } => Ok(Pattern::Cst {
            cst: cst.clone(),
            tpe: subst.apply(tpe)?,
            loc: *loc,
        }),

        Pattern::Tag {
            sym,
            pats,
            tpe,
            loc,
        } => Ok(Pattern::Tag {
            sym: sym.clone(),
            pats: pats
                .iter()
                .map(|p| specialize_pat(ctx, p, subst, env))
                .collect::<Result<Vec<_>, _>>()?,
            tpe: subst.apply(tpe)?,
            loc: *loc,
        }),

        Pattern::Tuple { pats, tpe, loc } => Ok(Pattern::Tuple {
            pats: pats
                .iter()
                .map(|p| specialize_pat(ctx, p, subst, env))
                .collect::<Result<Vec<_>, _>>()?,
            tpe: subst.apply(tpe)?,
            loc: *loc,
        }),

        Pattern::Record {
            pats,
            pat,
            tpe,
            loc,
        } => {
            let pats = pats
                .iter()
                .map(|field| {
                    Ok(RecordLabelPattern {
                        label: field.label.clone(),
                        tpe: subst.apply(&field.tpe)?,
                        pat: specialize_pat(ctx, &field.pat, subst, env)?,
                        loc: field.loc,
                    })
                })
                .collect::<Result<Vec<_>, MonoError>>()?;
            let pat = specialize_pat(ctx, pat, subst, env)?;
            Ok(Pattern::Record {
                pats,
                pat: Box::new(pat),
                tpe: subst.apply(tpe)?,
                loc: *loc,
            })
        }

        Pattern::RecordEmpty { tpe, loc } => Ok(Pattern::RecordEmpty {
            tpe: subst.apply(tpe)?,
            loc: *loc,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Doc;
    use crate::test_support::*;

    #[test]
    fn test_empty_root_produces_empty_output() {
        let out = monomorphize(Root::empty()).unwrap();
        assert!(out.defs.is_empty());
        assert!(out.sigs.is_empty());
        assert!(out.traits.is_empty());
        assert!(out.instances.is_empty());
    }

    #[test]
    fn test_unbound_variable_is_an_internal_error() {
        let ghost = var_sym(99, "ghost");
        let main = def(
            "main",
            fn_spec(vec![], vec![], int32_t(), pure_t()),
            var_exp(&ghost, int32_t()),
        );
        let err = monomorphize(root_of(vec![main])).unwrap_err();
        assert!(matches!(err, MonoError::UnboundVar { .. }));
    }

    #[test]
    fn test_metadata_carries_through() {
        let u = var_sym(10, "u");
        let mut spec = fn_spec(vec![], vec![fparam(&u, unit_t())], unit_t(), pure_t());
        spec.doc = Doc::new(vec!["The entry point.".to_string()]);

        let out = monomorphize(root_of(vec![def("main", spec, unit_exp())])).unwrap();
        assert_eq!(out.defs.len(), 1);

        let main = out.defs.values().next().unwrap();
        assert_eq!(main.sym.name, "main");
        assert_eq!(main.spec.doc.lines, vec!["The entry point.".to_string()]);
        assert!(main.spec.tparams.is_empty());
        assert!(main.spec.declared_scheme.quantifiers.is_empty());
    }
}
