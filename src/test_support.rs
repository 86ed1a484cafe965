//! Test support infrastructure for exercising the monomorphization pass.
//!
//! This module provides tools for:
//! - Building IR fixtures (types, specs, definitions, roots) concisely
//! - Walking specialized output to collect references and binders
//!
//! # Philosophy
//! Tests should verify not just that the pass produces *some* output, but
//! that the structure of the output upholds the pass invariants: every
//! definition monomorphic, every signature reference rewritten, binders
//! globally fresh, demands memoized. The walkers here give tests the
//! visibility they need into specialized definitions.

use rustc_hash::FxHashSet;

use crate::ast::{
    Annotations, DefnSym, Doc, Modifiers, SigSym, Span, TypeVarSym, VarSym,
};
use crate::tast::{
    AtomicOp, Constant, Def, Expr, FormalParam, Pattern, Root, Sig, Spec, TypeParam,
};
use crate::types::{Kind, Scheme, Type, TypeCtor};

// ============================================================================
// Types
// ============================================================================

pub fn sp() -> Span {
    Span::default()
}

pub fn unit_t() -> Type {
    Type::cst(TypeCtor::Unit, sp())
}

pub fn bool_t() -> Type {
    Type::cst(TypeCtor::Bool, sp())
}

pub fn char_t() -> Type {
    Type::cst(TypeCtor::Char, sp())
}

pub fn int32_t() -> Type {
    Type::cst(TypeCtor::Int32, sp())
}

pub fn str_t() -> Type {
    Type::cst(TypeCtor::Str, sp())
}

pub fn pure_t() -> Type {
    Type::pure_eff(sp())
}

pub fn tuple_t(elms: Vec<Type>) -> Type {
    Type::mk_tuple(elms, sp())
}

pub fn list_t(elm: Type) -> Type {
    Type::mk_enum(crate::ast::EnumSym::new(vec![], "List"), vec![elm], sp())
}

pub fn fn_t(params: Vec<Type>, eff: Type, ret: Type) -> Type {
    Type::mk_arrow(params, eff, ret, sp())
}

pub fn tvar_star(id: u64, text: &str) -> TypeVarSym {
    TypeVarSym::new(id, text, Kind::Star)
}

pub fn tvar_eff(id: u64, text: &str) -> TypeVarSym {
    TypeVarSym::new(id, text, Kind::Eff)
}

// ============================================================================
// Declarations
// ============================================================================

pub fn var_sym(id: u64, text: &str) -> VarSym {
    VarSym::new(id, text, sp())
}

pub fn defn_sym(name: &str) -> DefnSym {
    DefnSym::new(vec![], name)
}

pub fn tparam(sym: &TypeVarSym) -> TypeParam {
    TypeParam {
        name: sym.text.clone(),
        sym: sym.clone(),
        loc: sp(),
    }
}

pub fn fparam(sym: &VarSym, tpe: Type) -> FormalParam {
    FormalParam {
        sym: sym.clone(),
        tpe,
        loc: sp(),
    }
}

/// A spec whose declared base is the arrow over the formal parameter types.
pub fn fn_spec(tparams: Vec<TypeParam>, fparams: Vec<FormalParam>, ret: Type, eff: Type) -> Spec {
    let base = Type::mk_arrow(
        fparams.iter().map(|fp| fp.tpe.clone()).collect(),
        eff.clone(),
        ret.clone(),
        sp(),
    );
    Spec {
        doc: Doc::default(),
        ann: Annotations::default(),
        mods: Modifiers::default(),
        tparams: tparams.clone(),
        fparams,
        declared_scheme: Scheme {
            quantifiers: tparams.into_iter().map(|tp| tp.sym).collect(),
            tconstrs: Vec::new(),
            econstrs: Vec::new(),
            base,
        },
        ret_tpe: ret,
        eff,
        tconstrs: Vec::new(),
        econstrs: Vec::new(),
        loc: sp(),
    }
}

pub fn def(name: &str, spec: Spec, exp: Expr) -> Def {
    Def {
        sym: defn_sym(name),
        spec,
        exp,
    }
}

pub fn sig(sym: &SigSym, spec: Spec, default: Option<Expr>) -> Sig {
    Sig {
        sym: sym.clone(),
        spec,
        exp: default,
    }
}

/// A root holding only definitions.
pub fn root_of(defs: Vec<Def>) -> Root {
    let mut root = Root::empty();
    for d in defs {
        root.defs.insert(d.sym.clone(), d);
    }
    root
}

// ============================================================================
// Expressions
// ============================================================================

pub fn unit_exp() -> Expr {
    Expr::Cst {
        cst: Constant::Unit,
        tpe: unit_t(),
        loc: sp(),
    }
}

pub fn bool_exp(b: bool) -> Expr {
    Expr::Cst {
        cst: Constant::Bool(b),
        tpe: bool_t(),
        loc: sp(),
    }
}

pub fn char_exp(c: char) -> Expr {
    Expr::Cst {
        cst: Constant::Char(c),
        tpe: char_t(),
        loc: sp(),
    }
}

pub fn int_exp(n: i32) -> Expr {
    Expr::Cst {
        cst: Constant::Int32(n),
        tpe: int32_t(),
        loc: sp(),
    }
}

pub fn str_exp(s: &str) -> Expr {
    Expr::Cst {
        cst: Constant::Str(s.to_string()),
        tpe: str_t(),
        loc: sp(),
    }
}

pub fn var_exp(sym: &VarSym, tpe: Type) -> Expr {
    Expr::Var {
        sym: sym.clone(),
        tpe,
        loc: sp(),
    }
}

pub fn def_ref(sym: &DefnSym, tpe: Type) -> Expr {
    Expr::Def {
        sym: sym.clone(),
        tpe,
        loc: sp(),
    }
}

pub fn sig_ref(sym: &SigSym, tpe: Type) -> Expr {
    Expr::Sig {
        sym: sym.clone(),
        tpe,
        loc: sp(),
    }
}

/// A pure call.
pub fn call(exp: Expr, exps: Vec<Expr>, tpe: Type) -> Expr {
    Expr::Apply {
        exp: Box::new(exp),
        exps,
        tpe,
        eff: pure_t(),
        loc: sp(),
    }
}

/// A tuple literal built through the tuple intrinsic.
pub fn tuple_exp(exps: Vec<Expr>, tpe: Type) -> Expr {
    Expr::ApplyAtomic {
        op: AtomicOp::Tuple,
        exps,
        tpe,
        eff: pure_t(),
        loc: sp(),
    }
}

// ============================================================================
// Walkers
// ============================================================================

/// Visit every expression node of `exp`, parents before children.
pub fn for_each_expr<'a>(exp: &'a Expr, f: &mut impl FnMut(&'a Expr)) {
    f(exp);
    match exp {
        Expr::Var { .. }
        | Expr::Def { .. }
        | Expr::Sig { .. }
        | Expr::Cst { .. } => {}
        Expr::Lambda { exp, .. } => for_each_expr(exp, f),
        Expr::Apply { exp, exps, .. } => {
            for_each_expr(exp, f);
            for e in exps {
                for_each_expr(e, f);
            }
        }
        Expr::ApplyAtomic { exps, .. } | Expr::VectorLit { exps, .. } => {
            for e in exps {
                for_each_expr(e, f);
            }
        }
        Expr::Let { exp1, exp2, .. }
        | Expr::LetRec { exp1, exp2, .. }
        | Expr::Stm { exp1, exp2, .. }
        | Expr::VectorLoad { exp1, exp2, .. } => {
            for_each_expr(exp1, f);
            for_each_expr(exp2, f);
        }
        Expr::Scope { exp, .. }
        | Expr::Discard { exp, .. }
        | Expr::VectorLength { exp, .. }
        | Expr::Ascribe { exp, .. }
        | Expr::Cast { exp, .. } => for_each_expr(exp, f),
        Expr::IfThenElse {
            exp1, exp2, exp3, ..
        } => {
            for_each_expr(exp1, f);
            for_each_expr(exp2, f);
            for_each_expr(exp3, f);
        }
        Expr::Match { exp, rules, .. } => {
            for_each_expr(exp, f);
            for rule in rules {
                if let Some(guard) = &rule.guard {
                    for_each_expr(guard, f);
                }
                for_each_expr(&rule.exp, f);
            }
        }
        Expr::TypeMatch { exp, rules, .. } => {
            for_each_expr(exp, f);
            for rule in rules {
                for_each_expr(&rule.exp, f);
            }
        }
        Expr::TryCatch { exp, rules, .. } => {
            for_each_expr(exp, f);
            for rule in rules {
                for_each_expr(&rule.exp, f);
            }
        }
        Expr::TryWith { exp, rules, .. } => {
            for_each_expr(exp, f);
            for rule in rules {
                for_each_expr(&rule.exp, f);
            }
        }
        Expr::Do { exps, .. } => {
            for e in exps {
                for_each_expr(e, f);
            }
        }
        Expr::NewObject { methods, .. } => {
            for method in methods {
                for_each_expr(&method.exp, f);
            }
        }
    }
}

/// Collect the targets of every `Def` reference in a definition body.
pub fn def_refs(def: &Def) -> Vec<DefnSym> {
    let mut refs = Vec::new();
    for_each_expr(&def.exp, &mut |e| {
        if let Expr::Def { sym, .. } = e {
            refs.push(sym.clone());
        }
    });
    refs
}

/// Does the definition body still contain a `Sig` reference?
pub fn has_sig_refs(def: &Def) -> bool {
    let mut found = false;
    for_each_expr(&def.exp, &mut |e| {
        if matches!(e, Expr::Sig { .. }) {
            found = true;
        }
    });
    found
}

fn pattern_binders(pat: &Pattern, acc: &mut FxHashSet<u64>) {
    match pat {
        Pattern::Wild { .. } | Pattern::Cst { .. } | Pattern::RecordEmpty { .. } => {}
        Pattern::Var { sym, .. } => {
            acc.insert(sym.id);
        }
        Pattern::Tag { pats, .. } | Pattern::Tuple { pats, .. } => {
            for p in pats {
                pattern_binders(p, acc);
            }
        }
        Pattern::Record { pats, pat, .. } => {
            for field in pats {
                pattern_binders(&field.pat, acc);
            }
            pattern_binders(pat, acc);
        }
    }
}

/// Collect every local binder of a definition: formal parameters plus all
/// binders introduced in its body.
pub fn local_binders(def: &Def) -> FxHashSet<u64> {
    let mut acc = FxHashSet::default();
    for fp in &def.spec.fparams {
        acc.insert(fp.sym.id);
    }
    for_each_expr(&def.exp, &mut |e| match e {
        Expr::Lambda { fparam, .. } => {
            acc.insert(fparam.sym.id);
        }
        Expr::Let { sym, .. }
        | Expr::LetRec { sym, .. }
        | Expr::Scope { sym, .. } => {
            acc.insert(sym.id);
        }
        Expr::Match { rules, .. } => {
            for rule in rules {
                pattern_binders(&rule.pat, &mut acc);
            }
        }
        Expr::TypeMatch { rules, .. } => {
            for rule in rules {
                acc.insert(rule.sym.id);
            }
        }
        Expr::TryCatch { rules, .. } => {
            for rule in rules {
                acc.insert(rule.sym.id);
            }
        }
        Expr::TryWith { rules, .. } => {
            for rule in rules {
                for fp in &rule.fparams {
                    acc.insert(fp.sym.id);
                }
            }
        }
        Expr::NewObject { methods, .. } => {
            for method in methods {
                for fp in &method.fparams {
                    acc.insert(fp.sym.id);
                }
            }
        }
        _ => {}
    });
    acc
}
