//! Internal type representation for the monomorphization pass
//!
//! Types are immutable trees shared through `Arc` so they can be cloned
//! cheaply and sent across worker threads. Equality and hashing ignore
//! source locations: the registry keys specializations by `(symbol, type)`,
//! and the same instantiation demanded from two call sites must coincide.
//!
//! Effect and case-set algebra lives in the smart constructors (`mk_union`
//! and friends). They normalize identity and absorption laws only; anything
//! they cannot decide is rebuilt as an application spine and left for a
//! later substitution to reveal.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{AliasSym, AssocTypeSym, CaseSym, EffectSym, EnumSym, Label, Span, TraitSym, TypeVarSym};

// ============================================================================
// Kinds
// ============================================================================

/// The kind of a type variable. The kind decides the default a free
/// variable erases to: Unit, Pure, the empty row, or the empty case set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Kind of value types
    Star,
    /// Kind of effect sets
    Eff,
    /// Kind of record rows
    RecordRow,
    /// Kind of schema rows
    SchemaRow,
    /// Kind of case sets over the given enum
    CaseSet(EnumSym),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Star => write!(f, "Type"),
            Kind::Eff => write!(f, "Eff"),
            Kind::RecordRow => write!(f, "RecordRow"),
            Kind::SchemaRow => write!(f, "SchemaRow"),
            Kind::CaseSet(sym) => write!(f, "CaseSet[{}]", sym),
        }
    }
}

// ============================================================================
// Type Constructors
// ============================================================================

/// A type constructor. Constructors are uninterpreted except by the smart
/// constructors below, which recognize the effect and case-set operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeCtor {
    // Primitives
    Unit,
    Bool,
    Char,
    Int32,
    Int64,
    Float64,
    Str,

    /// Function type of the given parameter count. A fully applied arrow is
    /// `Arrow(n) eff t1 ... tn ret`.
    Arrow(usize),
    /// Tuple of the given arity
    Tuple(usize),
    /// Named algebraic data type
    Enum(EnumSym),
    /// Immutable vector
    Vector,
    /// Region handle; `Region r` is the value-level view of a region
    /// effect variable
    Region,

    // Record rows
    RecordRowEmpty,
    RecordRowExtend(Label),
    Record,

    // Schema rows
    SchemaRowEmpty,
    SchemaRowExtend(Label),
    Schema,

    // Effect sets
    /// The empty effect set
    Pure,
    /// The universal effect set
    Univ,
    /// A concrete named effect
    Effect(EffectSym),
    Complement,
    Union,
    Intersection,

    // Case sets
    /// A literal case set over the given enum
    CaseSet(BTreeSet<CaseSym>, EnumSym),
    CaseComplement(EnumSym),
    CaseUnion(EnumSym),
    CaseIntersection(EnumSym),
}

impl fmt::Display for TypeCtor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCtor::Unit => write!(f, "Unit"),
            TypeCtor::Bool => write!(f, "Bool"),
            TypeCtor::Char => write!(f, "Char"),
            TypeCtor::Int32 => write!(f, "Int32"),
            TypeCtor::Int64 => write!(f, "Int64"),
            TypeCtor::Float64 => write!(f, "Float64"),
            TypeCtor::Str => write!(f, "String"),
            TypeCtor::Arrow(n) => write!(f, "Arrow{}", n),
            TypeCtor::Tuple(n) => write!(f, "Tuple{}", n),
            TypeCtor::Enum(sym) => write!(f, "{}", sym),
            TypeCtor::Vector => write!(f, "Vector"),
            TypeCtor::Region => write!(f, "Region"),
            TypeCtor::RecordRowEmpty => write!(f, "()"),
            TypeCtor::RecordRowExtend(label) => write!(f, "( {} = _ | _ )", label),
            TypeCtor::Record => write!(f, "Record"),
            TypeCtor::SchemaRowEmpty => write!(f, "#()"),
            TypeCtor::SchemaRowExtend(label) => write!(f, "#( {} = _ | _ )", label),
            TypeCtor::Schema => write!(f, "Schema"),
            TypeCtor::Pure => write!(f, "Pure"),
            TypeCtor::Univ => write!(f, "Univ"),
            TypeCtor::Effect(sym) => write!(f, "{}", sym),
            TypeCtor::Complement => write!(f, "~"),
            TypeCtor::Union => write!(f, "+"),
            TypeCtor::Intersection => write!(f, "&"),
            TypeCtor::CaseSet(cases, _) => {
                write!(f, "<")?;
                for (i, case) in cases.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", case)?;
                }
                write!(f, ">")
            }
            TypeCtor::CaseComplement(_) => write!(f, "~~"),
            TypeCtor::CaseUnion(_) => write!(f, "++"),
            TypeCtor::CaseIntersection(_) => write!(f, "&&"),
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// A type in the IR: a variable, a constructor constant, a curried
/// application, a type alias, or an associated type application.
#[derive(Debug, Clone)]
pub enum Type {
    Var(TypeVarSym, Span),
    Cst(TypeCtor, Span),
    Apply(Arc<Type>, Arc<Type>, Span),
    Alias {
        sym: AliasSym,
        args: Vec<Type>,
        tpe: Arc<Type>,
        loc: Span,
    },
    AssocType {
        sym: AssocTypeSym,
        arg: Arc<Type>,
        kind: Kind,
        loc: Span,
    },
}

// Equality and hashing deliberately ignore source locations.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Var(s1, _), Type::Var(s2, _)) => s1 == s2,
            (Type::Cst(c1, _), Type::Cst(c2, _)) => c1 == c2,
            (Type::Apply(a1, b1, _), Type::Apply(a2, b2, _)) => a1 == a2 && b1 == b2,
            (
                Type::Alias { sym: s1, args: a1, tpe: t1, .. },
                Type::Alias { sym: s2, args: a2, tpe: t2, .. },
            ) => s1 == s2 && a1 == a2 && t1 == t2,
            (
                Type::AssocType { sym: s1, arg: a1, kind: k1, .. },
                Type::AssocType { sym: s2, arg: a2, kind: k2, .. },
            ) => s1 == s2 && a1 == a2 && k1 == k2,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Type::Var(sym, _) => sym.hash(state),
            Type::Cst(ctor, _) => ctor.hash(state),
            Type::Apply(t1, t2, _) => {
                t1.hash(state);
                t2.hash(state);
            }
            Type::Alias { sym, args, tpe, .. } => {
                sym.hash(state);
                args.hash(state);
                tpe.hash(state);
            }
            Type::AssocType { sym, arg, kind, .. } => {
                sym.hash(state);
                arg.hash(state);
                kind.hash(state);
            }
        }
    }
}

impl Type {
    pub fn var(sym: TypeVarSym, loc: Span) -> Type {
        Type::Var(sym, loc)
    }

    pub fn cst(ctor: TypeCtor, loc: Span) -> Type {
        Type::Cst(ctor, loc)
    }

    pub fn unit(loc: Span) -> Type {
        Type::Cst(TypeCtor::Unit, loc)
    }

    /// The empty effect set
    pub fn pure_eff(loc: Span) -> Type {
        Type::Cst(TypeCtor::Pure, loc)
    }

    /// The universal effect set
    pub fn univ_eff(loc: Span) -> Type {
        Type::Cst(TypeCtor::Univ, loc)
    }

    pub fn mk_apply(t1: Type, t2: Type, loc: Span) -> Type {
        Type::Apply(Arc::new(t1), Arc::new(t2), loc)
    }

    /// A fully applied function type: `Arrow(n) eff t1 ... tn ret`.
    pub fn mk_arrow(params: Vec<Type>, eff: Type, ret: Type, loc: Span) -> Type {
        let mut acc = Type::mk_apply(Type::cst(TypeCtor::Arrow(params.len()), loc), eff, loc);
        for param in params {
            acc = Type::mk_apply(acc, param, loc);
        }
        Type::mk_apply(acc, ret, loc)
    }

    pub fn mk_tuple(elms: Vec<Type>, loc: Span) -> Type {
        let mut acc = Type::cst(TypeCtor::Tuple(elms.len()), loc);
        for elm in elms {
            acc = Type::mk_apply(acc, elm, loc);
        }
        acc
    }

    pub fn mk_enum(sym: EnumSym, args: Vec<Type>, loc: Span) -> Type {
        let mut acc = Type::cst(TypeCtor::Enum(sym), loc);
        for arg in args {
            acc = Type::mk_apply(acc, arg, loc);
        }
        acc
    }

    pub fn mk_vector(elm: Type, loc: Span) -> Type {
        Type::mk_apply(Type::cst(TypeCtor::Vector, loc), elm, loc)
    }

    pub fn loc(&self) -> Span {
        match self {
            Type::Var(_, loc) => *loc,
            Type::Cst(_, loc) => *loc,
            Type::Apply(_, _, loc) => *loc,
            Type::Alias { loc, .. } => *loc,
            Type::AssocType { loc, .. } => *loc,
        }
    }

    pub fn is_pure(&self) -> bool {
        matches!(self, Type::Cst(TypeCtor::Pure, _))
    }

    pub fn is_univ(&self) -> bool {
        matches!(self, Type::Cst(TypeCtor::Univ, _))
    }

    fn is_empty_case_set(&self) -> bool {
        matches!(self, Type::Cst(TypeCtor::CaseSet(s, _), _) if s.is_empty())
    }

    /// Collect the free type variables of this type.
    pub fn type_vars(&self, acc: &mut FxHashSet<TypeVarSym>) {
        match self {
            Type::Var(sym, _) => {
                acc.insert(sym.clone());
            }
            Type::Cst(_, _) => {}
            Type::Apply(t1, t2, _) => {
                t1.type_vars(acc);
                t2.type_vars(acc);
            }
            Type::Alias { args, tpe, .. } => {
                for arg in args {
                    arg.type_vars(acc);
                }
                tpe.type_vars(acc);
            }
            Type::AssocType { arg, .. } => arg.type_vars(acc),
        }
    }

    // ------------------------------------------------------------------
    // Effect set constructors
    // ------------------------------------------------------------------

    /// `t1 + t2` with identity, absorption, and idempotence applied.
    pub fn mk_union(t1: Type, t2: Type, loc: Span) -> Type {
        if t1.is_pure() {
            return t2;
        }
        if t2.is_pure() {
            return t1;
        }
        if t1.is_univ() || t2.is_univ() {
            return Type::univ_eff(loc);
        }
        if t1 == t2 {
            return t1;
        }
        Type::mk_apply(
            Type::mk_apply(Type::cst(TypeCtor::Union, loc), t1, loc),
            t2,
            loc,
        )
    }

    /// `t1 & t2` with identity, absorption, and idempotence applied.
    pub fn mk_intersection(t1: Type, t2: Type, loc: Span) -> Type {
        if t1.is_univ() {
            return t2;
        }
        if t2.is_univ() {
            return t1;
        }
        if t1.is_pure() || t2.is_pure() {
            return Type::pure_eff(loc);
        }
        if t1 == t2 {
            return t1;
        }
        Type::mk_apply(
            Type::mk_apply(Type::cst(TypeCtor::Intersection, loc), t1, loc),
            t2,
            loc,
        )
    }

    /// `~t` with involution applied.
    pub fn mk_complement(t: Type, loc: Span) -> Type {
        if t.is_pure() {
            return Type::univ_eff(loc);
        }
        if t.is_univ() {
            return Type::pure_eff(loc);
        }
        if let Type::Apply(op, inner, _) = &t {
            if matches!(op.as_ref(), Type::Cst(TypeCtor::Complement, _)) {
                return inner.as_ref().clone();
            }
        }
        Type::mk_apply(Type::cst(TypeCtor::Complement, loc), t, loc)
    }

    // ------------------------------------------------------------------
    // Case set constructors
    // ------------------------------------------------------------------

    /// `t1 ++ t2` over the cases of `enum_sym`. Literal operands are merged.
    pub fn mk_case_union(t1: Type, t2: Type, enum_sym: &EnumSym, loc: Span) -> Type {
        if let (Type::Cst(TypeCtor::CaseSet(s1, e1), _), Type::Cst(TypeCtor::CaseSet(s2, _), _)) =
            (&t1, &t2)
        {
            let merged: BTreeSet<CaseSym> = s1.union(s2).cloned().collect();
            return Type::cst(TypeCtor::CaseSet(merged, e1.clone()), loc);
        }
        if t1.is_empty_case_set() {
            return t2;
        }
        if t2.is_empty_case_set() {
            return t1;
        }
        if t1 == t2 {
            return t1;
        }
        Type::mk_apply(
            Type::mk_apply(Type::cst(TypeCtor::CaseUnion(enum_sym.clone()), loc), t1, loc),
            t2,
            loc,
        )
    }

    /// `t1 && t2` over the cases of `enum_sym`. Literal operands are merged.
    pub fn mk_case_intersection(t1: Type, t2: Type, enum_sym: &EnumSym, loc: Span) -> Type {
        if let (Type::Cst(TypeCtor::CaseSet(s1, e1), _), Type::Cst(TypeCtor::CaseSet(s2, _), _)) =
            (&t1, &t2)
        {
            let merged: BTreeSet<CaseSym> = s1.intersection(s2).cloned().collect();
            return Type::cst(TypeCtor::CaseSet(merged, e1.clone()), loc);
        }
        if t1.is_empty_case_set() {
            return t1;
        }
        if t2.is_empty_case_set() {
            return t2;
        }
        if t1 == t2 {
            return t1;
        }
        Type::mk_apply(
            Type::mk_apply(
                Type::cst(TypeCtor::CaseIntersection(enum_sym.clone()), loc),
                t1,
                loc,
            ),
            t2,
            loc,
        )
    }

    /// `~~t` over the cases of `enum_sym`. A literal complement needs the
    /// enum's universe, which the type layer does not carry; only the
    /// involution is normalized here.
    pub fn mk_case_complement(t: Type, enum_sym: &EnumSym, loc: Span) -> Type {
        if let Type::Apply(op, inner, _) = &t {
            if matches!(op.as_ref(), Type::Cst(TypeCtor::CaseComplement(_), _)) {
                return inner.as_ref().clone();
            }
        }
        Type::mk_apply(
            Type::cst(TypeCtor::CaseComplement(enum_sym.clone()), loc),
            t,
            loc,
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(sym, _) => write!(f, "{}", sym),
            Type::Cst(ctor, _) => write!(f, "{}", ctor),
            Type::Apply(_, _, _) => {
                // Flatten the application spine for readability
                let mut base = self;
                let mut args = Vec::new();
                while let Type::Apply(t1, t2, _) = base {
                    args.push(t2.as_ref());
                    base = t1.as_ref();
                }
                args.reverse();
                match base {
                    Type::Cst(TypeCtor::Tuple(_), _) => {
                        write!(f, "(")?;
                        for (i, arg) in args.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{}", arg)?;
                        }
                        write!(f, ")")
                    }
                    Type::Cst(TypeCtor::Arrow(n), _) if args.len() == n + 2 => {
                        let eff = args[0];
                        let params = &args[1..=*n];
                        let ret = args[n + 1];
                        write!(f, "(")?;
                        for (i, param) in params.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{}", param)?;
                        }
                        write!(f, ") -> {} \\ {}", ret, eff)
                    }
                    _ => {
                        write!(f, "{}", base)?;
                        for arg in args {
                            match arg {
                                Type::Apply(_, _, _) => write!(f, " ({})", arg)?,
                                _ => write!(f, " {}", arg)?,
                            }
                        }
                        Ok(())
                    }
                }
            }
            Type::Alias { sym, args, .. } => {
                write!(f, "{}", sym)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Type::AssocType { sym, arg, .. } => write!(f, "{}[{}]", sym, arg),
        }
    }
}

// ============================================================================
// Schemes and Constraints
// ============================================================================

/// A trait constraint `Trait[t]` on a scheme. Retained on specialized specs
/// for downstream diagnostics even though specialization discharges it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitConstraint {
    pub trait_sym: TraitSym,
    pub tpe: Type,
    pub loc: Span,
}

/// An equality constraint `Assoc[t1] ~ t2` on a scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityConstraint {
    pub assoc_sym: AssocTypeSym,
    pub tpe1: Type,
    pub tpe2: Type,
    pub loc: Span,
}

/// A polymorphic type scheme: `∀ quantifiers. constraints ⇒ base`.
#[derive(Debug, Clone)]
pub struct Scheme {
    pub quantifiers: Vec<TypeVarSym>,
    pub tconstrs: Vec<TraitConstraint>,
    pub econstrs: Vec<EqualityConstraint>,
    pub base: Type,
}

impl Scheme {
    /// A monomorphic scheme over the given base type.
    pub fn mono(base: Type) -> Scheme {
        Scheme {
            quantifiers: Vec::new(),
            tconstrs: Vec::new(),
            econstrs: Vec::new(),
            base,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.quantifiers.is_empty() {
            write!(f, "∀ ")?;
            for (i, q) in self.quantifiers.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", q)?;
            }
            write!(f, ". ")?;
        }
        write!(f, "{}", self.base)
    }
}

// ============================================================================
// Equality Environment
// ============================================================================

/// The associated-type reduction environment produced by the inference
/// phase. Read-only here: a lookup that misses is an invariant violation
/// surfaced as an internal error by the caller.
#[derive(Debug, Clone, Default)]
pub struct EqualityEnv {
    reductions: FxHashMap<(AssocTypeSym, Type), Type>,
}

impl EqualityEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sym: AssocTypeSym, arg: Type, result: Type) {
        self.reductions.insert((sym, arg), result);
    }

    /// Reduce `sym[arg]` one step, if the environment knows how.
    pub fn reduce(&self, sym: &AssocTypeSym, arg: &Type) -> Option<&Type> {
        self.reductions.get(&(sym.clone(), arg.clone()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::default()
    }

    #[test]
    fn test_type_equality_ignores_locations() {
        let t1 = Type::mk_tuple(vec![Type::unit(Span::new(1, 2))], Span::new(3, 4));
        let t2 = Type::mk_tuple(vec![Type::unit(Span::new(9, 12))], Span::new(50, 60));
        assert_eq!(t1, t2);

        let mut seen = FxHashSet::default();
        seen.insert(t1);
        assert!(seen.contains(&t2));
    }

    #[test]
    fn test_union_identity_and_absorption() {
        let pure = Type::pure_eff(sp());
        let univ = Type::univ_eff(sp());
        let io = Type::cst(TypeCtor::Effect(EffectSym::new(vec![], "IO")), sp());

        assert_eq!(Type::mk_union(pure.clone(), io.clone(), sp()), io);
        assert_eq!(Type::mk_union(io.clone(), pure.clone(), sp()), io);
        assert!(Type::mk_union(univ.clone(), io.clone(), sp()).is_univ());
        assert_eq!(Type::mk_union(io.clone(), io.clone(), sp()), io);
    }

    #[test]
    fn test_intersection_identity_and_absorption() {
        let pure = Type::pure_eff(sp());
        let univ = Type::univ_eff(sp());
        let io = Type::cst(TypeCtor::Effect(EffectSym::new(vec![], "IO")), sp());

        assert_eq!(Type::mk_intersection(univ.clone(), io.clone(), sp()), io);
        assert!(Type::mk_intersection(pure.clone(), io.clone(), sp()).is_pure());
        assert_eq!(Type::mk_intersection(io.clone(), io.clone(), sp()), io);
    }

    #[test]
    fn test_complement_involution() {
        let pure = Type::pure_eff(sp());
        let univ = Type::univ_eff(sp());
        assert!(Type::mk_complement(pure.clone(), sp()).is_univ());
        assert!(Type::mk_complement(univ, sp()).is_pure());

        let io = Type::cst(TypeCtor::Effect(EffectSym::new(vec![], "IO")), sp());
        let double = Type::mk_complement(Type::mk_complement(io.clone(), sp()), sp());
        assert_eq!(double, io);
    }

    #[test]
    fn test_case_set_literal_algebra() {
        let color = EnumSym::new(vec![], "Color");
        let red = CaseSym::new(color.clone(), "Red");
        let blue = CaseSym::new(color.clone(), "Blue");

        let s1 = Type::cst(
            TypeCtor::CaseSet(BTreeSet::from([red.clone()]), color.clone()),
            sp(),
        );
        let s2 = Type::cst(
            TypeCtor::CaseSet(BTreeSet::from([red.clone(), blue.clone()]), color.clone()),
            sp(),
        );

        let union = Type::mk_case_union(s1.clone(), s2.clone(), &color, sp());
        let Type::Cst(TypeCtor::CaseSet(cases, _), _) = union else {
            panic!("expected literal case set");
        };
        assert_eq!(cases, BTreeSet::from([red.clone(), blue.clone()]));

        let inter = Type::mk_case_intersection(s1.clone(), s2, &color, sp());
        let Type::Cst(TypeCtor::CaseSet(cases, _), _) = inter else {
            panic!("expected literal case set");
        };
        assert_eq!(cases, BTreeSet::from([red]));
    }

    #[test]
    fn test_arrow_display() {
        let t = Type::mk_arrow(
            vec![Type::cst(TypeCtor::Int32, sp())],
            Type::pure_eff(sp()),
            Type::cst(TypeCtor::Bool, sp()),
            sp(),
        );
        assert_eq!(t.to_string(), "(Int32) -> Bool \\ Pure");
    }

    #[test]
    fn test_type_vars_collection() {
        let a = TypeVarSym::new(1, "a", Kind::Star);
        let e = TypeVarSym::new(2, "e", Kind::Eff);
        let t = Type::mk_arrow(
            vec![Type::var(a.clone(), sp())],
            Type::var(e.clone(), sp()),
            Type::var(a.clone(), sp()),
            sp(),
        );
        let mut vars = FxHashSet::default();
        t.type_vars(&mut vars);
        assert_eq!(vars.len(), 2);
        assert!(vars.contains(&a));
        assert!(vars.contains(&e));
    }

    #[test]
    fn test_equality_env_reduce() {
        let trait_sym = TraitSym::new(vec![], "Coll");
        let elm = AssocTypeSym::new(trait_sym, "Elm");
        let list_int = Type::mk_enum(
            EnumSym::new(vec![], "List"),
            vec![Type::cst(TypeCtor::Int32, sp())],
            sp(),
        );

        let mut env = EqualityEnv::new();
        env.insert(elm.clone(), list_int.clone(), Type::cst(TypeCtor::Int32, sp()));

        assert_eq!(
            env.reduce(&elm, &list_int),
            Some(&Type::cst(TypeCtor::Int32, sp()))
        );
        assert!(env.reduce(&elm, &Type::unit(sp())).is_none());
    }
}
