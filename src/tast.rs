//! Typed Abstract Syntax Tree
//!
//! The subset of the Schist IR that the monomorphization pass reads and
//! writes. Every expression carries its resolved type (and, where it can be
//! non-trivial, its effect). The pass consumes a root whose definitions may
//! be parametric and whose bodies may reference trait signatures, and
//! produces a root in which every definition is monomorphic and every
//! reference targets a concrete specialization.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::{
    AliasSym, Annotations, CaseSym, DefnSym, Doc, EffectSym, Label, Modifiers, OpSym, SigSym, Span,
    TraitSym, TypeVarSym, VarSym,
};
use crate::types::{EqualityConstraint, EqualityEnv, Scheme, TraitConstraint, Type, TypeCtor};

// ============================================================================
// Root
// ============================================================================

/// A whole program. The input root carries signatures, traits, and
/// instances; the output root carries definitions only — monomorphization
/// absorbs the rest.
#[derive(Debug, Clone)]
pub struct Root {
    pub defs: FxHashMap<DefnSym, Def>,
    pub sigs: FxHashMap<SigSym, Sig>,
    pub traits: FxHashMap<TraitSym, Trait>,
    pub instances: FxHashMap<TraitSym, Vec<Instance>>,
    pub type_aliases: FxHashMap<AliasSym, TypeAliasDef>,
    pub eq_env: Arc<EqualityEnv>,
}

impl Root {
    pub fn empty() -> Self {
        Root {
            defs: FxHashMap::default(),
            sigs: FxHashMap::default(),
            traits: FxHashMap::default(),
            instances: FxHashMap::default(),
            type_aliases: FxHashMap::default(),
            eq_env: Arc::new(EqualityEnv::new()),
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// A top-level definition
#[derive(Debug, Clone)]
pub struct Def {
    pub sym: DefnSym,
    pub spec: Spec,
    pub exp: Expr,
}

/// A trait signature, with an optional default body
#[derive(Debug, Clone)]
pub struct Sig {
    pub sym: SigSym,
    pub spec: Spec,
    pub exp: Option<Expr>,
}

/// A trait declaration. The pass only consults its signatures through
/// `Root::sigs`; the declaration itself is carried so the driver can clear
/// it from the output.
#[derive(Debug, Clone)]
pub struct Trait {
    pub sym: TraitSym,
    pub doc: Doc,
    pub mods: Modifiers,
    pub sigs: Vec<SigSym>,
    pub loc: Span,
}

/// A trait instance with its member definitions
#[derive(Debug, Clone)]
pub struct Instance {
    pub trait_sym: TraitSym,
    pub tpe: Type,
    pub tconstrs: Vec<TraitConstraint>,
    pub defs: Vec<Def>,
    pub loc: Span,
}

/// A type alias declaration, carried through the pass untouched
#[derive(Debug, Clone)]
pub struct TypeAliasDef {
    pub sym: AliasSym,
    pub tparams: Vec<TypeParam>,
    pub tpe: Type,
    pub loc: Span,
}

/// The specification of a definition or signature: metadata, parameters,
/// and the declared scheme.
#[derive(Debug, Clone)]
pub struct Spec {
    pub doc: Doc,
    pub ann: Annotations,
    pub mods: Modifiers,
    pub tparams: Vec<TypeParam>,
    pub fparams: Vec<FormalParam>,
    pub declared_scheme: Scheme,
    pub ret_tpe: Type,
    pub eff: Type,
    pub tconstrs: Vec<TraitConstraint>,
    pub econstrs: Vec<EqualityConstraint>,
    pub loc: Span,
}

/// A type parameter of a definition
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub sym: TypeVarSym,
    pub loc: Span,
}

/// A formal parameter of a definition or lambda
#[derive(Debug, Clone)]
pub struct FormalParam {
    pub sym: VarSym,
    pub tpe: Type,
    pub loc: Span,
}

// ============================================================================
// Constants and Intrinsics
// ============================================================================

/// A literal constant
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Unit,
    Bool(bool),
    Char(char),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Str(String),
}

/// A primitive unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// A primitive binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// An intrinsic operation applied through `Expr::ApplyAtomic`. The
/// specializer treats the operation itself as opaque: only its operands
/// and types are rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicOp {
    /// Construct a variant of an enum
    Tag(CaseSym),
    /// Construct a tuple from the operands
    Tuple,
    /// The empty record
    RecordEmpty,
    /// Select a label from a record
    RecordSelect(Label),
    /// Extend a record with a label
    RecordExtend(Label),
    /// Remove a label from a record
    RecordRestrict(Label),
    /// A primitive unary operation
    Unary(UnaryOp),
    /// A primitive binary operation
    Binary(BinaryOp),
    /// Allocate in the enclosing region
    Region,
}

// ============================================================================
// Expressions
// ============================================================================

/// A typed expression
#[derive(Debug, Clone)]
pub enum Expr {
    /// Local variable reference
    Var {
        sym: VarSym,
        tpe: Type,
        loc: Span,
    },

    /// Reference to a top-level definition at an instantiation type
    Def {
        sym: DefnSym,
        tpe: Type,
        loc: Span,
    },

    /// Reference to a trait signature at an instantiation type; resolved
    /// to a `Def` during specialization
    Sig {
        sym: SigSym,
        tpe: Type,
        loc: Span,
    },

    /// Literal constant
    Cst {
        cst: Constant,
        tpe: Type,
        loc: Span,
    },

    Lambda {
        fparam: FormalParam,
        exp: Box<Expr>,
        tpe: Type,
        loc: Span,
    },

    Apply {
        exp: Box<Expr>,
        exps: Vec<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Application of an intrinsic
    ApplyAtomic {
        op: AtomicOp,
        exps: Vec<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    Let {
        sym: VarSym,
        exp1: Box<Expr>,
        exp2: Box<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Recursive let; the binder is in scope in both sub-expressions
    LetRec {
        sym: VarSym,
        exp1: Box<Expr>,
        exp2: Box<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// A region scope. The region effect variable is treated as impure
    /// inside the body and is discharged outside it.
    Scope {
        sym: VarSym,
        regvar: TypeVarSym,
        exp: Box<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    IfThenElse {
        exp1: Box<Expr>,
        exp2: Box<Expr>,
        exp3: Box<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Statement sequence: evaluate `exp1` for its effect, then `exp2`
    Stm {
        exp1: Box<Expr>,
        exp2: Box<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Evaluate for effect and discard the value
    Discard {
        exp: Box<Expr>,
        eff: Type,
        loc: Span,
    },

    Match {
        exp: Box<Expr>,
        rules: Vec<MatchRule>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Runtime type test; rewritten into a `Let` of the first matching
    /// rule during specialization
    TypeMatch {
        exp: Box<Expr>,
        rules: Vec<TypeMatchRule>,
        tpe: Type,
        loc: Span,
    },

    VectorLit {
        exps: Vec<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    VectorLoad {
        exp1: Box<Expr>,
        exp2: Box<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    VectorLength {
        exp: Box<Expr>,
        loc: Span,
    },

    Ascribe {
        exp: Box<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// A checked or unchecked cast. The source-declared type and effect
    /// are dropped during specialization.
    Cast {
        exp: Box<Expr>,
        declared_tpe: Option<Type>,
        declared_eff: Option<Type>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    TryCatch {
        exp: Box<Expr>,
        rules: Vec<CatchRule>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Algebraic effect handler
    TryWith {
        exp: Box<Expr>,
        effect_sym: EffectSym,
        rules: Vec<HandlerRule>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Invoke an effect operation
    Do {
        op: OpSym,
        exps: Vec<Expr>,
        tpe: Type,
        eff: Type,
        loc: Span,
    },

    /// Anonymous object implementing a foreign interface
    NewObject {
        name: String,
        tpe: Type,
        eff: Type,
        methods: Vec<JvmMethod>,
        loc: Span,
    },
}

impl Expr {
    /// The type of this expression.
    pub fn tpe(&self) -> Type {
        match self {
            Expr::Var { tpe, .. }
            | Expr::Def { tpe, .. }
            | Expr::Sig { tpe, .. }
            | Expr::Cst { tpe, .. }
            | Expr::Lambda { tpe, .. }
            | Expr::Apply { tpe, .. }
            | Expr::ApplyAtomic { tpe, .. }
            | Expr::Let { tpe, .. }
            | Expr::LetRec { tpe, .. }
            | Expr::Scope { tpe, .. }
            | Expr::IfThenElse { tpe, .. }
            | Expr::Stm { tpe, .. }
            | Expr::Match { tpe, .. }
            | Expr::TypeMatch { tpe, .. }
            | Expr::VectorLit { tpe, .. }
            | Expr::VectorLoad { tpe, .. }
            | Expr::Ascribe { tpe, .. }
            | Expr::Cast { tpe, .. }
            | Expr::TryCatch { tpe, .. }
            | Expr::TryWith { tpe, .. }
            | Expr::Do { tpe, .. }
            | Expr::NewObject { tpe, .. } => tpe.clone(),
            Expr::Discard { loc, .. } => Type::unit(*loc),
            Expr::VectorLength { loc, .. } => Type::cst(TypeCtor::Int32, *loc),
        }
    }

    /// The effect of this expression. Values and references are pure.
    pub fn eff(&self) -> Type {
        match self {
            Expr::Var { loc, .. }
            | Expr::Def { loc, .. }
            | Expr::Sig { loc, .. }
            | Expr::Cst { loc, .. }
            | Expr::Lambda { loc, .. } => Type::pure_eff(*loc),
            Expr::Apply { eff, .. }
            | Expr::ApplyAtomic { eff, .. }
            | Expr::Let { eff, .. }
            | Expr::LetRec { eff, .. }
            | Expr::Scope { eff, .. }
            | Expr::IfThenElse { eff, .. }
            | Expr::Stm { eff, .. }
            | Expr::Discard { eff, .. }
            | Expr::Match { eff, .. }
            | Expr::VectorLit { eff, .. }
            | Expr::VectorLoad { eff, .. }
            | Expr::Ascribe { eff, .. }
            | Expr::Cast { eff, .. }
            | Expr::TryCatch { eff, .. }
            | Expr::TryWith { eff, .. }
            | Expr::Do { eff, .. }
            | Expr::NewObject { eff, .. } => eff.clone(),
            Expr::VectorLength { exp, .. } => exp.eff(),
            Expr::TypeMatch { exp, rules, loc, .. } => rules
                .iter()
                .fold(exp.eff(), |acc, rule| Type::mk_union(acc, rule.exp.eff(), *loc)),
        }
    }

    /// The source location of this expression.
    pub fn loc(&self) -> Span {
        match self {
            Expr::Var { loc, .. }
            | Expr::Def { loc, .. }
            | Expr::Sig { loc, .. }
            | Expr::Cst { loc, .. }
            | Expr::Lambda { loc, .. }
            | Expr::Apply { loc, .. }
            | Expr::ApplyAtomic { loc, .. }
            | Expr::Let { loc, .. }
            | Expr::LetRec { loc, .. }
            | Expr::Scope { loc, .. }
            | Expr::IfThenElse { loc, .. }
            | Expr::Stm { loc, .. }
            | Expr::Discard { loc, .. }
            | Expr::Match { loc, .. }
            | Expr::TypeMatch { loc, .. }
            | Expr::VectorLit { loc, .. }
            | Expr::VectorLoad { loc, .. }
            | Expr::VectorLength { loc, .. }
            | Expr::Ascribe { loc, .. }
            | Expr::Cast { loc, .. }
            | Expr::TryCatch { loc, .. }
            | Expr::TryWith { loc, .. }
            | Expr::Do { loc, .. }
            | Expr::NewObject { loc, .. } => *loc,
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// A rule of a pattern match
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub pat: Pattern,
    pub guard: Option<Expr>,
    pub exp: Expr,
}

/// A rule of a runtime type match
#[derive(Debug, Clone)]
pub struct TypeMatchRule {
    pub sym: VarSym,
    pub tpe: Type,
    pub exp: Expr,
}

/// A catch rule of a try-catch
#[derive(Debug, Clone)]
pub struct CatchRule {
    pub sym: VarSym,
    pub clazz: String,
    pub exp: Expr,
}

/// A handler rule of a try-with. The continuation parameter is among the
/// formal parameters.
#[derive(Debug, Clone)]
pub struct HandlerRule {
    pub op: OpSym,
    pub fparams: Vec<FormalParam>,
    pub exp: Expr,
}

/// A method of an anonymous object
#[derive(Debug, Clone)]
pub struct JvmMethod {
    pub name: String,
    pub fparams: Vec<FormalParam>,
    pub exp: Expr,
    pub ret_tpe: Type,
    pub eff: Type,
    pub loc: Span,
}

// ============================================================================
// Patterns
// ============================================================================

/// A typed pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    Wild {
        tpe: Type,
        loc: Span,
    },
    Var {
        sym: VarSym,
        tpe: Type,
        loc: Span,
    },
    Cst {
        cst: Constant,
        tpe: Type,
        loc: Span,
    },
    /// A variant pattern
    Tag {
        sym: CaseSym,
        pats: Vec<Pattern>,
        tpe: Type,
        loc: Span,
    },
    Tuple {
        pats: Vec<Pattern>,
        tpe: Type,
        loc: Span,
    },
    /// A record pattern: labelled sub-patterns and a tail
    Record {
        pats: Vec<RecordLabelPattern>,
        pat: Box<Pattern>,
        tpe: Type,
        loc: Span,
    },
    RecordEmpty {
        tpe: Type,
        loc: Span,
    },
}

impl Pattern {
    pub fn tpe(&self) -> &Type {
        match self {
            Pattern::Wild { tpe, .. }
            | Pattern::Var { tpe, .. }
            | Pattern::Cst { tpe, .. }
            | Pattern::Tag { tpe, .. }
            | Pattern::Tuple { tpe, .. }
            | Pattern::Record { tpe, .. }
            | Pattern::RecordEmpty { tpe, .. } => tpe,
        }
    }
}

/// One labelled field of a record pattern
#[derive(Debug, Clone)]
pub struct RecordLabelPattern {
    pub label: Label,
    pub tpe: Type,
    pub pat: Pattern,
    pub loc: Span,
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
    fn test_values_are_pure() {
        let e = Expr::Cst {
            cst: Constant::Int32(42),
            tpe: Type::cst(TypeCtor::Int32, sp()),
            loc: sp(),
        };
        assert!(e.eff().is_pure());
    }

    #[test]
    fn test_vector_length_is_int32() {
        let vec_tpe = Type::mk_vector(Type::cst(TypeCtor::Bool, sp()), sp());
        let e = Expr::VectorLength {
            exp: Box::new(Expr::Var {
                sym: VarSym::new(0, "v", sp()),
                tpe: vec_tpe,
                loc: sp(),
            }),
            loc: sp(),
        };
        assert_eq!(e.tpe(), Type::cst(TypeCtor::Int32, sp()));
        assert!(e.eff().is_pure());
    }

    #[test]
    fn test_discard_is_unit() {
        let e = Expr::Discard {
            exp: Box::new(Expr::Cst {
                cst: Constant::Bool(true),
                tpe: Type::cst(TypeCtor::Bool, sp()),
                loc: sp(),
            }),
            eff: Type::univ_eff(sp()),
            loc: sp(),
        };
        assert_eq!(e.tpe(), Type::unit(sp()));
        assert!(e.eff().is_univ());
    }
}
