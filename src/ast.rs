//! Symbols and source positions for the Schist typed IR
//!
//! Every declaration and binder in the IR is identified by a symbol. Source
//! definitions carry no numeric id; specialization mints freshened copies
//! whose ids come from a shared atomic counter, so two specializations can
//! never alias each other's names.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source location for error reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// Declaration Symbols
// ============================================================================

/// A top-level definition symbol.
///
/// `id` is `None` for definitions that come straight from the resolver and
/// `Some(n)` for specializations minted during monomorphization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefnSym {
    pub id: Option<u64>,
    pub namespace: Vec<String>,
    pub name: String,
}

impl DefnSym {
    pub fn new(namespace: Vec<String>, name: impl Into<String>) -> Self {
        DefnSym {
            id: None,
            namespace,
            name: name.into(),
        }
    }

    /// The unqualified name, used when matching instance members against a
    /// trait signature.
    pub fn text(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DefnSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.namespace {
            write!(f, "{}.", part)?;
        }
        match self.id {
            None => write!(f, "{}", self.name),
            Some(id) => write!(f, "{}${}", self.name, id),
        }
    }
}

/// A trait symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraitSym {
    pub namespace: Vec<String>,
    pub name: String,
}

impl TraitSym {
    pub fn new(namespace: Vec<String>, name: impl Into<String>) -> Self {
        TraitSym {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for TraitSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.namespace {
            write!(f, "{}.", part)?;
        }
        write!(f, "{}", self.name)
    }
}

/// A trait signature symbol (a method declared by a trait)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SigSym {
    pub trait_sym: TraitSym,
    pub name: String,
}

impl SigSym {
    pub fn new(trait_sym: TraitSym, name: impl Into<String>) -> Self {
        SigSym {
            trait_sym,
            name: name.into(),
        }
    }
}

impl fmt::Display for SigSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.trait_sym, self.name)
    }
}

/// An associated type symbol, owned by a trait
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssocTypeSym {
    pub trait_sym: TraitSym,
    pub name: String,
}

impl AssocTypeSym {
    pub fn new(trait_sym: TraitSym, name: impl Into<String>) -> Self {
        AssocTypeSym {
            trait_sym,
            name: name.into(),
        }
    }
}

impl fmt::Display for AssocTypeSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.trait_sym, self.name)
    }
}

/// An enum (algebraic data type) symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumSym {
    pub namespace: Vec<String>,
    pub name: String,
}

impl EnumSym {
    pub fn new(namespace: Vec<String>, name: impl Into<String>) -> Self {
        EnumSym {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for EnumSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.namespace {
            write!(f, "{}.", part)?;
        }
        write!(f, "{}", self.name)
    }
}

/// A case (variant) symbol of an enum
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseSym {
    pub enum_sym: EnumSym,
    pub name: String,
}

impl CaseSym {
    pub fn new(enum_sym: EnumSym, name: impl Into<String>) -> Self {
        CaseSym {
            enum_sym,
            name: name.into(),
        }
    }
}

impl fmt::Display for CaseSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_sym, self.name)
    }
}

/// A declared effect symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectSym {
    pub namespace: Vec<String>,
    pub name: String,
}

impl EffectSym {
    pub fn new(namespace: Vec<String>, name: impl Into<String>) -> Self {
        EffectSym {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for EffectSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.namespace {
            write!(f, "{}.", part)?;
        }
        write!(f, "{}", self.name)
    }
}

/// An effect operation symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpSym {
    pub effect_sym: EffectSym,
    pub name: String,
}

impl OpSym {
    pub fn new(effect_sym: EffectSym, name: impl Into<String>) -> Self {
        OpSym {
            effect_sym,
            name: name.into(),
        }
    }
}

impl fmt::Display for OpSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.effect_sym, self.name)
    }
}

/// A type alias symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AliasSym {
    pub namespace: Vec<String>,
    pub name: String,
}

impl AliasSym {
    pub fn new(namespace: Vec<String>, name: impl Into<String>) -> Self {
        AliasSym {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for AliasSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.namespace {
            write!(f, "{}.", part)?;
        }
        write!(f, "{}", self.name)
    }
}

/// A record or schema row label
pub type Label = String;

// ============================================================================
// Local Symbols
// ============================================================================

/// A local variable symbol (formal parameter, let/pattern/handler binder).
///
/// Identity is the numeric id alone; the text is only for printing. Source
/// ids are unique within their defining declaration, and freshened ids are
/// unique across the whole output program.
#[derive(Debug, Clone)]
pub struct VarSym {
    pub id: u64,
    pub text: String,
    pub loc: Span,
}

impl VarSym {
    pub fn new(id: u64, text: impl Into<String>, loc: Span) -> Self {
        VarSym {
            id,
            text: text.into(),
            loc,
        }
    }
}

impl PartialEq for VarSym {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VarSym {}

impl std::hash::Hash for VarSym {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for VarSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%{}", self.text, self.id)
    }
}

/// A kinded type variable symbol
#[derive(Debug, Clone)]
pub struct TypeVarSym {
    pub id: u64,
    pub text: String,
    pub kind: crate::types::Kind,
}

impl TypeVarSym {
    pub fn new(id: u64, text: impl Into<String>, kind: crate::types::Kind) -> Self {
        TypeVarSym {
            id,
            text: text.into(),
            kind,
        }
    }
}

impl PartialEq for TypeVarSym {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeVarSym {}

impl std::hash::Hash for TypeVarSym {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeVarSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

// ============================================================================
// Fresh Symbol Generation
// ============================================================================

/// Mints fresh symbols during specialization.
///
/// One generator is owned by the registry for the duration of a single
/// invocation of the pass; it is shared by all workers, so every freshened
/// definition and binder gets a globally unique id.
#[derive(Debug, Default)]
pub struct SymbolGen {
    next: AtomicU64,
}

impl SymbolGen {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// A fresh copy of a definition symbol. The namespace and name carry
    /// over; only the id distinguishes the specialization.
    pub fn fresh_defn_sym(&self, sym: &DefnSym) -> DefnSym {
        DefnSym {
            id: Some(self.next_id()),
            namespace: sym.namespace.clone(),
            name: sym.name.clone(),
        }
    }

    /// A fresh copy of a local variable symbol.
    pub fn fresh_var_sym(&self, sym: &VarSym) -> VarSym {
        VarSym {
            id: self.next_id(),
            text: sym.text.clone(),
            loc: sym.loc,
        }
    }
}

// ============================================================================
// Declaration Metadata
// ============================================================================

/// Documentation attached to a declaration, carried through verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doc {
    pub lines: Vec<String>,
}

impl Doc {
    pub fn new(lines: Vec<String>) -> Self {
        Doc { lines }
    }
}

/// A declaration annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Inline,
    Lazy,
    Test,
}

/// The annotations attached to a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub annotations: Vec<Annotation>,
}

/// A declaration modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Sealed,
    Synthetic,
}

/// The modifiers attached to a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub modifiers: Vec<Modifier>,
}

impl Modifiers {
    pub fn is_synthetic(&self) -> bool {
        self.modifiers.contains(&Modifier::Synthetic)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    #[test]
    fn test_defn_sym_display() {
        let src = DefnSym::new(vec!["List".to_string()], "map");
        assert_eq!(src.to_string(), "List.map");

        let gen = SymbolGen::new();
        let fresh = gen.fresh_defn_sym(&src);
        assert_eq!(fresh.to_string(), "List.map$0");
        assert_ne!(src, fresh);
    }

    #[test]
    fn test_fresh_symbols_are_distinct() {
        let gen = SymbolGen::new();
        let base = VarSym::new(0, "x", Span::default());
        let a = gen.fresh_var_sym(&base);
        let b = gen.fresh_var_sym(&base);
        assert_ne!(a, b);
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn test_var_sym_identity_is_the_id() {
        let a = VarSym::new(7, "x", Span::default());
        let b = VarSym::new(7, "y", Span::new(3, 9));
        assert_eq!(a, b);

        let mut vs = std::collections::HashSet::new();
        vs.insert(a);
        assert!(vs.contains(&b));
    }

    #[test]
    fn test_type_var_sym_identity_is_the_id() {
        let a = TypeVarSym::new(1, "a", Kind::Star);
        let b = TypeVarSym::new(1, "b", Kind::Eff);
        assert_eq!(a, b);
    }
}
