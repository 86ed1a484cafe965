//! Internal errors of the monomorphization pass
//!
//! Every condition here is an internal-compiler error: the upstream phases
//! guarantee it cannot arise on well-typed input, so surfacing one means a
//! bug in this pass or a predecessor. Each variant carries the offending
//! operands and the source location that triggered it. The pass never
//! attempts local recovery.

use thiserror::Error;

use crate::ast::{AssocTypeSym, DefnSym, SigSym, Span, VarSym};
use crate::types::Type;

#[derive(Error, Debug, Clone)]
pub enum MonoError {
    #[error("unable to unify '{tpe1}' and '{tpe2}' at {loc}")]
    UnificationFailure { tpe1: Type, tpe2: Type, loc: Span },

    #[error("no instance and no default implementation for '{sig}' at type '{tpe}' at {loc}")]
    MissingInstance { sig: SigSym, tpe: Type, loc: Span },

    #[error("multiple matching instances for '{sig}' at type '{tpe}' at {loc}")]
    AmbiguousInstance { sig: SigSym, tpe: Type, loc: Span },

    #[error("unbound variable '{sym}' at {loc}")]
    UnboundVar { sym: VarSym, loc: Span },

    #[error("unbound definition '{sym}' at {loc}")]
    UnboundDef { sym: DefnSym, loc: Span },

    #[error("unbound signature '{sym}' at {loc}")]
    UnboundSig { sym: SigSym, loc: Span },

    #[error("unable to reduce associated type '{sym}' applied to '{tpe}' at {loc}")]
    IrreducibleAssocType { sym: AssocTypeSym, tpe: Type, loc: Span },

    #[error("no rule of the type match applies to '{tpe}' at {loc}")]
    NonExhaustiveTypeMatch { tpe: Type, loc: Span },
}
