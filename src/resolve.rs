//! Trait signature resolution
//!
//! Rewrites a reference to a trait signature at a concrete type into a
//! reference to the implementation that serves it: the member of the one
//! instance whose declared scheme unifies with the call type, or a
//! definition synthesized from the signature's default body. The chosen
//! definition is then specialized through the ordinary demand path, so
//! repeated resolution at one type is memoized like any other demand.
//!
//! Resolution is entirely static. The upstream resolver guarantees that a
//! well-typed program has exactly one serving implementation, so zero or
//! multiple matches here are internal errors.

use crate::ast::{DefnSym, SigSym, Span};
use crate::errors::MonoError;
use crate::mono::{specialize_def_sym, Context};
use crate::tast::Def;
use crate::types::Type;
use crate::unify::{unify_types, RigidityEnv};

/// Resolve the signature `sym` at the concrete (erased) type `tpe` and
/// demand the specialization of the serving implementation.
pub(crate) fn specialize_sig_sym(
    ctx: &Context,
    sym: &SigSym,
    tpe: &Type,
    loc: Span,
) -> Result<DefnSym, MonoError> {
    let sig = ctx
        .root
        .sigs
        .get(sym)
        .ok_or_else(|| MonoError::UnboundSig {
            sym: sym.clone(),
            loc,
        })?;

    // Scan the trait's instances for members that implement this signature
    // at the demanded type.
    let instances = ctx
        .root
        .instances
        .get(&sym.trait_sym)
        .map(|instances| instances.as_slice())
        .unwrap_or(&[]);

    let mut matches: Vec<&Def> = Vec::new();
    for instance in instances {
        for def in &instance.defs {
            if def.sym.text() == sym.name
                && unify_types(&def.spec.declared_scheme.base, tpe, &RigidityEnv::empty()).is_ok()
            {
                matches.push(def);
            }
        }
    }

    match matches.as_slice() {
        [def] => specialize_def_sym(ctx, def, tpe),

        [] => match &sig.exp {
            // No instance serves the type; fall back to the default body,
            // synthesized as a definition in the trait's namespace.
            Some(body) => {
                let mut namespace = sym.trait_sym.namespace.clone();
                namespace.push(sym.trait_sym.name.clone());
                let defn_sym = DefnSym::new(namespace, sym.name.clone());
                let def = Def {
                    sym: defn_sym,
                    spec: sig.spec.clone(),
                    exp: body.clone(),
                };
                specialize_def_sym(ctx, &def, tpe)
            }
            None => Err(MonoError::MissingInstance {
                sig: sym.clone(),
                tpe: tpe.clone(),
                loc,
            }),
        },

        _ => Err(MonoError::AmbiguousInstance {
            sig: sym.clone(),
            tpe: tpe.clone(),
            loc,
        }),
    }
}
