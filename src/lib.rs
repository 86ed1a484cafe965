//! Schist monomorphization - whole-program specialization for the typed IR
//!
//! Takes a fully type-inferred root whose definitions may be parametric and
//! whose bodies may reference trait signatures, and produces a semantically
//! equivalent root in which every definition is monomorphic and every call
//! site targets a concrete specialization.

pub mod ast;
pub mod erase;
pub mod errors;
pub mod mono;
pub mod registry;
mod resolve;
pub mod subst;
pub mod tast;
pub mod test_support;
pub mod types;
pub mod unify;

pub use errors::MonoError;
pub use mono::monomorphize;
pub use tast::Root;
