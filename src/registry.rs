//! Specialization registry
//!
//! The only mutable state of the pass, scoped to a single invocation and
//! shared by every worker thread:
//!
//! 1. a pending queue of specializations awaiting a worker,
//! 2. a memo map from `(source symbol, erased type)` to the fresh symbol
//!    minted for that demand, and
//! 3. the store of finished specialized definitions.
//!
//! The memo and store sit behind one mutex; the queue is a lock-free
//! concurrent queue. The memo obeys first-writer-wins: `lookup_or_mint` is
//! a single critical section, so exactly one fresh symbol exists per
//! demanded `(symbol, type)` pair, and a worker that loses the race simply
//! observes the winner's symbol.

use crossbeam::queue::SegQueue;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ast::{DefnSym, SymbolGen, VarSym};
use crate::subst::StrictSubstitution;
use crate::tast::Def;
use crate::types::{EqualityConstraint, Type};

/// One pending specialization: the fresh symbol it will define, the source
/// definition to copy, and the substitution to specialize under.
///
/// The equality constraints produced while unifying the demand are carried
/// along but not yet consumed.
// TODO: thread the recorded equality constraints through associated-type
// reduction in the strict substitution instead of dropping them here.
#[derive(Debug)]
pub struct WorkItem {
    pub sym: DefnSym,
    pub def: Def,
    pub subst: StrictSubstitution,
    pub econstrs: Vec<EqualityConstraint>,
}

/// The outcome of a demand: the fresh symbol, and whether this call minted
/// it (and therefore owes the registry a queue entry).
#[derive(Debug)]
pub struct Demand {
    pub sym: DefnSym,
    pub minted: bool,
}

#[derive(Default)]
struct Tables {
    /// `(source symbol, erased type)` to fresh symbol
    def_to_def: FxHashMap<(DefnSym, Type), DefnSym>,
    /// Fresh symbol to its finished specialization
    specialized: FxHashMap<DefnSym, Def>,
}

/// The shared registry. See the module docs for the concurrency contract.
#[derive(Default)]
pub struct Registry {
    pending: SegQueue<WorkItem>,
    tables: Mutex<Tables>,
    symbols: SymbolGen,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the fresh symbol for `(sym, tpe)`, minting one on a miss.
    ///
    /// The read and the write are one critical section: concurrent demands
    /// of the same pair agree on a single fresh symbol, and exactly one
    /// caller sees `minted == true`.
    pub fn lookup_or_mint(&self, sym: &DefnSym, tpe: &Type) -> Demand {
        let mut tables = self.tables.lock();
        if let Some(fresh) = tables.def_to_def.get(&(sym.clone(), tpe.clone())) {
            trace!(source = %sym, "specialization memo hit");
            return Demand {
                sym: fresh.clone(),
                minted: false,
            };
        }
        let fresh = self.symbols.fresh_defn_sym(sym);
        tables
            .def_to_def
            .insert((sym.clone(), tpe.clone()), fresh.clone());
        trace!(source = %sym, fresh = %fresh, "minted specialization");
        Demand {
            sym: fresh,
            minted: true,
        }
    }

    /// Enqueue a specialization for the next wave.
    pub fn enqueue(&self, item: WorkItem) {
        self.pending.push(item);
    }

    /// Atomically snapshot and clear the pending queue.
    pub fn drain(&self) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(self.pending.len());
        while let Some(item) = self.pending.pop() {
            items.push(item);
        }
        items
    }

    pub fn pending_is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Record a finished specialization. Called exactly once per fresh
    /// symbol; the worker that minted the symbol owns the insertion.
    pub fn insert_specialized(&self, def: Def) {
        let mut tables = self.tables.lock();
        let previous = tables.specialized.insert(def.sym.clone(), def);
        debug_assert!(previous.is_none(), "specialization inserted twice");
    }

    /// Mint a fresh local variable symbol.
    pub fn fresh_var_sym(&self, sym: &VarSym) -> VarSym {
        self.symbols.fresh_var_sym(sym)
    }

    pub fn memo_len(&self) -> usize {
        self.tables.lock().def_to_def.len()
    }

    pub fn store_len(&self) -> usize {
        self.tables.lock().specialized.len()
    }

    /// Consume the registry, yielding the specialized definitions.
    pub fn into_defs(self) -> FxHashMap<DefnSym, Def> {
        self.tables.into_inner().specialized
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::types::TypeCtor;

    fn sym(name: &str) -> DefnSym {
        DefnSym::new(vec![], name)
    }

    fn int32() -> Type {
        Type::cst(TypeCtor::Int32, Span::default())
    }

    fn bool_t() -> Type {
        Type::cst(TypeCtor::Bool, Span::default())
    }

    #[test]
    fn test_demand_is_memoized() {
        let reg = Registry::new();
        let id = sym("id");

        let first = reg.lookup_or_mint(&id, &int32());
        assert!(first.minted);

        let second = reg.lookup_or_mint(&id, &int32());
        assert!(!second.minted);
        assert_eq!(first.sym, second.sym);
        assert_eq!(reg.memo_len(), 1);
    }

    #[test]
    fn test_distinct_types_mint_distinct_symbols() {
        let reg = Registry::new();
        let id = sym("id");

        let at_int = reg.lookup_or_mint(&id, &int32());
        let at_bool = reg.lookup_or_mint(&id, &bool_t());
        assert!(at_int.minted);
        assert!(at_bool.minted);
        assert_ne!(at_int.sym, at_bool.sym);
        assert_eq!(reg.memo_len(), 2);
    }

    #[test]
    fn test_concurrent_demand_mints_exactly_once() {
        use std::sync::Arc;

        let reg = Arc::new(Registry::new());
        let id = sym("id");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                let id = id.clone();
                std::thread::spawn(move || reg.lookup_or_mint(&id, &int32()))
            })
            .collect();

        let demands: Vec<Demand> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let minted = demands.iter().filter(|d| d.minted).count();
        assert_eq!(minted, 1);

        let winner = &demands.iter().find(|d| d.minted).unwrap().sym;
        assert!(demands.iter().all(|d| &d.sym == winner));
        assert_eq!(reg.memo_len(), 1);
    }

    #[test]
    fn test_drain_empties_the_queue() {
        let reg = Registry::new();
        assert!(reg.pending_is_empty());
        assert!(reg.drain().is_empty());
    }
}
