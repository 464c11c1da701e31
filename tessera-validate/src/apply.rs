//! Applying accepted transactions to chain state.
//!
//! The delta is derived from the reachable closure in one pass: spends
//! remove their spent output, header results add the new outputs, nonces
//! are marked consumed. Everything lands atomically behind the
//! [`ChainState`] seam or not at all.

use tessera_primitives::{Entry, EntryId, Transaction};
use tracing::debug;

use crate::rules;
use crate::utils::{
    Environment, ProgramValidator,
    StateError::{AfterMaxtime, BeforeMintime, DuplicateNonce, MissingUtxo},
    ValidationError, ValidationFailure, ValidationResult,
};

/// The persistence seam: the UTXO set, the consumed-nonce set and a
/// transaction scope. Serialization across callers is the implementation's
/// business; a single validate-plus-apply pair must observe one consistent
/// snapshot.
pub trait ChainState {
    fn contains_utxo(&self, id: &EntryId) -> bool;
    fn insert_utxo(&mut self, id: EntryId);
    fn remove_utxo(&mut self, id: &EntryId) -> bool;
    fn contains_nonce(&self, id: &EntryId) -> bool;
    fn insert_nonce(&mut self, id: EntryId);
    fn commit(&mut self);
    fn rollback(&mut self);
}

fn reject(error: impl Into<ValidationError>, at: EntryId) -> ValidationFailure {
    ValidationFailure {
        error: error.into(),
        trace: vec![at],
    }
}

/// Apply an accepted transaction's effects. All or nothing: any failure
/// rolls the state scope back and reports the offending entry.
pub fn apply_tx(
    tx: &Transaction,
    state: &mut impl ChainState,
    env: &Environment,
) -> ValidationResult {
    let header = tx.header();
    if header.min_time_ms != 0 && header.min_time_ms >= env.block_time_ms {
        state.rollback();
        return Err(reject(BeforeMintime, tx.id()));
    }
    if header.max_time_ms != 0 && header.max_time_ms <= env.block_time_ms {
        state.rollback();
        return Err(reject(AfterMaxtime, tx.id()));
    }

    for id in tx.reachable() {
        let entry = match tx.entry(&id) {
            Some(entry) => entry,
            None => continue,
        };
        match entry {
            Entry::Spend(spend) => {
                if !state.remove_utxo(&spend.body.spent_output) {
                    state.rollback();
                    return Err(reject(MissingUtxo, id));
                }
            }
            Entry::Nonce(_) => {
                if state.contains_nonce(&id) {
                    state.rollback();
                    return Err(reject(DuplicateNonce, id));
                }
                state.insert_nonce(id);
            }
            _ => (),
        }
    }

    // only outputs the header lists come into existence; outputs that ride
    // along as spend targets were created by an earlier transaction
    for result in &tx.header().results {
        if let Some(Entry::Output(_)) = tx.entry(result) {
            state.insert_utxo(*result);
        }
    }

    state.commit();
    debug!(tx = %tx.id(), "transaction applied");
    Ok(())
}

/// The full acceptance pipeline: judge the graph, then apply its delta
/// inside the chain-state scope.
pub fn validate_and_apply(
    tx: &Transaction,
    vm: &dyn ProgramValidator,
    state: &mut impl ChainState,
    env: &Environment,
) -> ValidationResult {
    rules::validate_tx(tx, vm)?;
    apply_tx(tx, state, env)
}

/// In-memory [`ChainState`] with an undo log, for tests and scratch
/// pipelines.
#[derive(Debug, Default, Clone)]
pub struct MemoryChainState {
    utxos: std::collections::HashSet<EntryId>,
    nonces: std::collections::HashSet<EntryId>,
    undo: Vec<Undo>,
}

#[derive(Debug, Clone)]
enum Undo {
    UtxoInserted(EntryId),
    UtxoRemoved(EntryId),
    NonceInserted(EntryId),
}

impl MemoryChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an unspent output without going through a transaction.
    pub fn with_utxo(mut self, id: EntryId) -> Self {
        self.utxos.insert(id);
        self
    }
}

impl ChainState for MemoryChainState {
    fn contains_utxo(&self, id: &EntryId) -> bool {
        self.utxos.contains(id)
    }

    fn insert_utxo(&mut self, id: EntryId) {
        if self.utxos.insert(id) {
            self.undo.push(Undo::UtxoInserted(id));
        }
    }

    fn remove_utxo(&mut self, id: &EntryId) -> bool {
        let removed = self.utxos.remove(id);
        if removed {
            self.undo.push(Undo::UtxoRemoved(*id));
        }
        removed
    }

    fn contains_nonce(&self, id: &EntryId) -> bool {
        self.nonces.contains(id)
    }

    fn insert_nonce(&mut self, id: EntryId) {
        if self.nonces.insert(id) {
            self.undo.push(Undo::NonceInserted(id));
        }
    }

    fn commit(&mut self) {
        self.undo.clear();
    }

    fn rollback(&mut self) {
        while let Some(op) = self.undo.pop() {
            match op {
                Undo::UtxoInserted(id) => {
                    self.utxos.remove(&id);
                }
                Undo::UtxoRemoved(id) => {
                    self.utxos.insert(id);
                }
                Undo::NonceInserted(id) => {
                    self.nonces.remove(&id);
                }
            }
        }
    }
}
