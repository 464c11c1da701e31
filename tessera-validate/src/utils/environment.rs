//! Execution context injected into validation and state application.

use serde::{Deserialize, Serialize};
use tessera_primitives::{Bytes, Entry, EntryId, Program, Transaction, TxHeader};

/// Block-level facts a transaction is judged against.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    /// Timestamp of the block the transaction would land in, in milliseconds.
    pub block_time_ms: u64,
}

/// Read access a program gets to the transaction under validation: the entry
/// whose program is running, the header and entry lookup. Nothing mutable
/// crosses this boundary.
pub struct TxContext<'a> {
    pub entry_id: EntryId,
    tx: &'a Transaction,
}

impl<'a> TxContext<'a> {
    pub fn new(entry_id: EntryId, tx: &'a Transaction) -> Self {
        TxContext { entry_id, tx }
    }

    pub fn header(&self) -> &TxHeader {
        self.tx.header()
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.tx.entry(id)
    }
}

/// The virtual machine seam. The core never links a concrete machine; block
/// processors inject one and tests inject stubs. Implementations are shared
/// across worker threads and must be reentrant.
pub trait ProgramValidator: Sync {
    fn verify_program(&self, program: &Program, arguments: &[Bytes], context: &TxContext) -> bool;
}
