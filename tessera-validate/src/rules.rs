//! Per-entry validation rules over the transaction graph.
//!
//! Validation walks the graph from the header, recursing along backward
//! edges (results, value sources, issuance anchors, nonce time ranges).
//! Forward edges are checked for agreement with their backward twin but are
//! never recursed into; together with the memo set this terminates on any
//! input, including adversarially cyclic ones. Each entry is validated at
//! most once per transaction no matter its in-degree.

use std::collections::{HashMap, HashSet};

use tessera_primitives::{
    AssetId, Entry, EntryId, Hash, Issuance, Mux, Nonce, Program, SourceNode, Spend, TimeRange,
    Transaction, TxHeader, ValueDestination, ValueSource,
};
use tessera_primitives::{Bytes, DestNode, ResolveError};
use tracing::{debug, warn};

use crate::utils::{
    ExtensionError::NonZeroExtHash,
    IssuanceAnchorError::{AnchorMismatch, AssetDefinitionMismatch, IssuanceNotReachable},
    ProgramValidator,
    ProgramError::{Unsatisfied, UnsupportedVmVersion},
    StructuralError::{BadVersion, EmptyResults, MissingEntry},
    TimeRangeError::{MaxtimeBelowHeader, MintimeAboveHeader},
    TxContext, TypeError,
    TypeError::{NotAResult, NotATimeRange, NotAnIssuance, NotAnOutput, NotAnAnchor},
    ValidationError, ValidationFailure, ValidationResult,
    ValueFlowError::{PositionMismatch, PositionOutOfRange, RefMismatch, ValueMismatch},
    ConservationError::{Overflow, UnbalancedAsset},
};

/// The transaction version this implementation knows.
const TX_VERSION: u64 = 1;

/// Largest representable amount: 2^63 − 1.
const AMOUNT_LIMIT: u64 = u64::MAX >> 1;

/// Judge a transaction graph. Pure: same graph, same verdict, regardless of
/// chain state or timing.
pub fn validate_tx(tx: &Transaction, vm: &dyn ProgramValidator) -> ValidationResult {
    let mut checker = Checker::new(tx, vm);
    match checker.entry(&tx.id()) {
        Ok(()) => {
            debug!(tx = %tx.id(), "transaction accepted");
            Ok(())
        }
        Err(failure) => {
            warn!(tx = %tx.id(), %failure, "transaction rejected");
            Err(failure)
        }
    }
}

struct Checker<'a> {
    tx: &'a Transaction,
    vm: &'a dyn ProgramValidator,
    reachable: HashSet<EntryId>,
    validated: HashSet<EntryId>,
    trace: Vec<EntryId>,
}

impl<'a> Checker<'a> {
    fn new(tx: &'a Transaction, vm: &'a dyn ProgramValidator) -> Self {
        Checker {
            tx,
            vm,
            reachable: tx.reachable().into_iter().collect(),
            validated: HashSet::new(),
            trace: Vec::new(),
        }
    }

    fn fail(&self, error: impl Into<ValidationError>) -> ValidationFailure {
        ValidationFailure {
            error: error.into(),
            trace: self.trace.clone(),
        }
    }

    /// Unwrap a typed lookup, blaming the pointer on failure.
    fn resolved<T>(
        &mut self,
        id: &EntryId,
        resolution: Result<T, ResolveError>,
        wrong_kind: TypeError,
    ) -> Result<T, ValidationFailure> {
        match resolution {
            Ok(node) => Ok(node),
            Err(ResolveError::Missing) => {
                self.trace.push(*id);
                Err(self.fail(MissingEntry))
            }
            Err(ResolveError::WrongKind) => {
                self.trace.push(*id);
                Err(self.fail(wrong_kind))
            }
        }
    }

    /// Validate the entry behind `id`, at most once.
    ///
    /// The id is marked before descending, so an entry referenced again
    /// while in flight is not re-entered.
    fn entry(&mut self, id: &EntryId) -> ValidationResult {
        if !self.validated.insert(*id) {
            return Ok(());
        }
        self.trace.push(*id);
        let tx = self.tx;
        let entry = match tx.entry(id) {
            Some(entry) => entry,
            None => return Err(self.fail(MissingEntry)),
        };
        self.ext_hash(entry.ext_hash())?;
        match entry {
            Entry::TxHeader(header) => self.header(header)?,
            Entry::Output(output) => self.value_source(id, &output.source, 0)?,
            Entry::Retirement(retirement) => self.value_source(id, &retirement.source, 0)?,
            Entry::Spend(spend) => self.spend(id, spend)?,
            Entry::Issuance(issuance) => self.issuance(id, issuance)?,
            Entry::Nonce(nonce) => self.nonce(id, nonce)?,
            Entry::TimeRange(range) => self.time_range(range)?,
            Entry::Mux(mux) => self.mux(id, mux)?,
        }
        self.trace.pop();
        Ok(())
    }

    /// At a known version every extension hash must still be blank.
    fn ext_hash(&self, ext: &Hash<32>) -> ValidationResult {
        if self.tx.header().version == TX_VERSION && !ext.is_zero() {
            return Err(self.fail(NonZeroExtHash));
        }
        Ok(())
    }

    fn header(&mut self, header: &TxHeader) -> ValidationResult {
        let tx = self.tx;
        if header.version != TX_VERSION {
            return Err(self.fail(BadVersion));
        }
        if header.results.is_empty() {
            return Err(self.fail(EmptyResults));
        }
        for result in &header.results {
            match tx.entry(result) {
                None => {
                    self.trace.push(*result);
                    return Err(self.fail(MissingEntry));
                }
                Some(Entry::Output(_) | Entry::Retirement(_)) => (),
                Some(_) => {
                    self.trace.push(*result);
                    return Err(self.fail(NotAResult));
                }
            }
            self.entry(result)?;
        }
        Ok(())
    }

    fn spend(&mut self, id: &EntryId, spend: &Spend) -> ValidationResult {
        let tx = self.tx;
        // presence only: the spent output was judged when it was created
        let spent = self.resolved(
            &spend.body.spent_output,
            tx.output(&spend.body.spent_output),
            NotAnOutput,
        )?;
        self.program(*id, &spent.control_program, &spend.witness.arguments)?;
        if spent.source.value != spend.witness.destination.value {
            return Err(self.fail(ValueMismatch));
        }
        self.value_destination(id, &spend.witness.destination, 0)
    }

    fn issuance(&mut self, id: &EntryId, issuance: &Issuance) -> ValidationResult {
        let tx = self.tx;
        let witness = &issuance.witness;
        if witness.asset_definition.asset_id() != issuance.body.value.asset_id {
            return Err(self.fail(AssetDefinitionMismatch));
        }
        self.program(
            *id,
            &witness.asset_definition.issuance_program,
            &witness.arguments,
        )?;
        self.resolved(
            &issuance.body.anchor,
            tx.anchor_node(&issuance.body.anchor),
            NotAnAnchor,
        )?;
        self.entry(&issuance.body.anchor)?;
        if witness.destination.value != issuance.body.value {
            return Err(self.fail(ValueMismatch));
        }
        self.value_destination(id, &witness.destination, 0)
    }

    fn nonce(&mut self, id: &EntryId, nonce: &Nonce) -> ValidationResult {
        let tx = self.tx;
        self.program(*id, &nonce.body.program, &nonce.witness.arguments)?;
        let issuance = self.resolved(
            &nonce.witness.issuance,
            tx.issuance(&nonce.witness.issuance),
            NotAnIssuance,
        )?;
        if !self.reachable.contains(&nonce.witness.issuance) {
            return Err(self.fail(IssuanceNotReachable));
        }
        if issuance.body.anchor != *id {
            return Err(self.fail(AnchorMismatch));
        }
        self.resolved(
            &nonce.body.time_range,
            tx.timerange(&nonce.body.time_range),
            NotATimeRange,
        )?;
        self.entry(&nonce.body.time_range)
    }

    /// A nonce's time range must cover the whole header window.
    fn time_range(&mut self, range: &TimeRange) -> ValidationResult {
        let header = self.tx.header();
        if range.min_time_ms > header.min_time_ms {
            return Err(self.fail(MintimeAboveHeader));
        }
        if range.max_time_ms != 0 && range.max_time_ms < header.max_time_ms {
            return Err(self.fail(MaxtimeBelowHeader));
        }
        Ok(())
    }

    fn mux(&mut self, id: &EntryId, mux: &Mux) -> ValidationResult {
        self.program(*id, &mux.body.program, &mux.witness.arguments)?;
        for (index, source) in mux.body.sources.iter().enumerate() {
            self.value_source(id, source, index as u64)?;
        }
        for (index, destination) in mux.witness.destinations.iter().enumerate() {
            self.value_destination(id, destination, index as u64)?;
        }
        self.conservation(mux)
    }

    /// Run a program under the injected machine. Versions above the known
    /// one are only meaningful in transactions of a later version.
    fn program(&self, entry_id: EntryId, program: &Program, arguments: &[Bytes]) -> ValidationResult {
        if program.vm_version != 1 {
            if program.vm_version > 1 && self.tx.header().version > TX_VERSION {
                return Ok(());
            }
            return Err(self.fail(UnsupportedVmVersion));
        }
        let context = TxContext::new(entry_id, self.tx);
        if !self.vm.verify_program(program, arguments, &context) {
            return Err(self.fail(Unsatisfied));
        }
        Ok(())
    }

    /// The backward half of an edge: resolve it, find its forward twin by
    /// position, require both ends to agree, then validate the upstream
    /// entry.
    fn value_source(
        &mut self,
        entry_id: &EntryId,
        source: &ValueSource,
        holder_position: u64,
    ) -> ValidationResult {
        let tx = self.tx;
        let node = self.resolved(
            &source.ref_id,
            tx.source_node(&source.ref_id),
            TypeError::NotASource,
        )?;
        let forward = match node {
            SourceNode::Issuance(issuance) => {
                if source.position != 0 {
                    return Err(self.fail(PositionOutOfRange));
                }
                &issuance.witness.destination
            }
            SourceNode::Spend(spend) => {
                if source.position != 0 {
                    return Err(self.fail(PositionOutOfRange));
                }
                &spend.witness.destination
            }
            SourceNode::Mux(mux) => {
                match mux.witness.destinations.get(source.position as usize) {
                    Some(forward) => forward,
                    None => return Err(self.fail(PositionOutOfRange)),
                }
            }
        };
        if forward.ref_id != *entry_id {
            return Err(self.fail(RefMismatch));
        }
        if forward.position != holder_position {
            return Err(self.fail(PositionMismatch));
        }
        if forward.value != source.value {
            return Err(self.fail(ValueMismatch));
        }
        self.entry(&source.ref_id)
    }

    /// The forward half of an edge: same agreement checks against the
    /// backward twin, but no recursion. The entry it points at is judged
    /// through its own path from the header.
    fn value_destination(
        &mut self,
        entry_id: &EntryId,
        destination: &ValueDestination,
        holder_position: u64,
    ) -> ValidationResult {
        let tx = self.tx;
        let node = self.resolved(
            &destination.ref_id,
            tx.dest_node(&destination.ref_id),
            TypeError::NotADestination,
        )?;
        let backward = match node {
            DestNode::Output(output) => {
                if destination.position != 0 {
                    return Err(self.fail(PositionOutOfRange));
                }
                &output.source
            }
            DestNode::Retirement(retirement) => {
                if destination.position != 0 {
                    return Err(self.fail(PositionOutOfRange));
                }
                &retirement.source
            }
            DestNode::Mux(mux) => match mux.body.sources.get(destination.position as usize) {
                Some(backward) => backward,
                None => return Err(self.fail(PositionOutOfRange)),
            },
        };
        if backward.ref_id != *entry_id {
            return Err(self.fail(RefMismatch));
        }
        if backward.position != holder_position {
            return Err(self.fail(PositionMismatch));
        }
        if backward.value != destination.value {
            return Err(self.fail(ValueMismatch));
        }
        Ok(())
    }

    /// Per asset, what flows into a mux flows out of it, and both sums stay
    /// within 63 bits.
    fn conservation(&mut self, mux: &Mux) -> ValidationResult {
        let mut balance: HashMap<AssetId, (u64, u64)> = HashMap::new();
        for source in &mux.body.sources {
            let slot = balance.entry(source.value.asset_id).or_default();
            slot.0 = match slot.0.checked_add(source.value.amount) {
                Some(sum) if sum <= AMOUNT_LIMIT => sum,
                _ => return Err(self.fail(Overflow)),
            };
        }
        for destination in &mux.witness.destinations {
            let slot = balance.entry(destination.value.asset_id).or_default();
            slot.1 = match slot.1.checked_add(destination.value.amount) {
                Some(sum) if sum <= AMOUNT_LIMIT => sum,
                _ => return Err(self.fail(Overflow)),
            };
        }
        if balance.values().any(|(sourced, routed)| sourced != routed) {
            return Err(self.fail(UnbalancedAsset));
        }
        Ok(())
    }
}
