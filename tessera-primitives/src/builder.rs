//! Incremental assembly of consistent transactions.
//!
//! Every value edge exists twice, once from each end, and identifiers depend
//! on body content, so wiring a graph by hand means computing ids in
//! dependency order and back-filling witness edges afterwards. The builder
//! does that bookkeeping: add value-creating entries first, route their
//! value forward, then seal the header.

use crate::model::*;
use crate::tx::{GraphError, Transaction};
use std::collections::HashMap;
use tessera_codec::utils::Bytes;
use tessera_crypto::hash::Hash;

pub struct TxBuilder {
    version: u64,
    min_time_ms: u64,
    max_time_ms: u64,
    data: Hash<32>,
    entries: Vec<Entry>,
    index: HashMap<EntryId, usize>,
    results: Vec<EntryId>,
}

impl TxBuilder {
    pub fn new(min_time_ms: u64, max_time_ms: u64) -> Self {
        TxBuilder {
            version: 1,
            min_time_ms,
            max_time_ms,
            data: ZERO_HASH,
            entries: Vec::new(),
            index: HashMap::new(),
            results: Vec::new(),
        }
    }

    /// Overrides the version stamped into the header.
    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Sets the header data commitment.
    pub fn header_data(mut self, data: Hash<32>) -> Self {
        self.data = data;
        self
    }

    fn push(&mut self, entry: Entry) -> EntryId {
        let id = entry.id();
        self.index.insert(id, self.entries.len());
        self.entries.push(entry);
        id
    }

    fn entry_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        let slot = *self.index.get(id)?;
        self.entries.get_mut(slot)
    }

    /// Next open forward slot of a value-producing entry. Reserved eagerly
    /// on a mux so consecutive consumers line up.
    fn reserve_slot(&mut self, upstream: &EntryId) -> u64 {
        match self.entry_mut(upstream) {
            Some(Entry::Mux(mux)) => {
                mux.witness.destinations.push(ValueDestination::default());
                (mux.witness.destinations.len() - 1) as u64
            }
            _ => 0,
        }
    }

    fn fill_slot(&mut self, upstream: &EntryId, slot: u64, destination: ValueDestination) {
        match self.entry_mut(upstream) {
            Some(Entry::Issuance(issuance)) => issuance.witness.destination = destination,
            Some(Entry::Spend(spend)) => spend.witness.destination = destination,
            Some(Entry::Mux(mux)) => mux.witness.destinations[slot as usize] = destination,
            _ => (),
        }
    }

    /// Adds a time range entry.
    pub fn time_range(&mut self, min_time_ms: u64, max_time_ms: u64) -> EntryId {
        self.push(Entry::TimeRange(TimeRange {
            min_time_ms,
            max_time_ms,
            ext_hash: ZERO_HASH,
        }))
    }

    /// Adds a nonce running `program` within `time_range`. The nonce's
    /// issuance back-pointer is filled in by [`TxBuilder::issue`].
    pub fn nonce(&mut self, program: Program, time_range: EntryId) -> EntryId {
        self.push(Entry::Nonce(Nonce {
            body: NonceBody {
                program,
                time_range,
                ext_hash: ZERO_HASH,
            },
            witness: NonceWitness::default(),
        }))
    }

    /// Adds an issuance of `amount` units of the defined asset, anchored at
    /// `anchor`. A nonce anchor added earlier is pointed back at this
    /// issuance.
    pub fn issue(
        &mut self,
        anchor: EntryId,
        definition: AssetDefinition,
        amount: u64,
        arguments: Vec<Bytes>,
    ) -> EntryId {
        let value = AssetAmount {
            asset_id: definition.asset_id(),
            amount,
        };
        let id = self.push(Entry::Issuance(Issuance {
            body: IssuanceBody {
                anchor,
                value,
                data: ZERO_HASH,
                ext_hash: ZERO_HASH,
            },
            witness: IssuanceWitness {
                destination: ValueDestination::default(),
                asset_definition: definition,
                arguments,
            },
        }));
        if let Some(Entry::Nonce(nonce)) = self.entry_mut(&anchor) {
            nonce.witness.issuance = id;
        }
        id
    }

    /// Adds a spend of `previous`, including the spent output itself for
    /// closure. The spend forwards exactly the spent value.
    pub fn spend(&mut self, previous: Output, arguments: Vec<Bytes>) -> EntryId {
        let previous_id = self.push(Entry::Output(previous));
        self.push(Entry::Spend(Spend {
            body: SpendBody {
                spent_output: previous_id,
                data: ZERO_HASH,
                ext_hash: ZERO_HASH,
            },
            witness: SpendWitness {
                destination: ValueDestination::default(),
                arguments,
            },
        }))
    }

    /// Adds a mux drawing the given values out of earlier entries.
    pub fn mux(
        &mut self,
        sources: Vec<(EntryId, AssetAmount)>,
        program: Program,
        arguments: Vec<Bytes>,
    ) -> EntryId {
        let mut wired = Vec::with_capacity(sources.len());
        let mut slots = Vec::with_capacity(sources.len());
        for (upstream, value) in &sources {
            let slot = self.reserve_slot(upstream);
            slots.push(slot);
            wired.push(ValueSource {
                ref_id: *upstream,
                value: *value,
                position: slot,
            });
        }
        let id = self.push(Entry::Mux(Mux {
            body: MuxBody {
                sources: wired,
                program,
                ext_hash: ZERO_HASH,
            },
            witness: MuxWitness {
                destinations: Vec::new(),
                arguments,
            },
        }));
        for (index, (&(upstream, value), slot)) in sources.iter().zip(slots).enumerate() {
            self.fill_slot(
                &upstream,
                slot,
                ValueDestination {
                    ref_id: id,
                    value,
                    position: index as u64,
                },
            );
        }
        id
    }

    /// Adds an output taking `value` from `source`, locked under
    /// `control_program` and listed as a header result.
    pub fn output(
        &mut self,
        source: EntryId,
        value: AssetAmount,
        control_program: Program,
    ) -> EntryId {
        let slot = self.reserve_slot(&source);
        let id = self.push(Entry::Output(Output {
            source: ValueSource {
                ref_id: source,
                value,
                position: slot,
            },
            control_program,
            data: ZERO_HASH,
            ext_hash: ZERO_HASH,
        }));
        self.results.push(id);
        self.fill_slot(
            &source,
            slot,
            ValueDestination {
                ref_id: id,
                value,
                position: 0,
            },
        );
        id
    }

    /// Adds a retirement burning `value` drawn from `source`, listed as a
    /// header result.
    pub fn retire(&mut self, source: EntryId, value: AssetAmount) -> EntryId {
        let slot = self.reserve_slot(&source);
        let id = self.push(Entry::Retirement(Retirement {
            source: ValueSource {
                ref_id: source,
                value,
                position: slot,
            },
            data: ZERO_HASH,
            ext_hash: ZERO_HASH,
        }));
        self.results.push(id);
        self.fill_slot(
            &source,
            slot,
            ValueDestination {
                ref_id: id,
                value,
                position: 0,
            },
        );
        id
    }

    /// The assembled header and entries, for callers that post-process
    /// before sealing.
    pub fn into_parts(self) -> (TxHeader, Vec<Entry>) {
        let header = TxHeader {
            version: self.version,
            results: self.results,
            data: self.data,
            min_time_ms: self.min_time_ms,
            max_time_ms: self.max_time_ms,
            ext_hash: ZERO_HASH,
        };
        (header, self.entries)
    }

    /// Seals the transaction.
    pub fn build(self) -> Result<Transaction, GraphError> {
        let (header, entries) = self.into_parts();
        Transaction::new(header, entries)
    }
}
