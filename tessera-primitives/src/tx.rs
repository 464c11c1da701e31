//! Transactions as content-addressed entry graphs.

use crate::model::{
    Entry, EntryId, Issuance, Mux, Nonce, Output, Retirement, Spend, TimeRange, TxHeader,
};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Graph assembly failure.
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    #[error("two distinct entries hash to {0}")]
    DuplicateEntry(EntryId),
}

/// Why a typed entry lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// No entry under that id.
    Missing,
    /// An entry exists but is not one of the allowed kinds.
    WrongKind,
}

/// Entry kinds a value source may point back at.
#[derive(Debug, Clone, Copy)]
pub enum SourceNode<'a> {
    Issuance(&'a Issuance),
    Spend(&'a Spend),
    Mux(&'a Mux),
}

/// Entry kinds a value destination may point at.
#[derive(Debug, Clone, Copy)]
pub enum DestNode<'a> {
    Output(&'a Output),
    Retirement(&'a Retirement),
    Mux(&'a Mux),
}

/// Entry kinds an issuance may anchor at.
#[derive(Debug, Clone, Copy)]
pub enum AnchorNode<'a> {
    Nonce(&'a Nonce),
    Spend(&'a Spend),
}

/// An immutable set of entries addressed by id, rooted at a header.
///
/// Assembly only guards identity (no two distinct entries under one id);
/// everything else about the graph is judged by validation.
#[derive(Debug, Clone)]
pub struct Transaction {
    header_id: EntryId,
    entries: HashMap<EntryId, Entry>,
}

impl Transaction {
    pub fn new(header: TxHeader, entries: Vec<Entry>) -> Result<Self, GraphError> {
        let header_id = header.id();
        let mut map = HashMap::new();
        map.insert(header_id, Entry::TxHeader(header));
        for entry in entries {
            let id = entry.id();
            if let Some(existing) = map.get(&id) {
                if *existing != entry {
                    return Err(GraphError::DuplicateEntry(id));
                }
                continue;
            }
            map.insert(id, entry);
        }
        Ok(Transaction {
            header_id,
            entries: map,
        })
    }

    /// The transaction id: the id of the header entry.
    pub fn id(&self) -> EntryId {
        self.header_id
    }

    pub fn header(&self) -> &TxHeader {
        match &self.entries[&self.header_id] {
            Entry::TxHeader(header) => header,
            // the constructor stores the header under its own id
            _ => unreachable!("header id resolves to a header"),
        }
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source_node(&self, id: &EntryId) -> Result<SourceNode<'_>, ResolveError> {
        match self.entry(id) {
            None => Err(ResolveError::Missing),
            Some(Entry::Issuance(issuance)) => Ok(SourceNode::Issuance(issuance)),
            Some(Entry::Spend(spend)) => Ok(SourceNode::Spend(spend)),
            Some(Entry::Mux(mux)) => Ok(SourceNode::Mux(mux)),
            Some(_) => Err(ResolveError::WrongKind),
        }
    }

    pub fn dest_node(&self, id: &EntryId) -> Result<DestNode<'_>, ResolveError> {
        match self.entry(id) {
            None => Err(ResolveError::Missing),
            Some(Entry::Output(output)) => Ok(DestNode::Output(output)),
            Some(Entry::Retirement(retirement)) => Ok(DestNode::Retirement(retirement)),
            Some(Entry::Mux(mux)) => Ok(DestNode::Mux(mux)),
            Some(_) => Err(ResolveError::WrongKind),
        }
    }

    pub fn anchor_node(&self, id: &EntryId) -> Result<AnchorNode<'_>, ResolveError> {
        match self.entry(id) {
            None => Err(ResolveError::Missing),
            Some(Entry::Nonce(nonce)) => Ok(AnchorNode::Nonce(nonce)),
            Some(Entry::Spend(spend)) => Ok(AnchorNode::Spend(spend)),
            Some(_) => Err(ResolveError::WrongKind),
        }
    }

    pub fn output(&self, id: &EntryId) -> Result<&Output, ResolveError> {
        match self.entry(id) {
            None => Err(ResolveError::Missing),
            Some(Entry::Output(output)) => Ok(output),
            Some(_) => Err(ResolveError::WrongKind),
        }
    }

    pub fn timerange(&self, id: &EntryId) -> Result<&TimeRange, ResolveError> {
        match self.entry(id) {
            None => Err(ResolveError::Missing),
            Some(Entry::TimeRange(range)) => Ok(range),
            Some(_) => Err(ResolveError::WrongKind),
        }
    }

    pub fn issuance(&self, id: &EntryId) -> Result<&Issuance, ResolveError> {
        match self.entry(id) {
            None => Err(ResolveError::Missing),
            Some(Entry::Issuance(issuance)) => Ok(issuance),
            Some(_) => Err(ResolveError::WrongKind),
        }
    }

    /// The entries visitable from the header, in deterministic breadth-first
    /// order. Dangling pointers are skipped here and reported by validation;
    /// entries outside the closure are permitted and ignored.
    pub fn reachable(&self) -> Vec<EntryId> {
        let mut order = Vec::new();
        let mut seen: HashSet<EntryId> = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(self.header_id);
        queue.push_back(self.header_id);
        while let Some(id) = queue.pop_front() {
            let entry = match self.entry(&id) {
                Some(entry) => entry,
                None => continue,
            };
            order.push(id);
            for next in entry.references() {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        order
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use tessera_codec::utils::Bytes;
    use tessera_crypto::hash::Hash;

    fn header(results: Vec<EntryId>) -> TxHeader {
        TxHeader {
            version: 1,
            results,
            data: ZERO_HASH,
            min_time_ms: 0,
            max_time_ms: 0,
            ext_hash: ZERO_HASH,
        }
    }

    fn spend(previous: EntryId) -> Spend {
        Spend {
            body: SpendBody {
                spent_output: previous,
                data: ZERO_HASH,
                ext_hash: ZERO_HASH,
            },
            witness: SpendWitness::default(),
        }
    }

    fn output(source_ref: EntryId) -> Output {
        Output {
            source: ValueSource {
                ref_id: source_ref,
                value: AssetAmount {
                    asset_id: Hash::new([0x22; 32]),
                    amount: 7,
                },
                position: 0,
            },
            control_program: Program {
                script: Bytes::from(&[0x51]),
                vm_version: 1,
            },
            data: ZERO_HASH,
            ext_hash: ZERO_HASH,
        }
    }

    #[test]
    fn identical_entries_collapse() {
        let spend = spend(Hash::new([0x10; 32]));
        let out = output(spend.id());
        let tx = Transaction::new(
            header(vec![out.id()]),
            vec![out.clone().into(), out.into(), spend.into()],
        )
        .unwrap();
        assert_eq!(tx.len(), 3);
    }

    #[test]
    fn colliding_entries_are_fatal() {
        let body = SpendBody {
            spent_output: Hash::new([0x10; 32]),
            data: ZERO_HASH,
            ext_hash: ZERO_HASH,
        };
        let bare = Spend {
            body: body.clone(),
            witness: SpendWitness::default(),
        };
        let satisfied = Spend {
            body,
            witness: SpendWitness {
                destination: ValueDestination::default(),
                arguments: vec![Bytes::from(&[0x01])],
            },
        };
        // same body, different witness: same id, distinct entries
        let result = Transaction::new(
            header(vec![bare.id()]),
            vec![bare.into(), satisfied.into()],
        );
        assert!(matches!(result, Err(GraphError::DuplicateEntry(_))));
    }

    #[test]
    fn reachability_spans_spent_outputs_but_not_strays() {
        let previous = output(Hash::new([0x01; 32]));
        let spend = spend(previous.id());
        let out = output(spend.id());
        let stray = output(Hash::new([0x02; 32]));
        let tx = Transaction::new(
            header(vec![out.id()]),
            vec![
                previous.clone().into(),
                spend.clone().into(),
                out.clone().into(),
                stray.clone().into(),
            ],
        )
        .unwrap();

        let reachable = tx.reachable();
        assert!(reachable.contains(&previous.id()));
        assert!(reachable.contains(&spend.id()));
        assert!(reachable.contains(&out.id()));
        assert!(!reachable.contains(&stray.id()));
        // breadth-first from the header
        assert_eq!(reachable[0], tx.id());
    }

    #[test]
    fn typed_lookups_discriminate() {
        let spend = spend(Hash::new([0x10; 32]));
        let out = output(spend.id());
        let tx = Transaction::new(
            header(vec![out.id()]),
            vec![spend.clone().into(), out.clone().into()],
        )
        .unwrap();

        assert!(matches!(tx.source_node(&spend.id()), Ok(SourceNode::Spend(_))));
        assert!(matches!(tx.dest_node(&out.id()), Ok(DestNode::Output(_))));
        assert_eq!(tx.output(&spend.id()), Err(ResolveError::WrongKind));
        assert_eq!(
            tx.timerange(&Hash::new([0x77; 32])),
            Err(ResolveError::Missing)
        );
    }
}
