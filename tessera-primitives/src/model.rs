//! The closed set of transaction entries and the value-flow edges between
//! them.
//!
//! Entry bodies carry the consensus content and are the only thing hashed
//! into an entry's id. Witnesses carry satisfaction data and may change
//! without changing identity.

use crate::crypto::entry_id;
use serde::{Deserialize, Serialize};
use tessera_codec::utils::Bytes;
use tessera_codec::{decode, encode, Decode, Decoder, Encode, Encoder};
use tessera_crypto::hash::Hash;

/// Content-addressed identifier of an entry.
pub type EntryId = Hash<32>;

/// Identifier of an asset: the hash of its definition.
pub type AssetId = Hash<32>;

/// The all-zero hash. Doubles as the nil pointer and as the only extension
/// hash value allowed at transaction version 1.
pub const ZERO_HASH: Hash<32> = Hash::new([0; 32]);

/// An amount of a single asset. Amounts never exceed 2^63−1.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub struct AssetAmount {
    pub asset_id: AssetId,
    pub amount: u64,
}

/// A predicate evaluated by the virtual machine of the given version.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Program {
    pub script: Bytes,
    pub vm_version: u64,
}

/// The issuance terms of an asset; its canonical encoding hashes to the
/// [`AssetId`].
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct AssetDefinition {
    pub initial_block_id: Hash<32>,
    pub data: Hash<32>,
    pub issuance_program: Program,
}

impl AssetDefinition {
    pub fn asset_id(&self) -> AssetId {
        tessera_crypto::hash::Hasher::<256>::hash_encodable(self)
    }
}

/// Backward edge: where an entry's value comes from. Points at an issuance,
/// spend or mux.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub struct ValueSource {
    pub ref_id: EntryId,
    pub value: AssetAmount,
    pub position: u64,
}

/// Forward edge: where an entry's value goes. Points at an output,
/// retirement or mux. Each forward edge mirrors a backward edge exactly, so
/// every link in the graph is locally checkable from either end.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub struct ValueDestination {
    pub ref_id: EntryId,
    pub value: AssetAmount,
    pub position: u64,
}

/// Root of a transaction. Its id is the transaction id.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TxHeader {
    pub version: u64,
    pub results: Vec<EntryId>,
    pub data: Hash<32>,
    pub min_time_ms: u64,
    pub max_time_ms: u64,
    pub ext_hash: Hash<32>,
}

/// Value locked under a control program, spendable in a later transaction.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Output {
    pub source: ValueSource,
    pub control_program: Program,
    pub data: Hash<32>,
    pub ext_hash: Hash<32>,
}

/// Value destroyed forever.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Retirement {
    pub source: ValueSource,
    pub data: Hash<32>,
    pub ext_hash: Hash<32>,
}

/// Consumes a previous output, forwarding its value.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Spend {
    pub body: SpendBody,
    pub witness: SpendWitness,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SpendBody {
    pub spent_output: EntryId,
    pub data: Hash<32>,
    pub ext_hash: Hash<32>,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SpendWitness {
    pub destination: ValueDestination,
    pub arguments: Vec<Bytes>,
}

/// Creates new units of an asset, anchored for uniqueness.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Issuance {
    pub body: IssuanceBody,
    pub witness: IssuanceWitness,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IssuanceBody {
    pub anchor: EntryId,
    pub value: AssetAmount,
    pub data: Hash<32>,
    pub ext_hash: Hash<32>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IssuanceWitness {
    pub destination: ValueDestination,
    pub asset_definition: AssetDefinition,
    pub arguments: Vec<Bytes>,
}

/// One-time anchor providing replay protection for an issuance.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Nonce {
    pub body: NonceBody,
    pub witness: NonceWitness,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NonceBody {
    pub program: Program,
    pub time_range: EntryId,
    pub ext_hash: Hash<32>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NonceWitness {
    pub arguments: Vec<Bytes>,
    pub issuance: EntryId,
}

impl Default for NonceWitness {
    fn default() -> Self {
        NonceWitness {
            arguments: Vec::new(),
            issuance: ZERO_HASH,
        }
    }
}

/// Time bounds a nonce is valid within, relative to the header's bounds.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeRange {
    pub min_time_ms: u64,
    pub max_time_ms: u64,
    pub ext_hash: Hash<32>,
}

/// Rebalances value across any number of sources and destinations under a
/// single program, conserving every asset.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Mux {
    pub body: MuxBody,
    pub witness: MuxWitness,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MuxBody {
    pub sources: Vec<ValueSource>,
    pub program: Program,
    pub ext_hash: Hash<32>,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct MuxWitness {
    pub destinations: Vec<ValueDestination>,
    pub arguments: Vec<Bytes>,
}

impl Default for ValueDestination {
    fn default() -> Self {
        ValueDestination {
            ref_id: ZERO_HASH,
            value: AssetAmount {
                asset_id: ZERO_HASH,
                amount: 0,
            },
            position: 0,
        }
    }
}

// ----- Canonical body encodings
//
// Struct fields concatenate in declared order; witnesses are never encoded.

impl Encode for AssetAmount {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.asset_id.encode(e)?;
        e.varint(self.amount)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for AssetAmount {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(AssetAmount {
            asset_id: d.hash()?.into(),
            amount: d.varint()?,
        })
    }
}

impl Encode for Program {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.script.encode(e)?;
        e.varint(self.vm_version)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for Program {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(Program {
            script: Bytes::decode(d)?,
            vm_version: d.varint()?,
        })
    }
}

impl Encode for AssetDefinition {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.initial_block_id.encode(e)?;
        self.data.encode(e)?;
        self.issuance_program.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for AssetDefinition {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(AssetDefinition {
            initial_block_id: d.hash()?.into(),
            data: d.hash()?.into(),
            issuance_program: Program::decode(d)?,
        })
    }
}

impl Encode for ValueSource {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.ref_id.encode(e)?;
        self.value.encode(e)?;
        e.varint(self.position)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for ValueSource {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(ValueSource {
            ref_id: d.hash()?.into(),
            value: AssetAmount::decode(d)?,
            position: d.varint()?,
        })
    }
}

impl Encode for TxHeader {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        e.varint(self.version)?.seq(&self.results)?;
        self.data.encode(e)?;
        e.varint(self.min_time_ms)?.varint(self.max_time_ms)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for TxHeader {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(TxHeader {
            version: d.varint()?,
            results: d.seq()?,
            data: d.hash()?.into(),
            min_time_ms: d.varint()?,
            max_time_ms: d.varint()?,
            ext_hash: d.hash()?.into(),
        })
    }
}

impl Encode for Output {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.source.encode(e)?;
        self.control_program.encode(e)?;
        self.data.encode(e)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for Output {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(Output {
            source: ValueSource::decode(d)?,
            control_program: Program::decode(d)?,
            data: d.hash()?.into(),
            ext_hash: d.hash()?.into(),
        })
    }
}

impl Encode for Retirement {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.source.encode(e)?;
        self.data.encode(e)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for Retirement {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(Retirement {
            source: ValueSource::decode(d)?,
            data: d.hash()?.into(),
            ext_hash: d.hash()?.into(),
        })
    }
}

impl Encode for SpendBody {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.spent_output.encode(e)?;
        self.data.encode(e)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for SpendBody {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(SpendBody {
            spent_output: d.hash()?.into(),
            data: d.hash()?.into(),
            ext_hash: d.hash()?.into(),
        })
    }
}

impl Encode for IssuanceBody {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.anchor.encode(e)?;
        self.value.encode(e)?;
        self.data.encode(e)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for IssuanceBody {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(IssuanceBody {
            anchor: d.hash()?.into(),
            value: AssetAmount::decode(d)?,
            data: d.hash()?.into(),
            ext_hash: d.hash()?.into(),
        })
    }
}

impl Encode for NonceBody {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        self.program.encode(e)?;
        self.time_range.encode(e)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for NonceBody {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(NonceBody {
            program: Program::decode(d)?,
            time_range: d.hash()?.into(),
            ext_hash: d.hash()?.into(),
        })
    }
}

impl Encode for TimeRange {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        e.varint(self.min_time_ms)?.varint(self.max_time_ms)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for TimeRange {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(TimeRange {
            min_time_ms: d.varint()?,
            max_time_ms: d.varint()?,
            ext_hash: d.hash()?.into(),
        })
    }
}

impl Encode for MuxBody {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        e.seq(&self.sources)?;
        self.program.encode(e)?;
        self.ext_hash.encode(e)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for MuxBody {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(MuxBody {
            sources: d.seq()?,
            program: Program::decode(d)?,
            ext_hash: d.hash()?.into(),
        })
    }
}

// ----- Identity

impl TxHeader {
    pub const TYPE: &'static str = "txheader";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, self)
    }
}

impl Output {
    pub const TYPE: &'static str = "output1";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, self)
    }
}

impl Retirement {
    pub const TYPE: &'static str = "retirement1";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, self)
    }
}

impl Spend {
    pub const TYPE: &'static str = "spend1";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, &self.body)
    }
}

impl Issuance {
    pub const TYPE: &'static str = "issuance1";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, &self.body)
    }
}

impl Nonce {
    pub const TYPE: &'static str = "nonce";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, &self.body)
    }
}

impl TimeRange {
    pub const TYPE: &'static str = "timerange";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, self)
    }
}

impl Mux {
    pub const TYPE: &'static str = "mux1";

    pub fn id(&self) -> EntryId {
        entry_id(Self::TYPE, &self.body)
    }
}

// ----- The closed entry sum

/// Any of the eight entry kinds.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Entry {
    TxHeader(TxHeader),
    Output(Output),
    Retirement(Retirement),
    Spend(Spend),
    Issuance(Issuance),
    Nonce(Nonce),
    TimeRange(TimeRange),
    Mux(Mux),
}

impl Entry {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Entry::TxHeader(_) => TxHeader::TYPE,
            Entry::Output(_) => Output::TYPE,
            Entry::Retirement(_) => Retirement::TYPE,
            Entry::Spend(_) => Spend::TYPE,
            Entry::Issuance(_) => Issuance::TYPE,
            Entry::Nonce(_) => Nonce::TYPE,
            Entry::TimeRange(_) => TimeRange::TYPE,
            Entry::Mux(_) => Mux::TYPE,
        }
    }

    pub fn id(&self) -> EntryId {
        match self {
            Entry::TxHeader(header) => header.id(),
            Entry::Output(output) => output.id(),
            Entry::Retirement(retirement) => retirement.id(),
            Entry::Spend(spend) => spend.id(),
            Entry::Issuance(issuance) => issuance.id(),
            Entry::Nonce(nonce) => nonce.id(),
            Entry::TimeRange(range) => range.id(),
            Entry::Mux(mux) => mux.id(),
        }
    }

    pub fn ext_hash(&self) -> &Hash<32> {
        match self {
            Entry::TxHeader(header) => &header.ext_hash,
            Entry::Output(output) => &output.ext_hash,
            Entry::Retirement(retirement) => &retirement.ext_hash,
            Entry::Spend(spend) => &spend.body.ext_hash,
            Entry::Issuance(issuance) => &issuance.body.ext_hash,
            Entry::Nonce(nonce) => &nonce.body.ext_hash,
            Entry::TimeRange(range) => &range.ext_hash,
            Entry::Mux(mux) => &mux.body.ext_hash,
        }
    }

    /// The pointer edges graph traversal follows from this entry.
    ///
    /// Covers every edge except a nonce's witness issuance: the issuance a
    /// nonce names must already be reachable through the value flow, and the
    /// validator checks exactly that.
    pub fn references(&self) -> Vec<EntryId> {
        match self {
            Entry::TxHeader(header) => header.results.clone(),
            Entry::Output(output) => vec![output.source.ref_id],
            Entry::Retirement(retirement) => vec![retirement.source.ref_id],
            Entry::Spend(spend) => {
                vec![spend.body.spent_output, spend.witness.destination.ref_id]
            }
            Entry::Issuance(issuance) => {
                vec![issuance.body.anchor, issuance.witness.destination.ref_id]
            }
            Entry::Nonce(nonce) => vec![nonce.body.time_range],
            Entry::TimeRange(_) => Vec::new(),
            Entry::Mux(mux) => {
                let mut refs: Vec<EntryId> =
                    mux.body.sources.iter().map(|s| s.ref_id).collect();
                refs.extend(mux.witness.destinations.iter().map(|d| d.ref_id));
                refs
            }
        }
    }
}

impl From<TxHeader> for Entry {
    fn from(header: TxHeader) -> Self {
        Entry::TxHeader(header)
    }
}

impl From<Output> for Entry {
    fn from(output: Output) -> Self {
        Entry::Output(output)
    }
}

impl From<Retirement> for Entry {
    fn from(retirement: Retirement) -> Self {
        Entry::Retirement(retirement)
    }
}

impl From<Spend> for Entry {
    fn from(spend: Spend) -> Self {
        Entry::Spend(spend)
    }
}

impl From<Issuance> for Entry {
    fn from(issuance: Issuance) -> Self {
        Entry::Issuance(issuance)
    }
}

impl From<Nonce> for Entry {
    fn from(nonce: Nonce) -> Self {
        Entry::Nonce(nonce)
    }
}

impl From<TimeRange> for Entry {
    fn from(range: TimeRange) -> Self {
        Entry::TimeRange(range)
    }
}

impl From<Mux> for Entry {
    fn from(mux: Mux) -> Self {
        Entry::Mux(mux)
    }
}
