use std::sync::atomic::{AtomicUsize, Ordering};

use tessera_primitives::{
    AssetAmount, AssetDefinition, Bytes, Hash, Issuance, IssuanceBody, IssuanceWitness, Nonce,
    NonceBody, NonceWitness, Output, Program, TimeRange, Transaction, TxHeader, ValueDestination,
    ValueSource, ZERO_HASH,
};
use tessera_validate::utils::{ProgramValidator, TxContext};

/// Accepts every program.
pub struct Approve;

impl ProgramValidator for Approve {
    fn verify_program(&self, _program: &Program, _arguments: &[Bytes], _context: &TxContext) -> bool {
        true
    }
}

/// Rejects every program.
pub struct Veto;

impl ProgramValidator for Veto {
    fn verify_program(&self, _program: &Program, _arguments: &[Bytes], _context: &TxContext) -> bool {
        false
    }
}

/// Accepts only when the context exposes what it promises: the running
/// entry resolves and the header is visible.
pub struct Introspect;

impl ProgramValidator for Introspect {
    fn verify_program(&self, _program: &Program, _arguments: &[Bytes], context: &TxContext) -> bool {
        context.entry(&context.entry_id).is_some() && context.header().version == 1
    }
}

/// Accepts everything while counting evaluations.
#[derive(Default)]
pub struct Counting(pub AtomicUsize);

impl Counting {
    pub fn calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl ProgramValidator for Counting {
    fn verify_program(&self, _program: &Program, _arguments: &[Bytes], _context: &TxContext) -> bool {
        self.0.fetch_add(1, Ordering::SeqCst);
        true
    }
}

pub fn program() -> Program {
    Program {
        script: Bytes::from(&[0x51]),
        vm_version: 1,
    }
}

pub fn program_tagged(tag: u8) -> Program {
    Program {
        script: Bytes::from(&[tag]),
        vm_version: 1,
    }
}

pub fn definition() -> AssetDefinition {
    AssetDefinition {
        initial_block_id: Hash::new([0x0b; 32]),
        data: ZERO_HASH,
        issuance_program: program(),
    }
}

/// `amount` units of the one test asset.
pub fn value(amount: u64) -> AssetAmount {
    AssetAmount {
        asset_id: definition().asset_id(),
        amount,
    }
}

/// An output minted by some earlier transaction, ready to seed a UTXO set.
pub fn previous_output(amount: u64) -> Output {
    Output {
        source: ValueSource {
            ref_id: Hash::new([0x01; 32]),
            value: value(amount),
            position: 0,
        },
        control_program: program(),
        data: ZERO_HASH,
        ext_hash: ZERO_HASH,
    }
}

/// A hand-wired minimal issuance chain (time range, nonce, issuance,
/// output), for tests that corrupt one edge before sealing. The builder
/// produces the same wiring; this keeps every field in reach.
pub struct IssuanceChain {
    pub range: TimeRange,
    pub nonce: Nonce,
    pub issuance: Issuance,
    pub output: Output,
}

pub fn issuance_chain(amount: u64, output_ext: Hash<32>) -> IssuanceChain {
    issuance_chain_with(amount, output_ext, program())
}

pub fn issuance_chain_with(
    amount: u64,
    output_ext: Hash<32>,
    nonce_program: Program,
) -> IssuanceChain {
    let range = TimeRange {
        min_time_ms: 0,
        max_time_ms: 0,
        ext_hash: ZERO_HASH,
    };
    let mut nonce = Nonce {
        body: NonceBody {
            program: nonce_program,
            time_range: range.id(),
            ext_hash: ZERO_HASH,
        },
        witness: NonceWitness::default(),
    };
    let mut issuance = Issuance {
        body: IssuanceBody {
            anchor: nonce.id(),
            value: value(amount),
            data: ZERO_HASH,
            ext_hash: ZERO_HASH,
        },
        witness: IssuanceWitness {
            destination: ValueDestination::default(),
            asset_definition: definition(),
            arguments: Vec::new(),
        },
    };
    let output = Output {
        source: ValueSource {
            ref_id: issuance.id(),
            value: value(amount),
            position: 0,
        },
        control_program: program(),
        data: ZERO_HASH,
        ext_hash: output_ext,
    };
    issuance.witness.destination = ValueDestination {
        ref_id: output.id(),
        value: value(amount),
        position: 0,
    };
    nonce.witness.issuance = issuance.id();
    IssuanceChain {
        range,
        nonce,
        issuance,
        output,
    }
}

impl IssuanceChain {
    pub fn entries(&self) -> Vec<tessera_primitives::Entry> {
        vec![
            self.range.clone().into(),
            self.nonce.clone().into(),
            self.issuance.clone().into(),
            self.output.clone().into(),
        ]
    }

    pub fn seal(&self) -> Transaction {
        let header = TxHeader {
            version: 1,
            results: vec![self.output.id()],
            data: ZERO_HASH,
            min_time_ms: 0,
            max_time_ms: 0,
            ext_hash: ZERO_HASH,
        };
        Transaction::new(header, self.entries()).unwrap()
    }
}
