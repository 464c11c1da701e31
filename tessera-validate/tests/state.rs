pub mod common;

use common::*;
use tessera_primitives::{Transaction, TxBuilder};
use tessera_validate::apply::{apply_tx, validate_and_apply, ChainState, MemoryChainState};
use tessera_validate::rules::validate_tx;
use tessera_validate::utils::{Environment, StateError, ValidationError};

const ENV: Environment = Environment { block_time_ms: 1_000 };

struct IssuanceIds {
    tx: Transaction,
    nonce: tessera_primitives::EntryId,
    output: tessera_primitives::EntryId,
}

fn issuance_tx(amount: u64) -> IssuanceIds {
    let mut builder = TxBuilder::new(0, 0);
    let range = builder.time_range(0, 0);
    let nonce = builder.nonce(program(), range);
    let issuance = builder.issue(nonce, definition(), amount, Vec::new());
    let output = builder.output(issuance, value(amount), program());
    IssuanceIds {
        tx: builder.build().unwrap(),
        nonce,
        output,
    }
}

#[test]
fn issuance_delta_inserts_output_and_nonce() {
    let accepted = issuance_tx(100);
    let mut state = MemoryChainState::new();
    validate_and_apply(&accepted.tx, &Approve, &mut state, &ENV).unwrap();

    assert!(state.contains_utxo(&accepted.output));
    assert!(state.contains_nonce(&accepted.nonce));
}

#[test]
fn spend_delta_swaps_outputs() {
    let previous = previous_output(100);
    let previous_id = previous.id();
    let mut builder = TxBuilder::new(0, 0);
    let spend = builder.spend(previous, Vec::new());
    let fresh = builder.output(spend, value(100), program());
    let tx = builder.build().unwrap();

    let mut state = MemoryChainState::new().with_utxo(previous_id);
    validate_and_apply(&tx, &Approve, &mut state, &ENV).unwrap();

    // the spent output rides along as an entry but is not re-created
    assert!(!state.contains_utxo(&previous_id));
    assert!(state.contains_utxo(&fresh));
}

#[test]
fn retirement_leaves_no_utxo() {
    let mut builder = TxBuilder::new(0, 0);
    let range = builder.time_range(0, 0);
    let nonce = builder.nonce(program(), range);
    let issuance = builder.issue(nonce, definition(), 100, Vec::new());
    let retirement = builder.retire(issuance, value(100));
    let tx = builder.build().unwrap();

    let mut state = MemoryChainState::new();
    validate_and_apply(&tx, &Approve, &mut state, &ENV).unwrap();
    assert!(!state.contains_utxo(&retirement));
}

#[test]
fn replaying_a_nonce_rejects_and_rolls_back() {
    let accepted = issuance_tx(100);
    let mut state = MemoryChainState::new();
    validate_and_apply(&accepted.tx, &Approve, &mut state, &ENV).unwrap();

    let failure = validate_and_apply(&accepted.tx, &Approve, &mut state, &ENV).unwrap_err();
    assert!(matches!(
        failure.error,
        ValidationError::State(StateError::DuplicateNonce)
    ));
    assert_eq!(failure.trace, vec![accepted.nonce]);
    // the first application survives untouched
    assert!(state.contains_utxo(&accepted.output));
    assert!(state.contains_nonce(&accepted.nonce));
}

#[test]
fn spending_a_missing_utxo_rejects() {
    let mut builder = TxBuilder::new(0, 0);
    let spend = builder.spend(previous_output(100), Vec::new());
    builder.output(spend, value(100), program());
    let tx = builder.build().unwrap();

    let mut state = MemoryChainState::new();
    let failure = validate_and_apply(&tx, &Approve, &mut state, &ENV).unwrap_err();
    assert!(matches!(
        failure.error,
        ValidationError::State(StateError::MissingUtxo)
    ));
}

#[test]
fn partial_delta_rolls_back_whole() {
    let first = previous_output(100);
    let second = previous_output(200);
    let first_id = first.id();

    let mut builder = TxBuilder::new(0, 0);
    let spend_one = builder.spend(first, Vec::new());
    builder.output(spend_one, value(100), program());
    let spend_two = builder.spend(second, Vec::new());
    builder.output(spend_two, value(200), program());
    let tx = builder.build().unwrap();
    validate_tx(&tx, &Approve).unwrap();

    // only the first spent output exists
    let mut state = MemoryChainState::new().with_utxo(first_id);
    let failure = apply_tx(&tx, &mut state, &ENV).unwrap_err();
    assert!(matches!(
        failure.error,
        ValidationError::State(StateError::MissingUtxo)
    ));
    // the removal that went through was undone
    assert!(state.contains_utxo(&first_id));
}

#[test]
fn header_window_gates_application() {
    let mut builder = TxBuilder::new(2_000, 0);
    let range = builder.time_range(2_000, 0);
    let nonce = builder.nonce(program(), range);
    let issuance = builder.issue(nonce, definition(), 100, Vec::new());
    builder.output(issuance, value(100), program());
    let early = builder.build().unwrap();
    validate_tx(&early, &Approve).unwrap();

    let mut state = MemoryChainState::new();
    let failure = apply_tx(&early, &mut state, &ENV).unwrap_err();
    assert!(matches!(
        failure.error,
        ValidationError::State(StateError::BeforeMintime)
    ));

    let mut builder = TxBuilder::new(0, 500);
    let range = builder.time_range(0, 500);
    let nonce = builder.nonce(program(), range);
    let issuance = builder.issue(nonce, definition(), 100, Vec::new());
    builder.output(issuance, value(100), program());
    let late = builder.build().unwrap();
    validate_tx(&late, &Approve).unwrap();

    let failure = apply_tx(&late, &mut state, &ENV).unwrap_err();
    assert!(matches!(
        failure.error,
        ValidationError::State(StateError::AfterMaxtime)
    ));
}

#[test]
fn zero_bounds_always_apply() {
    let accepted = issuance_tx(100);
    let mut state = MemoryChainState::new();
    apply_tx(&accepted.tx, &mut state, &Environment { block_time_ms: 0 }).unwrap();
    assert!(state.contains_utxo(&accepted.output));
}

#[test]
fn rejected_transactions_never_touch_state() {
    let accepted = issuance_tx(100);
    let mut state = MemoryChainState::new();
    let failure = validate_and_apply(&accepted.tx, &Veto, &mut state, &ENV).unwrap_err();
    assert!(matches!(failure.error, ValidationError::Program(_)));
    assert!(!state.contains_utxo(&accepted.output));
    assert!(!state.contains_nonce(&accepted.nonce));
}

#[test]
fn identical_inputs_yield_identical_states() {
    let accepted = issuance_tx(100);
    let mut one = MemoryChainState::new();
    let mut two = MemoryChainState::new();
    validate_and_apply(&accepted.tx, &Approve, &mut one, &ENV).unwrap();
    validate_and_apply(&accepted.tx, &Approve, &mut two, &ENV).unwrap();

    for id in [accepted.output, accepted.nonce] {
        assert_eq!(one.contains_utxo(&id), two.contains_utxo(&id));
        assert_eq!(one.contains_nonce(&id), two.contains_nonce(&id));
    }
}
