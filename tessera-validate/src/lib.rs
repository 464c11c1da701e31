//! Validation rules and state application for Tessera transactions.
//!
//! [`rules::validate_tx`] is a pure judgment over a transaction graph; it
//! touches no state and can run on any number of transactions in parallel.
//! [`apply::apply_tx`] turns an accepted transaction into UTXO and nonce
//! set changes behind the [`apply::ChainState`] seam, all or nothing.

pub mod apply;
pub mod rules;
pub mod utils;
