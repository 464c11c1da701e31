//! Entry model and transaction graph for the Tessera ledger.
//!
//! A transaction is a content-addressed DAG of immutable entries rooted at a
//! header. This crate defines the eight entry kinds, the canonical body
//! encodings their identifiers are derived from, the value-flow edges that
//! link them, and the graph container validation runs against.

pub mod builder;
pub mod crypto;
pub mod model;
pub mod tx;

pub use builder::TxBuilder;
pub use crypto::entry_id;
pub use model::*;
pub use tx::{AnchorNode, DestNode, GraphError, ResolveError, SourceNode, Transaction};

pub use tessera_codec::utils::Bytes;
pub use tessera_crypto::hash::Hash;
