//! The protocol hash for Tessera.
//!
//! Two helper objects are exposed:
//!
//! * [`Hasher`] to stream bytes or canonical-encoded values into a digest
//!   without allocating an intermediate buffer
//! * [`struct@Hash`] a conveniently strongly typed byte array
//!
//! The algorithm is SHA3-256; every content-addressed identifier in the
//! ledger is a 32-byte digest of it.
//!
//! # Example
//!
//! ```
//! use tessera_crypto::hash::Hasher;
//!
//! let mut hasher = Hasher::<256>::new();
//! hasher.input(b"My transaction");
//!
//! let digest = hasher.finalize();
//! # assert_eq!(
//! #   "8d78c47d5040747b5e84e93e98d9e0a4d06a5b653a80903a67a3479c432425ce",
//! #   hex::encode(digest)
//! # );
//! ```

#[allow(clippy::module_inception)]
mod hash;
mod hasher;
mod serde;

pub use self::{hash::Hash, hasher::Hasher};
