//! Entry identity hashing.

use crate::model::EntryId;
use tessera_codec::Encode;
use tessera_crypto::hash::Hasher;

/// Computes `H("entryid:" ‖ type ‖ ":" ‖ H(body))`, the content-addressed
/// identifier of an entry. Witness data never participates, so identity is
/// fixed the moment a body is.
pub fn entry_id(type_tag: &str, body: &impl Encode) -> EntryId {
    let body_hash = Hasher::<256>::hash_encodable(body);
    let mut hasher = Hasher::<256>::new();
    hasher.input(b"entryid:");
    hasher.input(type_tag.as_bytes());
    hasher.input(b":");
    hasher.input(body_hash.as_ref());
    hasher.finalize()
}
