//! Canonical encoding shared by all Tessera crates.
//!
//! Entry identifiers are hashes of a fixed binary encoding, so every byte
//! emitted here is consensus-critical. The format has seven field kinds:
//! single octets, unsigned varints, raw 32-byte hashes, length-prefixed
//! strings, lists (a string wrapping the concatenated elements), structs
//! (plain field concatenation) and extension structs (a single 32-byte
//! hash). Decoding rejects every non-canonical form it can detect.

/// Streaming decoder over a borrowed buffer.
pub mod decode;

/// Streaming encoder over a generic byte sink.
pub mod encode;

/// Round-trip friendly common helper structs.
pub mod utils;

pub use decode::{Decode, Decoder};
pub use encode::{Encode, Encoder};

/// Anything that can travel through the canonical codec in both directions.
pub trait Fragment: Sized + Encode + for<'b> Decode<'b> {}

impl<T> Fragment for T where T: Sized + Encode + for<'b> Decode<'b> {}

/// Encode `data` into a fresh buffer.
pub fn to_vec(data: &impl Encode) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new());
    data.encode(&mut encoder).expect("infallible");
    encoder.into_writer()
}

/// Decode a value off the front of `bytes`.
///
/// Trailing bytes are left untouched; callers that require exact framing
/// should check [`Decoder::is_empty`] themselves.
pub fn from_slice<'b, T: Decode<'b>>(bytes: &'b [u8]) -> Result<T, decode::Error> {
    let mut decoder = Decoder::new(bytes);
    T::decode(&mut decoder)
}
