use crate::{decode, encode, Decode, Decoder, Encode, Encoder};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

/// An owned byte string that encodes with a length prefix and renders as hex
/// everywhere a human might see it.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(into = "String", try_from = "String")]
pub struct Bytes(Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(xs: Vec<u8>) -> Self {
        Bytes(xs)
    }
}

impl From<&[u8]> for Bytes {
    fn from(xs: &[u8]) -> Self {
        Bytes(xs.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Bytes {
    fn from(xs: &[u8; N]) -> Self {
        Bytes(xs.to_vec())
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(b: Bytes) -> Self {
        b.0
    }
}

impl Deref for Bytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<String> for Bytes {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let v = hex::decode(value)?;
        Ok(Bytes(v))
    }
}

impl From<Bytes> for String {
    fn from(b: Bytes) -> Self {
        hex::encode(b.deref())
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bytes").field(&hex::encode(&self.0)).finish()
    }
}

impl Encode for Bytes {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        e.bytes(&self.0)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for Bytes {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(Bytes(d.bytes()?.to_vec()))
    }
}
