use std::{fmt, ops::Deref, str::FromStr};
use tessera_codec::{decode, encode, Decode, Decoder, Encode, Encoder};

/// data that is a cryptographic [`struct@Hash`] of `BYTES` long.
///
/// Every identifier in the ledger is 32 bytes long (entry ids, asset ids,
/// the data commitments carried inside entry bodies).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

impl<const BYTES: usize> Hash<BYTES> {
    #[inline]
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }

    /// Whether every octet is zero: the nil pointer and the only extension
    /// hash value allowed at a known transaction version.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl<const BYTES: usize> From<[u8; BYTES]> for Hash<BYTES> {
    #[inline]
    fn from(bytes: [u8; BYTES]) -> Self {
        Self::new(bytes)
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Hash<BYTES> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> Deref for Hash<BYTES> {
    type Target = [u8; BYTES];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const BYTES: usize> PartialEq<[u8]> for Hash<BYTES> {
    fn eq(&self, other: &[u8]) -> bool {
        self.0.eq(other)
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Hash<{size}>", size = BYTES))
            .field(&hex::encode(self))
            .finish()
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self))
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; BYTES];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self::new(bytes))
    }
}

impl Encode for Hash<32> {
    fn encode<W: encode::Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        e.hash(&self.0)?;
        Ok(())
    }
}

impl<'b> Decode<'b> for Hash<32> {
    fn decode(d: &mut Decoder<'b>) -> Result<Self, decode::Error> {
        Ok(Self::new(d.hash()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str() {
        let _digest: Hash<32> = "8d78c47d5040747b5e84e93e98d9e0a4d06a5b653a80903a67a3479c432425ce"
            .parse()
            .unwrap();
    }

    #[test]
    #[should_panic]
    fn from_str_fail() {
        let _digest: Hash<32> = "8d78c47d".parse().unwrap();
    }

    #[test]
    fn codec_is_raw_bytes() {
        let digest = Hash::<32>::new([0xab; 32]);
        let wire = tessera_codec::to_vec(&digest);
        assert_eq!(wire, vec![0xab; 32]);
        let back: Hash<32> = tessera_codec::from_slice(&wire).unwrap();
        assert_eq!(back, digest);
    }
}
