use crate::hash::Hash;
use sha3::{Digest, Sha3_256};
use tessera_codec::{encode, Encode, Encoder};

/// handy method to create a hash of the given `SIZE` bit size.
///
/// The hash algorithm is SHA3 and the constant parameter is the number of
/// bits to generate; the ledger only uses 256.
///
/// # Generate a cryptographic hash with SHA3-256
///
/// The following will generate a 32 bytes digest output
///
/// ```
/// # use tessera_crypto::hash::Hasher;
///
/// let mut hasher = Hasher::<256>::new();
/// hasher.input(b"My transaction");
///
/// let digest = hasher.finalize();
/// # assert_eq!(
/// #   "8d78c47d5040747b5e84e93e98d9e0a4d06a5b653a80903a67a3479c432425ce",
/// #   hex::encode(digest)
/// # );
/// ```
pub struct Hasher<const BITS: usize>(Sha3_256);

impl<const BITS: usize> Hasher<BITS> {
    /// update the [`Hasher`] with the given inputs
    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
}

impl Hasher<256> {
    /// create a new [`Hasher`]
    #[inline]
    pub fn new() -> Self {
        Self(Sha3_256::new())
    }

    /// convenient function to directly generate the hash of the given bytes
    /// without creating the intermediary [`Hasher`] and calling
    /// [`Hasher::input`].
    #[inline]
    pub fn hash(bytes: &[u8]) -> Hash<32> {
        let mut hasher = Self::new();
        hasher.input(bytes);
        hasher.finalize()
    }

    /// convenient function to directly generate the hash of a value's
    /// canonical encoding, streamed into the digest without an intermediate
    /// buffer.
    #[inline]
    pub fn hash_encodable(data: &impl Encode) -> Hash<32> {
        let mut hasher = Self::new();
        let mut encoder = Encoder::new(&mut hasher);
        data.encode(&mut encoder).expect("infallible");
        hasher.finalize()
    }

    /// consume the [`Hasher`] and return the computed digest
    pub fn finalize(self) -> Hash<32> {
        let mut digest = [0; 32];
        digest.copy_from_slice(&self.0.finalize());
        Hash::new(digest)
    }
}

impl Default for Hasher<256> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const BITS: usize> encode::Write for &'a mut Hasher<BITS> {
    type Error = std::convert::Infallible;

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.input(buf);
        Ok(())
    }
}
