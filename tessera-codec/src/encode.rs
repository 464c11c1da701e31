use std::convert::Infallible;

/// A sink for canonical-encoded bytes.
///
/// Implemented for `Vec<u8>` (infallible) and, in `tessera-crypto`, for the
/// streaming hasher, so entry bodies can be hashed without an intermediate
/// buffer.
pub trait Write {
    type Error;

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
}

impl Write for Vec<u8> {
    type Error = Infallible;

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

/// A value with a canonical encoding.
///
/// Struct fields are emitted by concatenation in declared order; there is no
/// framing beyond what each field kind carries itself.
pub trait Encode {
    fn encode<W: Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error>;
}

impl Encode for u64 {
    fn encode<W: Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        e.varint(*self)?;
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Write>(&self, e: &mut Encoder<W>) -> Result<(), W::Error> {
        e.seq(self)?;
        Ok(())
    }
}

/// Writes the canonical field kinds into a [`Write`] sink.
pub struct Encoder<W>(W);

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Encoder(writer)
    }

    pub fn into_writer(self) -> W {
        self.0
    }

    /// A single octet.
    pub fn byte(&mut self, value: u8) -> Result<&mut Self, W::Error> {
        self.0.write_all(&[value])?;
        Ok(self)
    }

    /// Unsigned LEB128. Values above 2^63−1 have no canonical form and are
    /// rejected by the decoder; the model types never hold them.
    pub fn varint(&mut self, mut value: u64) -> Result<&mut Self, W::Error> {
        loop {
            let group = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.0.write_all(&[group])?;
                return Ok(self);
            }
            self.0.write_all(&[group | 0x80])?;
        }
    }

    /// A raw 32-byte hash, no prefix.
    pub fn hash(&mut self, digest: &[u8; 32]) -> Result<&mut Self, W::Error> {
        self.0.write_all(digest)?;
        Ok(self)
    }

    /// A length-prefixed byte string.
    pub fn bytes(&mut self, payload: &[u8]) -> Result<&mut Self, W::Error> {
        self.varint(payload.len() as u64)?;
        self.0.write_all(payload)?;
        Ok(self)
    }

    /// A list: the concatenated element encodings wrapped as one string.
    pub fn seq<T: Encode>(&mut self, items: &[T]) -> Result<&mut Self, W::Error> {
        let mut inner = Encoder::new(Vec::new());
        for item in items {
            item.encode(&mut inner).expect("infallible");
        }
        self.bytes(&inner.into_writer())
    }
}
