//! Deterministic entropy replayed from a caller-supplied bit string.
//!
//! Intended for known-answer tests and reproducible runs. Each request
//! consumes the next `min_bits` bits of the stream, so the entropy input
//! and the nonce of an instantiation are consecutive slices.

use hdrbg_types::{BitString, CryptoError};
use zeroize::Zeroize;

use super::EntropySource;

/// Entropy source that hands out consecutive slices of a fixed bit string.
pub struct FixedEntropy {
    data: BitString,
    offset: usize,
}

impl FixedEntropy {
    /// Replay `data` from its first bit.
    pub fn new(data: BitString) -> Self {
        FixedEntropy { data, offset: 0 }
    }

    /// Stream that serves `parts` back to back.
    pub fn from_parts(parts: &[&BitString]) -> Self {
        Self::new(BitString::concat(parts))
    }

    /// Replay the bytes of a hex string. Surrounding whitespace is ignored.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim())
            .map_err(|_| CryptoError::InvalidArg("entropy must be hex"))?;
        Ok(Self::new(BitString::from(bytes)))
    }

    /// Bits not yet handed out.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}

impl EntropySource for FixedEntropy {
    fn get_entropy(&mut self, min_bits: usize) -> Result<BitString, CryptoError> {
        let remaining = self.remaining();
        if remaining < min_bits {
            return Err(CryptoError::InsufficientEntropy {
                need: min_bits,
                got: remaining,
            });
        }
        let out = self
            .data
            .slice(self.offset, min_bits)
            .ok_or(CryptoError::InvalidLength)?;
        self.offset += min_bits;
        Ok(out)
    }
}

impl Drop for FixedEntropy {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}
