//! Hash conditioning of raw noise (NIST SP 800-90B §3.1.5.1.1).
//!
//! The conditioning function is the single-block Hash_df construction:
//! `SHA-256(0x01 || be32(256) || raw)`, which yields 256 full-entropy bits
//! once `raw` carries at least 256 + 64 bits of min-entropy.

use hdrbg_types::CryptoError;

use crate::sha2::{Sha256, SHA256_OUTPUT_SIZE};

/// Bits produced per conditioned block.
pub const CONDITIONED_BITS: usize = SHA256_OUTPUT_SIZE * 8;

/// Extra min-entropy required on top of the output length.
const SECURITY_MARGIN_BITS: usize = 64;

/// Raw bytes needed for one conditioned block from a source that delivers
/// `min_entropy_per_byte` bits of min-entropy per byte (1..=8).
pub fn needed_input_len(min_entropy_per_byte: u32) -> Result<usize, CryptoError> {
    if !(1..=8).contains(&min_entropy_per_byte) {
        return Err(CryptoError::InvalidArg(
            "min-entropy per byte must be between 1 and 8",
        ));
    }
    Ok((CONDITIONED_BITS + SECURITY_MARGIN_BITS).div_ceil(min_entropy_per_byte as usize))
}

/// Condition `raw` into one 256-bit block.
pub fn condition(raw: &[u8]) -> [u8; SHA256_OUTPUT_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(&[0x01]);
    hasher.update(&(CONDITIONED_BITS as u32).to_be_bytes());
    hasher.update(raw);
    hasher.finish()
}
