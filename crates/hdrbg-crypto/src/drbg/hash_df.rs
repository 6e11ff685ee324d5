//! Hash_df derivation function (SP 800-90A §10.3.1).

use hdrbg_types::{BitString, CryptoError};
use zeroize::Zeroizing;

use super::OUTLEN_BITS;
use crate::sha2::Sha256;

/// Largest request `derive` accepts: the block counter is a single byte.
pub const MAX_DERIVE_BITS: usize = 255 * OUTLEN_BITS;

/// Derive `requested_bits` bits from `input`.
///
/// Block `i` (counting from 1) is `SHA-256(i || be32(requested_bits) || input)`;
/// the blocks are concatenated and truncated to `requested_bits`.
pub fn derive(input: &BitString, requested_bits: usize) -> Result<BitString, CryptoError> {
    if requested_bits == 0 || requested_bits > MAX_DERIVE_BITS {
        return Err(CryptoError::InvalidLength);
    }

    let blocks = requested_bits.div_ceil(OUTLEN_BITS);
    let length_field = (requested_bits as u32).to_be_bytes();
    let mut out = BitString::with_capacity(blocks * OUTLEN_BITS);

    for counter in 1..=blocks as u8 {
        let mut hasher = Sha256::new();
        hasher.update(&[counter]);
        hasher.update(&length_field);
        hasher.update_bits(input);
        let block = Zeroizing::new(hasher.finish());
        out.extend_from_bytes(block.as_slice());
    }

    out.truncate(requested_bits);
    Ok(out)
}
