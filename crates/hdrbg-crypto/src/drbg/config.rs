//! Hash_DRBG limits.

use hdrbg_types::{CryptoError, SecurityStrength};

/// Ceiling on personalization string and additional input length (2^35 bits).
pub const MAX_INPUT_BITS: u64 = 1 << 35;

/// Ceiling on bits returned by one generate call (2^19).
pub const MAX_BITS_PER_REQUEST: usize = 1 << 19;

/// Ceiling on generate calls between reseeds (2^48).
pub const MAX_RESEED_INTERVAL: u64 = 1 << 48;

/// Per-instance limits. The defaults are the SP 800-90A maxima for SHA-256;
/// tighter values are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrbgConfig {
    /// Highest security strength the instance accepts. Default: 256.
    pub max_security_strength: u32,
    /// Default: 2^35 bits.
    pub max_personalization_bits: u64,
    /// Default: 2^35 bits.
    pub max_additional_input_bits: u64,
    /// Default: 2^19 bits.
    pub max_bits_per_request: usize,
    /// Generate calls allowed before a reseed is required. Default: 2^48.
    pub reseed_interval: u64,
}

impl Default for DrbgConfig {
    fn default() -> Self {
        DrbgConfig {
            max_security_strength: SecurityStrength::MAX.bits(),
            max_personalization_bits: MAX_INPUT_BITS,
            max_additional_input_bits: MAX_INPUT_BITS,
            max_bits_per_request: MAX_BITS_PER_REQUEST,
            reseed_interval: MAX_RESEED_INTERVAL,
        }
    }
}

impl DrbgConfig {
    /// Reject limits that are zero or exceed the SP 800-90A ceilings.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.max_security_strength < SecurityStrength::Bits112.bits()
            || self.max_security_strength > SecurityStrength::MAX.bits()
        {
            return Err(CryptoError::InvalidArg(
                "max security strength must be between 112 and 256",
            ));
        }
        if self.max_personalization_bits > MAX_INPUT_BITS {
            return Err(CryptoError::InvalidArg(
                "personalization limit exceeds 2^35 bits",
            ));
        }
        if self.max_additional_input_bits > MAX_INPUT_BITS {
            return Err(CryptoError::InvalidArg(
                "additional input limit exceeds 2^35 bits",
            ));
        }
        if self.max_bits_per_request == 0 || self.max_bits_per_request > MAX_BITS_PER_REQUEST {
            return Err(CryptoError::InvalidArg(
                "bits per request must be between 1 and 2^19",
            ));
        }
        if self.reseed_interval == 0 || self.reseed_interval > MAX_RESEED_INTERVAL {
            return Err(CryptoError::InvalidArg(
                "reseed interval must be between 1 and 2^48",
            ));
        }
        Ok(())
    }
}
