/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument: {0}")]
    InvalidArg(&'static str),
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },
    #[error("invalid length")]
    InvalidLength,

    // DRBG errors
    #[error("drbg: requested security strength {requested} exceeds maximum {max}")]
    InvalidSecurityStrength { requested: u32, max: u32 },
    #[error("drbg: personalization string too long")]
    PersonalizationTooLong,
    #[error("drbg: additional input too long")]
    AdditionalInputTooLong,
    #[error("drbg: insufficient entropy: need {need} bits, got {got}")]
    InsufficientEntropy { need: usize, got: usize },
    #[error("drbg: reseed required")]
    ReseedRequired,
    #[error("drbg: requested {requested} bits exceeds per-request maximum {max}")]
    RequestedBitsExceedsMax { requested: usize, max: usize },
    #[error("drbg: not instantiated")]
    NotInstantiated,

    // Entropy source health errors
    #[error("entropy: repetition count test failed")]
    EntropyRctFailure,
    #[error("entropy: adaptive proportion test failed")]
    EntropyAptFailure,

    // Self-test errors
    #[error("self-test failed: {0}")]
    SelfTestFailure(String),
}

impl CryptoError {
    /// True for errors a caller may recover from automatically.
    ///
    /// Only [`CryptoError::ReseedRequired`] qualifies: reseeding and retrying
    /// the request clears it. Everything else is misuse or an environment
    /// failure and belongs to the top-level caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CryptoError::ReseedRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_reseed_required_is_recoverable() {
        assert!(CryptoError::ReseedRequired.is_recoverable());
        assert!(!CryptoError::InvalidLength.is_recoverable());
        assert!(!CryptoError::InsufficientEntropy { need: 256, got: 0 }.is_recoverable());
        assert!(!CryptoError::RequestedBitsExceedsMax {
            requested: 1 << 20,
            max: 1 << 19
        }
        .is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let e = CryptoError::InvalidSecurityStrength {
            requested: 512,
            max: 256,
        };
        assert_eq!(
            e.to_string(),
            "drbg: requested security strength 512 exceeds maximum 256"
        );
        let e = CryptoError::InsufficientEntropy { need: 256, got: 64 };
        assert_eq!(
            e.to_string(),
            "drbg: insufficient entropy: need 256 bits, got 64"
        );
    }
}
