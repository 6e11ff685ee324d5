#![forbid(unsafe_code)]
#![doc = "Bit-oriented SHA-256 and the SHA-256 Hash_DRBG of NIST SP 800-90A."]

// Core traits
pub mod provider;

// Hash algorithms
#[cfg(feature = "sha2")]
pub mod sha2;

pub mod hash {
    //! Unified hash interface.
    pub use super::provider::Digest;
    #[cfg(feature = "sha2")]
    pub use super::sha2::Sha256;
}

// DRBG and its entropy inputs
#[cfg(feature = "entropy")]
pub mod entropy;
#[cfg(feature = "drbg")]
pub mod drbg;

// Power-on self tests
#[cfg(feature = "selftest")]
pub mod selftest;

pub use hdrbg_types::{BitString, CryptoError, SecurityStrength};
