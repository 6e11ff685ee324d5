//! SHA-256 Hash_DRBG (NIST SP 800-90A §10.1.1).
//!
//! - [`hash_df`]: the Hash_df derivation function (§10.3.1)
//! - [`HashDrbg`]: the instantiate / reseed / generate state machine
//! - [`DrbgConfig`]: per-instance limits

pub mod config;
pub mod hash_df;
pub mod hash_drbg;

pub use config::DrbgConfig;
pub use hash_drbg::{DrbgState, HashDrbg};

/// Seed length for SHA-256 (SP 800-90A Table 2).
pub const SEED_LEN_BITS: usize = 440;

/// SHA-256 output length.
pub const OUTLEN_BITS: usize = 256;
