#![forbid(unsafe_code)]
#![doc = "Common types, error codes, and security-strength identifiers for hdrbg."]

pub mod bits;
pub mod error;
pub mod strength;

pub use bits::BitString;
pub use error::*;
pub use strength::SecurityStrength;
