//! Entropy inputs for the DRBG.
//!
//! [`EntropySource`] is the contract the DRBG consumes: hand out at least
//! the requested number of bits, or fail. Three providers implement it:
//!
//! 1. [`SystemEntropy`]: operating-system randomness via `getrandom`.
//! 2. [`FixedEntropy`]: a caller-supplied bit stream, for known-answer tests.
//! 3. [`ConditionedEntropy`]: raw bytes from a pluggable [`NoiseSource`],
//!    health-tested (RCT + APT) and hash-conditioned to full entropy.
//!
//! # Example
//!
//! ```
//! use hdrbg_crypto::entropy::{ConditionedEntropy, EntropyConfig, EntropySource};
//!
//! let mut es = ConditionedEntropy::new(EntropyConfig::default());
//! es.startup_test().expect("noise source unhealthy");
//! let bits = es.get_entropy(256).expect("entropy acquisition failed");
//! assert_eq!(bits.len(), 256);
//! ```

pub mod conditioning;
pub mod fixed;
pub mod health;
pub mod pool;

pub use fixed::FixedEntropy;
pub use health::{AptTest, HealthTest, RctTest};
pub use pool::EntropyPool;

use hdrbg_types::{BitString, CryptoError};
use zeroize::Zeroizing;

/// A supplier of entropy bits.
///
/// Implementations may block. A DRBG only calls its source while
/// instantiating or reseeding.
pub trait EntropySource: Send {
    /// Return at least `min_bits` bits of entropy.
    ///
    /// Fails with [`CryptoError::InsufficientEntropy`] when the source
    /// cannot deliver that many.
    fn get_entropy(&mut self, min_bits: usize) -> Result<BitString, CryptoError>;
}

/// Operating-system randomness (full entropy per bit).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEntropy;

impl EntropySource for SystemEntropy {
    fn get_entropy(&mut self, min_bits: usize) -> Result<BitString, CryptoError> {
        let mut buf = Zeroizing::new(vec![0u8; min_bits.div_ceil(8)]);
        getrandom::getrandom(&mut buf).map_err(|_| CryptoError::InsufficientEntropy {
            need: min_bits,
            got: 0,
        })?;
        BitString::from_bits(&buf, min_bits)
    }
}

/// Raw noise with a declared min-entropy rate, before conditioning.
pub trait NoiseSource: Send {
    /// Human-readable name of the noise source.
    fn name(&self) -> &str;

    /// Min-entropy per byte in bits (1..=8).
    fn min_entropy_per_byte(&self) -> u32;

    /// Fill `buf` with raw noise; returns the number of bytes written.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError>;
}

/// `getrandom` viewed as a noise source.
pub struct SystemNoiseSource;

impl NoiseSource for SystemNoiseSource {
    fn name(&self) -> &str {
        "system"
    }

    fn min_entropy_per_byte(&self) -> u32 {
        8
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CryptoError> {
        getrandom::getrandom(buf).map_err(|_| CryptoError::InsufficientEntropy {
            need: buf.len() * 8,
            got: 0,
        })?;
        Ok(buf.len())
    }
}

/// Health-test parameters for [`ConditionedEntropy`].
#[derive(Debug, Clone)]
pub struct EntropyConfig {
    /// Run RCT and APT on every raw byte. Default: true.
    pub enable_health_tests: bool,
    /// RCT cutoff. Default: 21.
    pub rct_cutoff: u32,
    /// APT window size. Default: 512.
    pub apt_window_size: u32,
    /// APT cutoff. Default: 410.
    pub apt_cutoff: u32,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        EntropyConfig {
            enable_health_tests: true,
            rct_cutoff: health::DEFAULT_RCT_CUTOFF,
            apt_window_size: health::DEFAULT_APT_WINDOW,
            apt_cutoff: health::DEFAULT_APT_CUTOFF,
        }
    }
}

/// Health-tested, conditioned entropy from a [`NoiseSource`].
pub struct ConditionedEntropy {
    pool: EntropyPool,
    health: Option<HealthTest>,
    source: Box<dyn NoiseSource>,
}

impl ConditionedEntropy {
    /// Conditioned entropy over [`SystemNoiseSource`].
    pub fn new(config: EntropyConfig) -> Self {
        Self::with_source(config, Box::new(SystemNoiseSource))
    }

    /// Conditioned entropy over a caller-supplied noise source.
    pub fn with_source(config: EntropyConfig, source: Box<dyn NoiseSource>) -> Self {
        let health = config.enable_health_tests.then(|| {
            HealthTest::new(config.rct_cutoff, config.apt_window_size, config.apt_cutoff)
        });
        ConditionedEntropy {
            pool: EntropyPool::new(),
            health,
            source,
        }
    }

    /// Name of the underlying noise source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Start-up health test (SP 800-90B §4.3).
    ///
    /// Draws `STARTUP_TEST_SAMPLES` raw bytes through the health tests and
    /// discards them. Test state is cleared afterwards.
    pub fn startup_test(&mut self) -> Result<(), CryptoError> {
        let mut samples = Zeroizing::new(vec![0u8; health::STARTUP_TEST_SAMPLES]);
        self.read_raw(&mut samples)?;
        if let Some(ht) = self.health.as_mut() {
            ht.reset();
        }
        Ok(())
    }

    /// Fill `raw` from the noise source, health-testing every byte.
    fn read_raw(&mut self, raw: &mut [u8]) -> Result<(), CryptoError> {
        let mut filled = 0;
        while filled < raw.len() {
            let n = self.source.read(&mut raw[filled..])?;
            if n == 0 {
                return Err(CryptoError::InsufficientEntropy {
                    need: raw.len() * 8,
                    got: filled * 8,
                });
            }
            if let Some(ht) = self.health.as_mut() {
                ht.test_bytes(&raw[filled..filled + n])?;
            }
            filled += n;
        }
        Ok(())
    }

    /// Collect, test and condition one block into the pool.
    fn gather_block(&mut self) -> Result<(), CryptoError> {
        let needed = conditioning::needed_input_len(self.source.min_entropy_per_byte())?;
        let mut raw = Zeroizing::new(vec![0u8; needed]);
        self.read_raw(&mut raw)?;
        let block = Zeroizing::new(conditioning::condition(&raw));
        self.pool.push(block.as_slice());
        Ok(())
    }
}

impl EntropySource for ConditionedEntropy {
    fn get_entropy(&mut self, min_bits: usize) -> Result<BitString, CryptoError> {
        let bytes = min_bits.div_ceil(8);
        while self.pool.len() < bytes {
            self.gather_block()?;
        }
        let mut out = Zeroizing::new(vec![0u8; bytes]);
        self.pool.pop(&mut out);
        BitString::from_bits(&out, min_bits)
    }
}
