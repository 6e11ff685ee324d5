//! Continuous health tests for raw noise (NIST SP 800-90B §4.4).
//!
//! Samples are single noise bytes. Both tests are stateful and see every
//! sample the noise source produces, in order.

use hdrbg_types::CryptoError;

/// Default RCT cutoff for H=1.0, α=2⁻²⁰: C = 1 + ⌈20/1.0⌉ = 21.
pub const DEFAULT_RCT_CUTOFF: u32 = 21;

/// Default APT window size.
pub const DEFAULT_APT_WINDOW: u32 = 512;

/// Default APT cutoff for H=1.0, W=512, α=2⁻²⁰.
pub const DEFAULT_APT_CUTOFF: u32 = 410;

/// Number of samples examined by the start-up test (SP 800-90B §4.3).
pub const STARTUP_TEST_SAMPLES: usize = 1024;

/// Repetition Count Test (SP 800-90B §4.4.1).
///
/// Fails once the same sample has been seen `cutoff` times in a row.
#[derive(Debug, Clone)]
pub struct RctTest {
    cutoff: u32,
    last: Option<u8>,
    run: u32,
}

impl RctTest {
    /// Create an RCT that fails at `cutoff` identical samples in a row.
    pub fn new(cutoff: u32) -> Self {
        RctTest {
            cutoff,
            last: None,
            run: 0,
        }
    }

    /// Feed one sample; fails with `EntropyRctFailure` when the run reaches the cutoff.
    pub fn test(&mut self, sample: u8) -> Result<(), CryptoError> {
        if self.last == Some(sample) {
            self.run += 1;
            if self.run >= self.cutoff {
                return Err(CryptoError::EntropyRctFailure);
            }
        } else {
            self.last = Some(sample);
            self.run = 1;
        }
        Ok(())
    }

    /// Forget the current run.
    pub fn reset(&mut self) {
        self.last = None;
        self.run = 0;
    }
}

/// Adaptive Proportion Test (SP 800-90B §4.4.2).
///
/// The first sample of each window is the reference; the test fails when
/// the reference occurs `cutoff` times within one window of `window` samples.
#[derive(Debug, Clone)]
pub struct AptTest {
    window: u32,
    cutoff: u32,
    reference: Option<u8>,
    matches: u32,
    seen: u32,
}

impl AptTest {
    /// Create an APT over windows of `window` samples failing at `cutoff` matches.
    pub fn new(window: u32, cutoff: u32) -> Self {
        AptTest {
            window,
            cutoff,
            reference: None,
            matches: 0,
            seen: 0,
        }
    }

    /// Feed one sample; fails with `EntropyAptFailure` when the window's
    /// reference value reaches the cutoff.
    pub fn test(&mut self, sample: u8) -> Result<(), CryptoError> {
        let Some(reference) = self.reference else {
            self.reference = Some(sample);
            self.matches = 1;
            self.seen = 1;
            return Ok(());
        };

        if sample == reference {
            self.matches += 1;
            if self.matches >= self.cutoff {
                return Err(CryptoError::EntropyAptFailure);
            }
        }
        self.seen += 1;
        if self.seen >= self.window {
            self.reset();
        }
        Ok(())
    }

    /// Start a fresh window.
    pub fn reset(&mut self) {
        self.reference = None;
        self.matches = 0;
        self.seen = 0;
    }
}

/// RCT and APT run together on each sample.
#[derive(Debug, Clone)]
pub struct HealthTest {
    pub rct: RctTest,
    pub apt: AptTest,
}

impl HealthTest {
    pub fn new(rct_cutoff: u32, apt_window: u32, apt_cutoff: u32) -> Self {
        HealthTest {
            rct: RctTest::new(rct_cutoff),
            apt: AptTest::new(apt_window, apt_cutoff),
        }
    }

    /// RCT and APT with the default cutoffs and window.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RCT_CUTOFF, DEFAULT_APT_WINDOW, DEFAULT_APT_CUTOFF)
    }

    /// Feed a run of samples, stopping at the first failure.
    pub fn test_bytes(&mut self, samples: &[u8]) -> Result<(), CryptoError> {
        for &s in samples {
            self.test_sample(s)?;
        }
        Ok(())
    }

    /// Run one sample through the RCT, then the APT.
    pub fn test_sample(&mut self, sample: u8) -> Result<(), CryptoError> {
        self.rct.test(sample)?;
        self.apt.test(sample)
    }

    pub fn reset(&mut self) {
        self.rct.reset();
        self.apt.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rct_accepts_changing_samples() {
        let mut rct = RctTest::new(DEFAULT_RCT_CUTOFF);
        for i in 0..=255u8 {
            rct.test(i).unwrap();
        }
    }

    #[test]
    fn test_rct_trips_at_cutoff() {
        let mut rct = RctTest::new(4);
        for _ in 0..3 {
            rct.test(7).unwrap();
        }
        assert!(matches!(rct.test(7), Err(CryptoError::EntropyRctFailure)));
    }

    #[test]
    fn test_rct_run_restarts_on_new_value() {
        let mut rct = RctTest::new(4);
        for _ in 0..3 {
            rct.test(1).unwrap();
        }
        rct.test(2).unwrap();
        rct.test(2).unwrap();
        rct.test(2).unwrap();
        assert!(rct.test(2).is_err());

        rct.reset();
        for _ in 0..3 {
            rct.test(2).unwrap();
        }
    }

    #[test]
    fn test_apt_trips_on_biased_window() {
        let mut apt = AptTest::new(64, 10);
        apt.test(0xAA).unwrap();
        for i in 0..8u8 {
            apt.test(0xAA).unwrap();
            apt.test(i).unwrap();
        }
        assert!(matches!(apt.test(0xAA), Err(CryptoError::EntropyAptFailure)));
    }

    #[test]
    fn test_apt_counts_reset_per_window() {
        // 7 matches per window of 16 never reaches a cutoff of 8
        let mut apt = AptTest::new(16, 8);
        for _ in 0..10 {
            for i in 0..16u8 {
                let sample = if i < 7 { 0x55 } else { i };
                apt.test(sample).unwrap();
            }
        }
    }

    #[test]
    fn test_health_test_defaults_pass_counter_bytes() {
        let mut ht = HealthTest::with_defaults();
        let samples: Vec<u8> = (0..4096u32).map(|i| i as u8).collect();
        ht.test_bytes(&samples).unwrap();
    }

    #[test]
    fn test_health_test_stops_at_first_failure() {
        let mut ht = HealthTest::new(3, 512, 410);
        let err = ht.test_bytes(&[1, 2, 2, 2, 3]).unwrap_err();
        assert!(matches!(err, CryptoError::EntropyRctFailure));
    }
}
