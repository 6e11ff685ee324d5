//! Hash-DRBG (Hash-based Deterministic Random Bit Generator).
//!
//! Implements NIST SP 800-90A Section 10.1.1 with SHA-256. All inputs and
//! outputs are bit strings; the working state `V` and `C` is 440 bits.
//!
//! # Example
//!
//! ```
//! use hdrbg_crypto::drbg::HashDrbg;
//! use hdrbg_crypto::entropy::SystemEntropy;
//! use hdrbg_crypto::BitString;
//!
//! let mut drbg = HashDrbg::instantiate(Box::new(SystemEntropy), 256, &BitString::new())?;
//! let bits = drbg.generate(1000, &BitString::new())?;
//! assert_eq!(bits.len(), 1000);
//! # Ok::<(), hdrbg_crypto::CryptoError>(())
//! ```

use std::fmt;

use hdrbg_types::{BitString, CryptoError, SecurityStrength};
use zeroize::{Zeroize, Zeroizing};

use super::config::DrbgConfig;
use super::hash_df::derive;
use super::{OUTLEN_BITS, SEED_LEN_BITS};
use crate::entropy::EntropySource;
use crate::sha2::{Sha256, SHA256_OUTPUT_SIZE};

/// Lifecycle of a [`HashDrbg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrbgState {
    /// Working state destroyed; every operation fails.
    Uninstantiated,
    /// Ready to generate.
    Instantiated,
    /// The reseed interval is exhausted; only `reseed` succeeds.
    NeedsReseed,
}

/// Hash-DRBG context (NIST SP 800-90A Section 10.1.1).
pub struct HashDrbg {
    /// State value V (440 bits).
    v: BitString,
    /// Constant C (440 bits).
    c: BitString,
    /// Number of generate requests since last (re)seed, starting at 1.
    reseed_counter: u64,
    strength: SecurityStrength,
    state: DrbgState,
    config: DrbgConfig,
    source: Box<dyn EntropySource>,
}

/// Pull at least `bits` bits from `source`.
fn fetch_entropy(
    source: &mut dyn EntropySource,
    bits: usize,
) -> Result<Zeroizing<BitString>, CryptoError> {
    let entropy = Zeroizing::new(source.get_entropy(bits)?);
    if entropy.len() < bits {
        return Err(CryptoError::InsufficientEntropy {
            need: bits,
            got: entropy.len(),
        });
    }
    Ok(entropy)
}

/// V = Hash_df(seed_material, seedlen); C = Hash_df(0x00 || V, seedlen).
fn derive_state(seed_material: &BitString) -> Result<(BitString, BitString), CryptoError> {
    let v = derive(seed_material, SEED_LEN_BITS)?;
    let c_input = Zeroizing::new(BitString::concat(&[&BitString::from_bytes(&[0x00]), &v]));
    let c = derive(&c_input, SEED_LEN_BITS)?;
    Ok((v, c))
}

/// SHA-256(prefix || parts...).
fn hash(prefix: u8, parts: &[&BitString]) -> Zeroizing<[u8; SHA256_OUTPUT_SIZE]> {
    let mut hasher = Sha256::new();
    hasher.update(&[prefix]);
    for part in parts {
        hasher.update_bits(part);
    }
    Zeroizing::new(hasher.finish())
}

impl HashDrbg {
    /// Instantiate with the default limits (SP 800-90A §10.1.1.2).
    ///
    /// `requested_strength` is rounded up to the next supported strength.
    /// The source is asked for `strength` bits of entropy input and then
    /// `strength / 2` bits of nonce.
    pub fn instantiate(
        source: Box<dyn EntropySource>,
        requested_strength: u32,
        personalization: &BitString,
    ) -> Result<Self, CryptoError> {
        Self::instantiate_with_config(
            DrbgConfig::default(),
            source,
            requested_strength,
            personalization,
        )
    }

    /// Instantiate with caller-chosen limits.
    pub fn instantiate_with_config(
        config: DrbgConfig,
        mut source: Box<dyn EntropySource>,
        requested_strength: u32,
        personalization: &BitString,
    ) -> Result<Self, CryptoError> {
        config.validate()?;

        let too_strong = CryptoError::InvalidSecurityStrength {
            requested: requested_strength,
            max: config.max_security_strength,
        };
        if requested_strength > config.max_security_strength {
            return Err(too_strong);
        }
        let strength = match SecurityStrength::for_request(requested_strength) {
            Some(s) if s.bits() <= config.max_security_strength => s,
            _ => return Err(too_strong),
        };

        if personalization.len() as u64 > config.max_personalization_bits {
            return Err(CryptoError::PersonalizationTooLong);
        }

        let bits = strength.bits() as usize;
        let entropy = fetch_entropy(source.as_mut(), bits)?;
        let nonce = fetch_entropy(source.as_mut(), bits / 2)?;

        let seed_material =
            Zeroizing::new(BitString::concat(&[&*entropy, &*nonce, personalization]));
        let (v, c) = derive_state(&seed_material)?;

        Ok(HashDrbg {
            v,
            c,
            reseed_counter: 1,
            strength,
            state: DrbgState::Instantiated,
            config,
            source,
        })
    }

    /// Reseed with fresh entropy (SP 800-90A §10.1.1.3).
    ///
    /// Entropy is acquired before the state is touched, so a failed reseed
    /// leaves the DRBG as it was.
    pub fn reseed(&mut self, additional_input: &BitString) -> Result<(), CryptoError> {
        self.ensure_instantiated()?;
        self.check_additional_input(additional_input)?;

        let entropy = fetch_entropy(self.source.as_mut(), self.strength.bits() as usize)?;

        let seed_material = Zeroizing::new(BitString::concat(&[
            &BitString::from_bytes(&[0x01]),
            &self.v,
            &*entropy,
            additional_input,
        ]));
        let (v, c) = derive_state(&seed_material)?;
        self.install(v, c);
        Ok(())
    }

    /// Generate `requested_bits` pseudorandom bits (SP 800-90A §10.1.1.4).
    ///
    /// An empty `additional_input` means none.
    pub fn generate(
        &mut self,
        requested_bits: usize,
        additional_input: &BitString,
    ) -> Result<BitString, CryptoError> {
        self.ensure_instantiated()?;
        if requested_bits == 0 {
            return Err(CryptoError::InvalidLength);
        }
        if requested_bits > self.config.max_bits_per_request {
            return Err(CryptoError::RequestedBitsExceedsMax {
                requested: requested_bits,
                max: self.config.max_bits_per_request,
            });
        }
        self.check_additional_input(additional_input)?;

        if self.reseed_counter > self.config.reseed_interval {
            self.state = DrbgState::NeedsReseed;
            return Err(CryptoError::ReseedRequired);
        }

        // Step 2: w = Hash(0x02 || V || additional_input); V = (V + w) mod 2^seedlen
        if !additional_input.is_empty() {
            let w = hash(0x02, &[&self.v, additional_input]);
            self.v.wrapping_add_be(w.as_slice());
        }

        // Step 3
        let returned = self.hashgen(requested_bits);

        // Step 4: H = Hash(0x03 || V)
        let h = hash(0x03, &[&self.v]);

        // Step 5: V = (V + H + C + reseed_counter) mod 2^seedlen
        self.v.wrapping_add_be(h.as_slice());
        self.v.wrapping_add(&self.c);
        self.v.wrapping_add_u64(self.reseed_counter);

        self.reseed_counter += 1;
        if self.reseed_counter > self.config.reseed_interval {
            self.state = DrbgState::NeedsReseed;
        }

        Ok(returned)
    }

    /// Generate `len` pseudorandom bytes with no additional input.
    pub fn generate_bytes(&mut self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let bits = len.checked_mul(8).ok_or(CryptoError::InvalidLength)?;
        Ok(self.generate(bits, &BitString::new())?.into_bytes())
    }

    /// Destroy the working state (SP 800-90A §9.4).
    pub fn uninstantiate(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.reseed_counter = 0;
        self.state = DrbgState::Uninstantiated;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DrbgState {
        self.state
    }

    /// Strength the instance was instantiated at, after rounding up.
    pub fn security_strength(&self) -> SecurityStrength {
        self.strength
    }

    /// Number of generate calls since the last (re)seed, plus one.
    pub fn reseed_counter(&self) -> u64 {
        self.reseed_counter
    }

    /// Limits this instance enforces.
    pub fn config(&self) -> &DrbgConfig {
        &self.config
    }

    /// Hashgen (SP 800-90A §10.1.1.4): hash successive values of a copy of V.
    fn hashgen(&self, requested_bits: usize) -> BitString {
        let blocks = requested_bits.div_ceil(OUTLEN_BITS);
        let mut data = Zeroizing::new(self.v.clone());
        let mut out = BitString::with_capacity(blocks * OUTLEN_BITS);

        for _ in 0..blocks {
            let block = Zeroizing::new(Sha256::digest_bits(&data));
            out.extend_from_bytes(block.as_slice());
            // data = (data + 1) mod 2^seedlen
            data.wrapping_add_u64(1);
        }

        out.truncate(requested_bits);
        out
    }

    fn install(&mut self, v: BitString, c: BitString) {
        self.v.zeroize();
        self.c.zeroize();
        self.v = v;
        self.c = c;
        self.reseed_counter = 1;
        self.state = DrbgState::Instantiated;
    }

    fn ensure_instantiated(&self) -> Result<(), CryptoError> {
        match self.state {
            DrbgState::Uninstantiated => Err(CryptoError::NotInstantiated),
            DrbgState::Instantiated | DrbgState::NeedsReseed => Ok(()),
        }
    }

    fn check_additional_input(&self, additional_input: &BitString) -> Result<(), CryptoError> {
        if additional_input.len() as u64 > self.config.max_additional_input_bits {
            return Err(CryptoError::AdditionalInputTooLong);
        }
        Ok(())
    }
}

impl Drop for HashDrbg {
    fn drop(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
    }
}

impl fmt::Debug for HashDrbg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashDrbg")
            .field("strength", &self.strength)
            .field("state", &self.state)
            .field("reseed_counter", &self.reseed_counter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::FixedEntropy;
    use std::sync::{Arc, Mutex};

    fn entropy_bytes(seed: u8, len: usize) -> BitString {
        BitString::from_bytes(&(0..len).map(|i| seed.wrapping_add(i as u8)).collect::<Vec<_>>())
    }

    /// Fixed source with enough bits for instantiate at 256 plus `reseeds`.
    fn fixed(seed: u8, reseeds: usize) -> Box<dyn EntropySource> {
        Box::new(FixedEntropy::new(entropy_bytes(seed, 48 + 32 * reseeds)))
    }

    fn none() -> BitString {
        BitString::new()
    }

    /// Records the size of every request it serves.
    struct RecordingSource {
        requests: Arc<Mutex<Vec<usize>>>,
    }

    impl EntropySource for RecordingSource {
        fn get_entropy(&mut self, min_bits: usize) -> Result<BitString, CryptoError> {
            self.requests.lock().unwrap().push(min_bits);
            Ok(BitString::from_bits(&vec![0x6Bu8; min_bits.div_ceil(8)], min_bits).unwrap())
        }
    }

    /// Returns fewer bits than asked for.
    struct ShortSource;

    impl EntropySource for ShortSource {
        fn get_entropy(&mut self, min_bits: usize) -> Result<BitString, CryptoError> {
            Ok(BitString::from_bits(&[0u8; 64], min_bits.saturating_sub(1)).unwrap())
        }
    }

    #[test]
    fn test_instantiate_derives_v_and_c() {
        let drbg = HashDrbg::instantiate(fixed(0x10, 0), 256, &BitString::from_bytes(b"p")).unwrap();
        let entropy = entropy_bytes(0x10, 48);
        let seed = BitString::concat(&[&entropy, &BitString::from_bytes(b"p")]);
        let v = derive(&seed, SEED_LEN_BITS).unwrap();
        let c_input = BitString::concat(&[&BitString::from_bytes(&[0]), &v]);
        let c = derive(&c_input, SEED_LEN_BITS).unwrap();

        assert_eq!(drbg.v, v);
        assert_eq!(drbg.c, c);
        assert_eq!(drbg.v.len(), 440);
        assert_eq!(drbg.reseed_counter(), 1);
        assert_eq!(drbg.state(), DrbgState::Instantiated);
        assert_eq!(drbg.security_strength(), SecurityStrength::Bits256);
    }

    #[test]
    fn test_instantiate_rounds_strength_and_sizes_requests() {
        for (requested, strength, sizes) in [
            (0u32, SecurityStrength::Bits112, [112usize, 56]),
            (120, SecurityStrength::Bits128, [128, 64]),
            (192, SecurityStrength::Bits192, [192, 96]),
            (255, SecurityStrength::Bits256, [256, 128]),
        ] {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let source = RecordingSource {
                requests: Arc::clone(&requests),
            };
            let drbg = HashDrbg::instantiate(Box::new(source), requested, &none()).unwrap();
            assert_eq!(drbg.security_strength(), strength);
            assert_eq!(*requests.lock().unwrap(), sizes.to_vec());
        }
    }

    #[test]
    fn test_instantiate_rejects_excess_strength() {
        let err = HashDrbg::instantiate(fixed(0, 0), 257, &none()).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidSecurityStrength {
                requested: 257,
                max: 256
            }
        ));

        let config = DrbgConfig {
            max_security_strength: 128,
            ..Default::default()
        };
        let err = HashDrbg::instantiate_with_config(config, fixed(0, 0), 192, &none()).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSecurityStrength { .. }));
    }

    #[test]
    fn test_instantiate_rejects_long_personalization() {
        let config = DrbgConfig {
            max_personalization_bits: 8,
            ..Default::default()
        };
        let pers = BitString::from_binary_str("101010101").unwrap();
        let err = HashDrbg::instantiate_with_config(config, fixed(0, 0), 256, &pers).unwrap_err();
        assert!(matches!(err, CryptoError::PersonalizationTooLong));
    }

    #[test]
    fn test_instantiate_insufficient_entropy() {
        let source = Box::new(FixedEntropy::new(entropy_bytes(0, 40)));
        let err = HashDrbg::instantiate(source, 256, &none()).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InsufficientEntropy { need: 128, got: 64 }
        ));

        let err = HashDrbg::instantiate(Box::new(ShortSource), 128, &none()).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InsufficientEntropy { need: 128, got: 127 }
        ));
    }

    #[test]
    fn test_generate_first_block_by_hand() {
        let mut drbg = HashDrbg::instantiate(fixed(0x42, 0), 256, &none()).unwrap();
        let v0 = drbg.v.clone();
        let c = drbg.c.clone();

        let out = drbg.generate(256, &none()).unwrap();
        assert_eq!(out.as_bytes(), &Sha256::digest_bits(&v0));

        let mut expected_v = v0.clone();
        let mut h_input = BitString::from_bytes(&[0x03]);
        h_input.append(&v0);
        expected_v.wrapping_add_be(&Sha256::digest_bits(&h_input));
        expected_v.wrapping_add(&c);
        expected_v.wrapping_add_u64(1);
        assert_eq!(drbg.v, expected_v);
        assert_eq!(drbg.reseed_counter(), 2);
    }

    #[test]
    fn test_hashgen_increments_data_between_blocks() {
        let mut drbg = HashDrbg::instantiate(fixed(0x42, 0), 256, &none()).unwrap();
        let v0 = drbg.v.clone();
        let out = drbg.generate(600, &none()).unwrap();
        assert_eq!(out.len(), 600);

        let mut data = v0;
        assert_eq!(&out.as_bytes()[..32], &Sha256::digest_bits(&data));
        data.wrapping_add_u64(1);
        assert_eq!(&out.as_bytes()[32..64], &Sha256::digest_bits(&data));
        data.wrapping_add_u64(1);
        let third = Sha256::digest_bits(&data);
        // 600 - 512 = 88 bits = 11 bytes
        assert_eq!(&out.as_bytes()[64..], &third[..11]);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let mut a = HashDrbg::instantiate(fixed(7, 0), 256, &none()).unwrap();
        let mut b = HashDrbg::instantiate(fixed(7, 0), 256, &none()).unwrap();
        for bits in [1usize, 255, 256, 257, 1000] {
            assert_eq!(a.generate(bits, &none()).unwrap(), b.generate(bits, &none()).unwrap());
        }
    }

    #[test]
    fn test_generate_outputs_differ() {
        let mut drbg = HashDrbg::instantiate(fixed(7, 0), 256, &none()).unwrap();
        let first = drbg.generate(256, &none()).unwrap();
        let second = drbg.generate(256, &none()).unwrap();
        assert_ne!(first, second);

        let mut other = HashDrbg::instantiate(fixed(8, 0), 256, &none()).unwrap();
        assert_ne!(other.generate(256, &none()).unwrap(), first);
    }

    #[test]
    fn test_additional_input_changes_output() {
        let mut a = HashDrbg::instantiate(fixed(9, 0), 256, &none()).unwrap();
        let mut b = HashDrbg::instantiate(fixed(9, 0), 256, &none()).unwrap();
        let adin = BitString::from_bytes(b"additional");
        assert_ne!(a.generate(256, &adin).unwrap(), b.generate(256, &none()).unwrap());
    }

    #[test]
    fn test_personalization_changes_state() {
        let a = HashDrbg::instantiate(fixed(9, 0), 256, &none()).unwrap();
        let b = HashDrbg::instantiate(fixed(9, 0), 256, &BitString::from_bytes(b"x")).unwrap();
        assert_ne!(a.v, b.v);
    }

    #[test]
    fn test_generate_boundary_rejects_without_mutation() {
        let config = DrbgConfig {
            max_additional_input_bits: 16,
            ..Default::default()
        };
        let mut drbg = HashDrbg::instantiate_with_config(config, fixed(3, 0), 256, &none()).unwrap();
        let v = drbg.v.clone();

        assert!(matches!(drbg.generate(0, &none()), Err(CryptoError::InvalidLength)));
        assert!(matches!(
            drbg.generate(MAX_BITS + 1, &none()),
            Err(CryptoError::RequestedBitsExceedsMax {
                requested: 524_289,
                max: 524_288
            })
        ));
        assert!(matches!(
            drbg.generate(8, &BitString::from_bytes(b"abc")),
            Err(CryptoError::AdditionalInputTooLong)
        ));

        assert_eq!(drbg.v, v);
        assert_eq!(drbg.reseed_counter(), 1);
        assert_eq!(drbg.generate(MAX_BITS, &none()).unwrap().len(), MAX_BITS);
    }

    const MAX_BITS: usize = 1 << 19;

    #[test]
    fn test_reseed_interval_enforced() {
        let config = DrbgConfig {
            reseed_interval: 3,
            ..Default::default()
        };
        let mut drbg = HashDrbg::instantiate_with_config(config, fixed(5, 1), 256, &none()).unwrap();
        for _ in 0..3 {
            drbg.generate(128, &none()).unwrap();
        }
        assert_eq!(drbg.state(), DrbgState::NeedsReseed);
        assert!(matches!(drbg.generate(128, &none()), Err(CryptoError::ReseedRequired)));

        drbg.reseed(&none()).unwrap();
        assert_eq!(drbg.state(), DrbgState::Instantiated);
        assert_eq!(drbg.reseed_counter(), 1);
        drbg.generate(128, &none()).unwrap();
    }

    #[test]
    fn test_reseed_required_at_default_interval() {
        let mut drbg = HashDrbg::instantiate(fixed(5, 0), 256, &none()).unwrap();
        drbg.reseed_counter = (1 << 48) + 1;
        assert!(matches!(drbg.generate(8, &none()), Err(CryptoError::ReseedRequired)));
        assert_eq!(drbg.state(), DrbgState::NeedsReseed);
    }

    #[test]
    fn test_reseed_derives_from_v_and_entropy() {
        let mut drbg = HashDrbg::instantiate(fixed(1, 1), 256, &none()).unwrap();
        drbg.generate(256, &none()).unwrap();
        let old_v = drbg.v.clone();
        let adin = BitString::from_binary_str("111").unwrap();
        drbg.reseed(&adin).unwrap();

        let entropy = entropy_bytes(1, 80).slice(384, 256).unwrap();
        let seed = BitString::concat(&[&BitString::from_bytes(&[0x01]), &old_v, &entropy, &adin]);
        assert_eq!(drbg.v, derive(&seed, SEED_LEN_BITS).unwrap());
        assert_eq!(drbg.reseed_counter(), 1);
    }

    #[test]
    fn test_failed_reseed_leaves_state() {
        let mut drbg = HashDrbg::instantiate(fixed(2, 0), 256, &none()).unwrap();
        drbg.generate(64, &none()).unwrap();
        let v = drbg.v.clone();
        let counter = drbg.reseed_counter();

        assert!(matches!(
            drbg.reseed(&none()),
            Err(CryptoError::InsufficientEntropy { need: 256, got: 0 })
        ));
        assert_eq!(drbg.v, v);
        assert_eq!(drbg.reseed_counter(), counter);
        drbg.generate(64, &none()).unwrap();
    }

    #[test]
    fn test_uninstantiate() {
        let mut drbg = HashDrbg::instantiate(fixed(4, 1), 256, &none()).unwrap();
        drbg.uninstantiate();
        assert_eq!(drbg.state(), DrbgState::Uninstantiated);
        assert!(drbg.v.is_empty());
        assert!(matches!(drbg.generate(8, &none()), Err(CryptoError::NotInstantiated)));
        assert!(matches!(drbg.reseed(&none()), Err(CryptoError::NotInstantiated)));
    }

    #[test]
    fn test_generate_bytes() {
        let mut a = HashDrbg::instantiate(fixed(6, 0), 256, &none()).unwrap();
        let mut b = HashDrbg::instantiate(fixed(6, 0), 256, &none()).unwrap();
        let bytes = a.generate_bytes(40).unwrap();
        assert_eq!(bytes.len(), 40);
        assert_eq!(bytes, b.generate(320, &none()).unwrap().into_bytes());
        assert!(matches!(a.generate_bytes(0), Err(CryptoError::InvalidLength)));
    }

    #[test]
    fn test_debug_hides_state() {
        let drbg = HashDrbg::instantiate(fixed(6, 0), 256, &none()).unwrap();
        let dbg = format!("{drbg:?}");
        assert!(dbg.contains("Bits256"));
        assert!(!dbg.contains("v:"));
    }

    #[test]
    fn test_drbg_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<HashDrbg>();
    }

    #[test]
    fn test_cavp_sha256_no_reseed_count0() {
        // NIST CAVP Hash_DRBG.rsp [SHA-256], PredictionResistance = False,
        // no reseed, COUNT = 0: EntropyInput || Nonce, no personalization.
        let source = FixedEntropy::from_hex(
            "a65ad0f345db4e0effe875c3a2e71f42c7129d620ff5c119a9ef55f05185e0fb\
             8581f9317517276e06e9607ddbcbcc2e",
        )
        .unwrap();
        let mut drbg = HashDrbg::instantiate(Box::new(source), 256, &none()).unwrap();
        drbg.generate(1024, &none()).unwrap();
        let out = drbg.generate(1024, &none()).unwrap();
        assert_eq!(
            hex::encode(out.as_bytes()),
            "d3e160c35b99f340b2628264d1751060e0045da383ff57a57d73a673d2b8d80d\
             aaf6a6c35a91bb4579d73fd0c8fed111b0391306828adfed528f018121b3febd\
             c343e797b87dbb63db1333ded9d1ece177cfa6b71fe8ab1da46624ed6415e51c\
             cde2c7ca86e283990eeaeb91120415528b2295910281b02dd431f4c9f70427df"
        );
        assert_eq!(drbg.reseed_counter(), 3);
    }
}
