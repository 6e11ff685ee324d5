//! End-to-end Hash_DRBG scenarios driven through the public API only.

use std::sync::{Arc, Mutex};
use std::thread;

use hdrbg_crypto::drbg::hash_df::derive;
use hdrbg_crypto::drbg::{DrbgConfig, DrbgState, HashDrbg, SEED_LEN_BITS};
use hdrbg_crypto::entropy::{EntropySource, FixedEntropy, SystemEntropy};
use hdrbg_crypto::sha2::Sha256;
use hdrbg_crypto::{BitString, CryptoError, SecurityStrength};

/// A 472-bit captured noise sample, deliberately not a whole number of bytes.
const CAPTURED_NOISE: &str = "\
1100011000100110101011010100000101110010011001011101111100000010\
1100001001001000000001111010001110110011000000000000111000010011\
1000100100111100011101101011111111010101111011111111101110101101\
0000101110010101110000011001001111001110110110011010101010010000\
1010111111100001110000001110111010010010001010010110001111100111\
0000111101101000010111010000110011110010011010101001111010000110\
1000000111001111000000110001110011010011100100000011000010000100\
100000000110011000101001";

fn captured() -> BitString {
    CAPTURED_NOISE.parse().unwrap()
}

fn none() -> BitString {
    BitString::new()
}

fn fixed_drbg(strength: u32, pers: &BitString) -> HashDrbg {
    HashDrbg::instantiate(Box::new(FixedEntropy::new(captured())), strength, pers).unwrap()
}

#[test]
fn captured_noise_is_472_bits() {
    assert_eq!(captured().len(), 472);
}

#[test]
fn fixed_entropy_scenario_end_to_end() {
    let pers = BitString::from_bytes(b"end-to-end");
    let mut drbg = fixed_drbg(128, &pers);
    assert_eq!(drbg.security_strength(), SecurityStrength::Bits128);

    // Entropy input and nonce are the first 128 + 64 bits of the stream
    let seed = BitString::concat(&[&captured().slice(0, 192).unwrap(), &pers]);
    let v = derive(&seed, SEED_LEN_BITS).unwrap();
    let first = drbg.generate(256, &none()).unwrap();
    assert_eq!(first.as_bytes(), &Sha256::digest_bits(&v));

    // Two reseeds of 128 bits each fit in what is left (472 - 192 = 280)
    drbg.reseed(&none()).unwrap();
    drbg.reseed(&BitString::from_binary_str("01").unwrap()).unwrap();
    assert!(matches!(
        drbg.reseed(&none()),
        Err(CryptoError::InsufficientEntropy { need: 128, got: 24 })
    ));
    assert_eq!(drbg.generate(1000, &none()).unwrap().len(), 1000);
}

#[test]
fn two_outputs_differ_and_replay_exactly() {
    let mut drbg = fixed_drbg(256, &none());
    let first = drbg.generate(256, &none()).unwrap();
    let second = drbg.generate(256, &none()).unwrap();
    assert_eq!(first.len(), 256);
    assert_eq!(second.len(), 256);
    assert_ne!(first, second);

    let mut replay = fixed_drbg(256, &none());
    assert_eq!(replay.generate(256, &none()).unwrap().as_bytes(), first.as_bytes());
    assert_eq!(replay.generate(256, &none()).unwrap().as_bytes(), second.as_bytes());
}

#[test]
fn identical_inputs_give_identical_streams() {
    let pers = BitString::from_binary_str("10110").unwrap();
    let adin = BitString::from_bytes(b"adin");
    let mut a = fixed_drbg(256, &pers);
    let mut b = fixed_drbg(256, &pers);
    for bits in [1usize, 7, 256, 440, 4096] {
        assert_eq!(
            a.generate(bits, &adin).unwrap(),
            b.generate(bits, &adin).unwrap()
        );
    }
}

#[test]
fn outputs_are_not_degenerate() {
    let mut drbg = HashDrbg::instantiate(Box::new(SystemEntropy), 256, &none()).unwrap();
    let mut seen = Vec::new();
    for _ in 0..32 {
        let out = drbg.generate(256, &none()).unwrap();
        assert!(out.as_bytes().iter().any(|&b| b != 0));
        assert!(!seen.contains(&out));
        seen.push(out);
    }

    // Roughly half the bits of a long output are set
    let long = drbg.generate(1 << 16, &none()).unwrap();
    let ones: u32 = long.as_bytes().iter().map(|b| b.count_ones()).sum();
    assert!((31_000..34_500).contains(&ones), "ones = {ones}");
}

#[test]
fn reseed_interval_then_recovery() {
    let config = DrbgConfig {
        reseed_interval: 4,
        ..Default::default()
    };
    let mut drbg =
        HashDrbg::instantiate_with_config(config, Box::new(SystemEntropy), 192, &none()).unwrap();
    for _ in 0..4 {
        drbg.generate(64, &none()).unwrap();
    }
    let err = drbg.generate(64, &none()).unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(drbg.state(), DrbgState::NeedsReseed);

    drbg.reseed(&BitString::from_bytes(b"fresh")).unwrap();
    assert_eq!(drbg.reseed_counter(), 1);
    drbg.generate(64, &none()).unwrap();
}

#[test]
fn boundary_requests_are_rejected() {
    let mut a = fixed_drbg(256, &none());
    let mut b = fixed_drbg(256, &none());

    assert!(matches!(
        a.generate((1 << 19) + 1, &none()),
        Err(CryptoError::RequestedBitsExceedsMax { .. })
    ));
    assert!(matches!(a.generate(0, &none()), Err(CryptoError::InvalidLength)));

    // The rejected calls left `a` in step with the untouched `b`
    assert_eq!(a.generate(1 << 19, &none()).unwrap(), b.generate(1 << 19, &none()).unwrap());
}

#[test]
fn oversized_strength_and_inputs_are_rejected() {
    assert!(matches!(
        HashDrbg::instantiate(Box::new(SystemEntropy), 384, &none()),
        Err(CryptoError::InvalidSecurityStrength { requested: 384, max: 256 })
    ));

    let config = DrbgConfig {
        max_personalization_bits: 64,
        max_additional_input_bits: 64,
        ..Default::default()
    };
    let long = BitString::from_bytes(&[0u8; 9]);
    assert!(matches!(
        HashDrbg::instantiate_with_config(config.clone(), Box::new(SystemEntropy), 256, &long),
        Err(CryptoError::PersonalizationTooLong)
    ));
    let mut drbg =
        HashDrbg::instantiate_with_config(config, Box::new(SystemEntropy), 256, &none()).unwrap();
    assert!(matches!(drbg.reseed(&long), Err(CryptoError::AdditionalInputTooLong)));
    assert!(matches!(
        drbg.generate(8, &long),
        Err(CryptoError::AdditionalInputTooLong)
    ));
}

/// A source that hands out nothing.
struct EmptySource;

impl EntropySource for EmptySource {
    fn get_entropy(&mut self, min_bits: usize) -> Result<BitString, CryptoError> {
        Err(CryptoError::InsufficientEntropy {
            need: min_bits,
            got: 0,
        })
    }
}

#[test]
fn failing_source_blocks_instantiation() {
    assert!(matches!(
        HashDrbg::instantiate(Box::new(EmptySource), 256, &none()),
        Err(CryptoError::InsufficientEntropy { need: 256, got: 0 })
    ));
}

#[test]
fn shared_instance_behind_mutex() {
    let drbg = Arc::new(Mutex::new(
        HashDrbg::instantiate(Box::new(SystemEntropy), 256, &none()).unwrap(),
    ));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let drbg = Arc::clone(&drbg);
            thread::spawn(move || {
                (0..16)
                    .map(|_| drbg.lock().unwrap().generate(128, &BitString::new()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = Vec::new();
    for h in handles {
        all.extend(h.join().unwrap());
    }
    assert_eq!(all.len(), 64);
    for (i, out) in all.iter().enumerate() {
        assert!(!all[i + 1..].contains(out));
    }
    assert_eq!(drbg.lock().unwrap().reseed_counter(), 65);
}
