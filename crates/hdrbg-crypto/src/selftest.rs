//! Power-on self tests.
//!
//! Each check runs one computation with a known input and compares the
//! result against a published or structurally required value. The first
//! mismatch aborts the run with [`CryptoError::SelfTestFailure`].

use hdrbg_types::{BitString, CryptoError};

use crate::drbg::hash_df::derive;
use crate::drbg::{DrbgConfig, DrbgState, HashDrbg};
use crate::entropy::health::{AptTest, HealthTest, RctTest};
use crate::entropy::FixedEntropy;
use crate::sha2::Sha256;

fn fail(msg: impl Into<String>) -> CryptoError {
    CryptoError::SelfTestFailure(msg.into())
}

fn unhex(s: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(s).map_err(|e| fail(format!("bad test vector: {e}")))
}

/// Run every self test. Returns on first failure.
pub fn run_self_tests() -> Result<(), CryptoError> {
    kat_sha256()?;
    check_bit_padding()?;
    check_hash_df()?;
    kat_hash_drbg()?;
    check_hash_drbg()?;
    kat_entropy_health()?;
    Ok(())
}

/// SHA-256 KATs (FIPS 180-4 examples, NIST CAVP SHAVS).
fn kat_sha256() -> Result<(), CryptoError> {
    let vectors: [(&[u8], &str); 3] = [
        (
            b"",
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        ),
        (
            b"abc",
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        ),
        (
            b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq",
            "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1",
        ),
    ];
    for (msg, expected) in vectors {
        if Sha256::digest(msg)[..] != unhex(expected)?[..] {
            return Err(fail(format!("SHA-256 digest mismatch ({} bytes)", msg.len())));
        }
    }

    let msg = unhex("5738c929c4f4ccb6")?;
    let expected = unhex("963bb88f27f512777aab6c8b1a02c70ec0ad651d428f870036e1917120fb48bf")?;
    if Sha256::digest(&msg)[..] != expected[..] {
        return Err(fail("SHA-256 CAVP digest mismatch"));
    }
    Ok(())
}

/// The bit-oriented path must agree with the byte path on whole bytes and
/// must separate messages that differ only in length.
fn check_bit_padding() -> Result<(), CryptoError> {
    let abc = BitString::from_bytes(b"abc");
    if Sha256::digest_bits(&abc) != Sha256::digest(b"abc") {
        return Err(fail("SHA-256 bit path disagrees with byte path"));
    }

    let mut short = abc.clone();
    short.truncate(23);
    if Sha256::digest_bits(&short) == Sha256::digest(b"abc") {
        return Err(fail("SHA-256 ignores message bit length"));
    }
    Ok(())
}

/// derive(x, 256) == SHA-256(0x01 || be32(256) || x).
fn check_hash_df() -> Result<(), CryptoError> {
    let x = BitString::from_bytes(b"hash_df self test");
    let derived = derive(&x, 256)?;

    let mut h = Sha256::new();
    h.update(&[0x01, 0x00, 0x00, 0x01, 0x00]);
    h.update_bits(&x);
    if derived.as_bytes() != &h.finish()[..] {
        return Err(fail("Hash_df single-block mismatch"));
    }

    if derive(&x, 440)?.len() != 440 {
        return Err(fail("Hash_df output length mismatch"));
    }
    Ok(())
}

/// Hash_DRBG KAT (NIST CAVP Hash_DRBG.rsp, SHA-256, no prediction
/// resistance, no reseed, COUNT = 0). The second 1024-bit output is checked.
fn kat_hash_drbg() -> Result<(), CryptoError> {
    let entropy = unhex("a65ad0f345db4e0effe875c3a2e71f42c7129d620ff5c119a9ef55f05185e0fb")?;
    let nonce = unhex("8581f9317517276e06e9607ddbcbcc2e")?;
    let expected = unhex(
        "d3e160c35b99f340b2628264d1751060e0045da383ff57a57d73a673d2b8d80d\
         aaf6a6c35a91bb4579d73fd0c8fed111b0391306828adfed528f018121b3febd\
         c343e797b87dbb63db1333ded9d1ece177cfa6b71fe8ab1da46624ed6415e51c\
         cde2c7ca86e283990eeaeb91120415528b2295910281b02dd431f4c9f70427df",
    )?;

    let source = FixedEntropy::new(BitString::concat(&[
        &BitString::from_bytes(&entropy),
        &BitString::from_bytes(&nonce),
    ]));
    let none = BitString::new();
    let mut drbg = HashDrbg::instantiate(Box::new(source), 256, &none)?;
    drbg.generate(1024, &none)?;
    if drbg.generate(1024, &none)?.as_bytes() != &expected[..] {
        return Err(fail("Hash_DRBG CAVP output mismatch"));
    }
    Ok(())
}

/// Two instances over the same fixed entropy must agree, successive outputs
/// must differ, and the reseed interval must be enforced.
fn check_hash_drbg() -> Result<(), CryptoError> {
    let entropy = BitString::from_bytes(&[0x5Cu8; 80]);
    let pers = BitString::from_bytes(b"self test");
    let config = DrbgConfig {
        reseed_interval: 2,
        ..Default::default()
    };
    let mk = || {
        HashDrbg::instantiate_with_config(
            config.clone(),
            Box::new(FixedEntropy::new(entropy.clone())),
            256,
            &pers,
        )
    };

    let mut a = mk()?;
    let mut b = mk()?;
    let none = BitString::new();

    let a1 = a.generate(512, &none)?;
    if a1 != b.generate(512, &none)? {
        return Err(fail("Hash_DRBG is not deterministic"));
    }
    let a2 = a.generate(512, &none)?;
    if a1 == a2 {
        return Err(fail("Hash_DRBG repeated its output"));
    }

    match a.generate(512, &none) {
        Err(CryptoError::ReseedRequired) if a.state() == DrbgState::NeedsReseed => {}
        _ => return Err(fail("Hash_DRBG reseed interval not enforced")),
    }
    a.reseed(&none)?;
    a.generate(512, &none)?;
    Ok(())
}

/// The health tests must catch a stuck source and a biased source, and must
/// pass a varied one.
fn kat_entropy_health() -> Result<(), CryptoError> {
    let mut rct = RctTest::new(5);
    if (0..10).all(|_| rct.test(0x42).is_ok()) {
        return Err(fail("entropy RCT failed to detect stuck source"));
    }

    let mut apt = AptTest::new(20, 15);
    if (0..20).all(|_| apt.test(0x42).is_ok()) {
        return Err(fail("entropy APT failed to detect biased source"));
    }

    let mut ht = HealthTest::with_defaults();
    for i in 0u32..1000 {
        ht.test_sample(i as u8)
            .map_err(|e| fail(format!("entropy health test failed on varied data: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_tests_pass() {
        run_self_tests().unwrap();
    }

    #[test]
    fn test_individual_checks_pass() {
        kat_sha256().unwrap();
        check_bit_padding().unwrap();
        check_hash_df().unwrap();
        kat_hash_drbg().unwrap();
        check_hash_drbg().unwrap();
        kat_entropy_health().unwrap();
    }

    #[test]
    fn test_bad_vector_is_reported() {
        let err = unhex("zz").unwrap_err();
        assert!(err.to_string().starts_with("self-test failed: bad test vector"));
    }
}
