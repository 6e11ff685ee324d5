#![no_main]
use hdrbg_crypto::drbg::HashDrbg;
use hdrbg_crypto::entropy::FixedEntropy;
use hdrbg_types::BitString;
use libfuzzer_sys::fuzz_target;

// Entropy, personalization and request sizes all come from the input.
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let strength = u32::from(data[0]);
    let bits = (u16::from_be_bytes([data[1], data[2]]) as usize) + 1;
    let pers_len = (data[3] as usize).min(data.len() - 4);
    let pers = BitString::from_bytes(&data[4..4 + pers_len]);
    let entropy = BitString::from_bytes(&data[4 + pers_len..]);

    let source = Box::new(FixedEntropy::new(entropy));
    if let Ok(mut drbg) = HashDrbg::instantiate(source, strength, &pers) {
        let out = drbg.generate(bits, &pers).unwrap();
        assert_eq!(out.len(), bits);
    }
});
