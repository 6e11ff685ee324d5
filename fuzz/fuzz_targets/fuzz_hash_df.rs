#![no_main]
use hdrbg_crypto::drbg::hash_df::derive;
use hdrbg_types::BitString;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let requested = u16::from_be_bytes([data[0], data[1]]) as usize;
    let input = BitString::from_bytes(&data[2..]);
    match derive(&input, requested) {
        Ok(out) => assert_eq!(out.len(), requested),
        Err(_) => assert!(requested == 0 || requested > 255 * 256),
    }
});
