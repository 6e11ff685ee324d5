#![no_main]
use hdrbg_crypto::sha2::Sha256;
use hdrbg_types::BitString;
use libfuzzer_sys::fuzz_target;

// First byte picks a split point; hashing the two halves in sequence must
// match hashing the whole message at once.
fuzz_target!(|data: &[u8]| {
    let Some((&split, msg)) = data.split_first() else {
        return;
    };
    let whole = BitString::from_bytes(msg);
    let cut = (split as usize * 7) % (whole.len() + 1);
    let head = whole.slice(0, cut).unwrap();
    let tail = whole.slice(cut, whole.len() - cut).unwrap();

    let mut ctx = Sha256::new();
    ctx.update_bits(&head);
    ctx.update_bits(&tail);
    assert_eq!(ctx.finish(), Sha256::digest(msg));
});
