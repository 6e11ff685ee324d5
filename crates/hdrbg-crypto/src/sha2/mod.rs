//! SHA-256 as defined in FIPS 180-4, over bit strings.
//!
//! Unlike byte-oriented implementations, the context tracks the message
//! length in bits and accepts input whose length is not a multiple of eight,
//! as required by the Hash_DRBG derivation steps that hash arbitrary bit
//! strings.

use hdrbg_types::bits::high_mask;
use hdrbg_types::{BitString, CryptoError};
use zeroize::Zeroize;

use crate::provider::Digest;

/// SHA-256 output size in bytes.
pub const SHA256_OUTPUT_SIZE: usize = 32;

/// SHA-256 block size in bytes.
pub const SHA256_BLOCK_SIZE: usize = 64;

const BLOCK_BITS: usize = SHA256_BLOCK_SIZE * 8;

/// Byte offset of the 64-bit length field in the final block.
const LENGTH_OFFSET: usize = 56;

/// Round constants: first 32 bits of the fractional parts of the cube roots
/// of the first 64 primes.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Initial hash value: first 32 bits of the fractional parts of the square
/// roots of the first 8 primes.
const H0: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

// ---------------------------------------------------------------------------
// Logical functions (FIPS 180-4 §4.1.2)
// ---------------------------------------------------------------------------

#[inline(always)]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline(always)]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline(always)]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline(always)]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

/// Process one 64-byte block.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), SHA256_BLOCK_SIZE);

    // Message schedule
    let mut w = [0u32; 64];
    for (t, word) in block.chunks_exact(4).enumerate() {
        w[t] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    }
    for t in 16..64 {
        w[t] = small_sigma1(w[t - 2])
            .wrapping_add(w[t - 7])
            .wrapping_add(small_sigma0(w[t - 15]))
            .wrapping_add(w[t - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for t in 0..64 {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K[t])
            .wrapping_add(w[t]);
        let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s = s.wrapping_add(v);
    }
    w.zeroize();
}

// ---------------------------------------------------------------------------
// SHA-256
// ---------------------------------------------------------------------------

/// SHA-256 hash context.
#[derive(Clone)]
pub struct Sha256 {
    /// Internal state (eight 32-bit words).
    state: [u32; 8],
    /// Message length so far, in bits.
    count: u64,
    /// Pending block; bits past `buffer_bits` are always zero.
    buffer: [u8; SHA256_BLOCK_SIZE],
    buffer_bits: usize,
}

impl Sha256 {
    /// Create a new SHA-256 hash context.
    pub fn new() -> Self {
        Sha256 {
            state: H0,
            count: 0,
            buffer: [0u8; SHA256_BLOCK_SIZE],
            buffer_bits: 0,
        }
    }

    /// Feed whole bytes into the hash computation.
    pub fn update(&mut self, data: &[u8]) {
        self.absorb_bytes(data);
    }

    /// Feed every bit of `bits` into the hash computation.
    pub fn update_bits(&mut self, bits: &BitString) {
        self.absorb(bits.as_bytes(), bits.len());
    }

    /// Finalize the hash and return the 32-byte digest.
    ///
    /// The context is reset afterwards and can hash a new message.
    pub fn finish(&mut self) -> [u8; SHA256_OUTPUT_SIZE] {
        self.finalize()
    }

    /// Reset the hash context for a new computation.
    pub fn reset(&mut self) {
        self.buffer.zeroize();
        *self = Sha256::new();
    }

    /// One-shot: compute the SHA-256 digest of `data`.
    pub fn digest(data: &[u8]) -> [u8; SHA256_OUTPUT_SIZE] {
        let mut ctx = Self::new();
        ctx.update(data);
        ctx.finish()
    }

    /// One-shot: compute the SHA-256 digest of a bit string.
    pub fn digest_bits(bits: &BitString) -> [u8; SHA256_OUTPUT_SIZE] {
        let mut ctx = Self::new();
        ctx.update_bits(bits);
        ctx.finish()
    }

    /// Absorb the leading `bit_len` bits of `data`.
    fn absorb(&mut self, data: &[u8], bit_len: usize) {
        let full = bit_len / 8;
        self.absorb_bytes(&data[..full]);
        let rem = bit_len % 8;
        if rem != 0 {
            self.push_bits(data[full], rem);
        }
    }

    fn absorb_bytes(&mut self, mut data: &[u8]) {
        if self.buffer_bits % 8 != 0 {
            for &b in data {
                self.push_bits(b, 8);
            }
            return;
        }

        self.count = self.count.wrapping_add((data.len() as u64).wrapping_mul(8));

        let buffered = self.buffer_bits / 8;
        if buffered > 0 {
            let take = (SHA256_BLOCK_SIZE - buffered).min(data.len());
            self.buffer[buffered..buffered + take].copy_from_slice(&data[..take]);
            data = &data[take..];
            if buffered + take < SHA256_BLOCK_SIZE {
                self.buffer_bits = (buffered + take) * 8;
                return;
            }
            compress(&mut self.state, &self.buffer);
            self.buffer = [0u8; SHA256_BLOCK_SIZE];
        }

        let mut blocks = data.chunks_exact(SHA256_BLOCK_SIZE);
        for block in &mut blocks {
            compress(&mut self.state, block);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffer_bits = rest.len() * 8;
    }

    /// Append the `n` high-order bits of `byte` (`n <= 8`).
    fn push_bits(&mut self, byte: u8, n: usize) {
        let room = BLOCK_BITS - self.buffer_bits;
        if n > room {
            self.push_bits(byte, room);
            self.push_bits(byte << room, n - room);
            return;
        }

        let byte = byte & high_mask(n);
        let idx = self.buffer_bits / 8;
        let used = self.buffer_bits % 8;
        self.buffer[idx] |= byte >> used;
        if used + n > 8 {
            self.buffer[idx + 1] |= byte << (8 - used);
        }
        self.buffer_bits += n;
        self.count = self.count.wrapping_add(n as u64);

        if self.buffer_bits == BLOCK_BITS {
            compress(&mut self.state, &self.buffer);
            self.buffer = [0u8; SHA256_BLOCK_SIZE];
            self.buffer_bits = 0;
        }
    }

    fn finalize(&mut self) -> [u8; SHA256_OUTPUT_SIZE] {
        let bit_len = self.count;

        // A single 1 bit, then zeros up to 448 mod 512
        self.push_bits(0x80, 1);
        if self.buffer_bits > LENGTH_OFFSET * 8 {
            compress(&mut self.state, &self.buffer);
            self.buffer = [0u8; SHA256_BLOCK_SIZE];
        }
        self.buffer[LENGTH_OFFSET..].copy_from_slice(&bit_len.to_be_bytes());
        compress(&mut self.state, &self.buffer);

        let mut out = [0u8; SHA256_OUTPUT_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        self.reset();
        out
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sha256 {
    fn drop(&mut self) {
        self.state.zeroize();
        self.buffer.zeroize();
    }
}

impl Digest for Sha256 {
    fn output_size(&self) -> usize {
        SHA256_OUTPUT_SIZE
    }

    fn block_size(&self) -> usize {
        SHA256_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.absorb_bytes(data);
        Ok(())
    }

    fn update_bits(&mut self, data: &[u8], bit_len: usize) -> Result<(), CryptoError> {
        let need = bit_len.div_ceil(8);
        if data.len() < need {
            return Err(CryptoError::BufferTooSmall {
                need,
                got: data.len(),
            });
        }
        self.absorb(data, bit_len);
        Ok(())
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < SHA256_OUTPUT_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: SHA256_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        out[..SHA256_OUTPUT_SIZE].copy_from_slice(&self.finalize());
        Ok(())
    }

    fn reset(&mut self) {
        Sha256::reset(self);
    }
}
