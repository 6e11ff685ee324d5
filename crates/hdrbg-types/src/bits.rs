//! Bit strings.
//!
//! A [`BitString`] is an ordered sequence of bits of arbitrary length, stored
//! most-significant-bit first in a byte vector. When the length is not a
//! multiple of eight, the unused low-order bits of the final byte are always
//! zero.
//!
//! Arithmetic treats a bit string of length `w` as a big-endian unsigned
//! integer of width `w`; every addition is reduced modulo `2^w` so the width
//! never changes.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroize;

use crate::CryptoError;

/// An ordered, arbitrary-length sequence of bits.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitString {
    bytes: Vec<u8>,
    bit_len: usize,
}

/// Mask selecting the `n` high-order bits of a byte. `n >= 8` selects all.
pub fn high_mask(n: usize) -> u8 {
    if n >= 8 {
        0xFF
    } else {
        !(0xFFu8 >> n)
    }
}

/// Big-endian modular addition: v = (v + addend) mod 2^(8*len(v)).
///
/// Addend bytes beyond the width of `v` fall off the top.
fn add_be_in_place(v: &mut [u8], addend: &[u8]) {
    let mut carry: u16 = 0;
    let mut addend = addend.iter().rev();
    for byte in v.iter_mut().rev() {
        let a = addend.next().copied().unwrap_or(0) as u16;
        let sum = *byte as u16 + a + carry;
        *byte = sum as u8;
        carry = sum >> 8;
    }
}

impl BitString {
    /// Create an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bit string with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        BitString {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Bit string holding every bit of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        BitString {
            bytes: bytes.to_vec(),
            bit_len: bytes.len() * 8,
        }
    }

    /// Bit string holding the leading `bit_len` bits of `bytes`.
    pub fn from_bits(bytes: &[u8], bit_len: usize) -> Result<Self, CryptoError> {
        let need = bit_len.div_ceil(8);
        if bytes.len() < need {
            return Err(CryptoError::BufferTooSmall {
                need,
                got: bytes.len(),
            });
        }
        let mut out = BitString {
            bytes: bytes[..need].to_vec(),
            bit_len,
        };
        out.clear_padding();
        Ok(out)
    }

    /// Parse a string of `'0'` and `'1'` characters.
    pub fn from_binary_str(s: &str) -> Result<Self, CryptoError> {
        let mut out = BitString::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '0' => out.push_bit(false),
                '1' => out.push_bit(true),
                _ => return Err(CryptoError::InvalidArg("bit string must contain only 0 and 1")),
            }
        }
        Ok(out)
    }

    /// Length in bits.
    pub fn len(&self) -> usize {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Whether the length is a whole number of bytes.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_len % 8 == 0
    }

    /// Backing bytes, MSB first. A partial final byte is zero-padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the bit string, returning its zero-padded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The bit at `index`, or `None` past the end.
    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len {
            return None;
        }
        Some(self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        self.push_bits(if bit { 0x80 } else { 0x00 }, 1);
    }

    /// Append the `n` high-order bits of `byte` (`n <= 8`).
    fn push_bits(&mut self, byte: u8, n: usize) {
        debug_assert!(n <= 8);
        if n == 0 {
            return;
        }
        let byte = byte & high_mask(n);
        let used = self.bit_len % 8;
        if used == 0 {
            self.bytes.push(byte);
        } else {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= byte >> used;
            if used + n > 8 {
                self.bytes.push(byte << (8 - used));
            }
        }
        self.bit_len += n;
    }

    /// Append whole bytes.
    pub fn extend_from_bytes(&mut self, bytes: &[u8]) {
        if self.is_byte_aligned() {
            self.bytes.extend_from_slice(bytes);
            self.bit_len += bytes.len() * 8;
        } else {
            for &b in bytes {
                self.push_bits(b, 8);
            }
        }
    }

    /// Append all bits of `other` (concatenation, `self || other`).
    pub fn append(&mut self, other: &BitString) {
        if self.is_byte_aligned() {
            // other's padding bits are zero, so the invariant carries over
            self.bytes.extend_from_slice(&other.bytes);
            self.bit_len += other.bit_len;
            return;
        }
        let full = other.bit_len / 8;
        for &b in &other.bytes[..full] {
            self.push_bits(b, 8);
        }
        let rem = other.bit_len % 8;
        if rem != 0 {
            self.push_bits(other.bytes[full], rem);
        }
    }

    /// Concatenation of `parts`, in order.
    pub fn concat(parts: &[&BitString]) -> BitString {
        let total = parts.iter().map(|p| p.len()).sum();
        let mut out = BitString::with_capacity(total);
        for part in parts {
            out.append(part);
        }
        out
    }

    /// Shorten to the leading `bit_len` bits. No-op if already shorter.
    pub fn truncate(&mut self, bit_len: usize) {
        if bit_len >= self.bit_len {
            return;
        }
        self.bytes[bit_len.div_ceil(8)..].zeroize();
        self.bytes.truncate(bit_len.div_ceil(8));
        self.bit_len = bit_len;
        self.clear_padding();
    }

    /// `len` bits starting at bit `start`, or `None` if out of range.
    pub fn slice(&self, start: usize, len: usize) -> Option<BitString> {
        let end = start.checked_add(len)?;
        if end > self.bit_len {
            return None;
        }
        if start % 8 == 0 {
            return BitString::from_bits(&self.bytes[start / 8..], len).ok();
        }
        let mut out = BitString::with_capacity(len);
        for i in start..end {
            out.push_bit(self.bytes[i / 8] & (0x80 >> (i % 8)) != 0);
        }
        Some(out)
    }

    /// Lowercase hex of the backing bytes (a partial final byte is
    /// rendered with its zero padding).
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// self = (self + addend) mod 2^len, with `addend` a big-endian integer.
    pub fn wrapping_add_be(&mut self, addend: &[u8]) {
        if self.bit_len == 0 {
            return;
        }
        let pad = self.padding_bits();
        if pad == 0 {
            add_be_in_place(&mut self.bytes, addend);
            return;
        }
        // Scale the addend by 2^pad so it lines up with the stored value,
        // whose low `pad` bits are zero.
        let mut shifted = Vec::with_capacity(addend.len() + 1);
        shifted.push(0);
        shifted.extend_from_slice(addend);
        let mut carry = 0u8;
        for b in shifted.iter_mut().rev() {
            let next = *b >> (8 - pad);
            *b = (*b << pad) | carry;
            carry = next;
        }
        add_be_in_place(&mut self.bytes, &shifted);
        shifted.zeroize();
    }

    /// self = (self + val) mod 2^len.
    pub fn wrapping_add_u64(&mut self, val: u64) {
        self.wrapping_add_be(&val.to_be_bytes());
    }

    /// self = (self + other) mod 2^len, reading `other` as an integer of
    /// its own width.
    pub fn wrapping_add(&mut self, other: &BitString) {
        let pad = other.padding_bits();
        if pad == 0 {
            self.wrapping_add_be(&other.bytes);
            return;
        }
        let mut value = vec![0u8; other.bytes.len()];
        let mut carry = 0u8;
        for (dst, &src) in value.iter_mut().zip(&other.bytes) {
            *dst = (src >> pad) | carry;
            carry = src << (8 - pad);
        }
        self.wrapping_add_be(&value);
        value.zeroize();
    }

    /// Number of unused low-order bits in the final byte.
    fn padding_bits(&self) -> usize {
        (8 - self.bit_len % 8) % 8
    }

    fn clear_padding(&mut self) {
        let rem = self.bit_len % 8;
        if rem != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= high_mask(rem);
            }
        }
    }
}

impl Zeroize for BitString {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
        self.bit_len = 0;
    }
}

impl From<&[u8]> for BitString {
    fn from(bytes: &[u8]) -> Self {
        BitString::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for BitString {
    fn from(bytes: Vec<u8>) -> Self {
        let bit_len = bytes.len() * 8;
        BitString { bytes, bit_len }
    }
}

impl FromStr for BitString {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BitString::from_binary_str(s)
    }
}

/// Renders as `0`/`1` characters.
impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.bit_len {
            let set = self.bytes[i / 8] & (0x80 >> (i % 8)) != 0;
            f.write_str(if set { "1" } else { "0" })?;
        }
        Ok(())
    }
}

// Contents stay out of Debug output; bit strings routinely carry secrets.
impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitString")
            .field("bit_len", &self.bit_len)
            .finish_non_exhaustive()
    }
}
