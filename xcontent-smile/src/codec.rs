//! Token bytes and the primitive encodings of the Smile format.

use xcontent_core::{ContentFormat, Error};

/// The first three header bytes, `:)\n`.
pub(crate) const MAGIC: [u8; 3] = [b':', b')', b'\n'];

/// Header flag: key names may be back references.
pub(crate) const FLAG_SHARED_NAMES: u8 = 0x01;
/// Header flag: short string values may be back references.
pub(crate) const FLAG_SHARED_VALUES: u8 = 0x02;
/// Header flag: raw (not 7-bit encoded) binary may occur.
pub(crate) const FLAG_RAW_BINARY: u8 = 0x04;

// value mode
pub(crate) const EMPTY_STRING: u8 = 0x20;
pub(crate) const NULL: u8 = 0x21;
pub(crate) const FALSE: u8 = 0x22;
pub(crate) const TRUE: u8 = 0x23;
pub(crate) const INT32: u8 = 0x24;
pub(crate) const INT64: u8 = 0x25;
pub(crate) const BIG_INTEGER: u8 = 0x26;
pub(crate) const FLOAT32: u8 = 0x28;
pub(crate) const FLOAT64: u8 = 0x29;
pub(crate) const BIG_DECIMAL: u8 = 0x2A;
pub(crate) const TINY_ASCII: u8 = 0x40;
pub(crate) const SHORT_ASCII: u8 = 0x60;
pub(crate) const TINY_UNICODE: u8 = 0x80;
pub(crate) const SHORT_UNICODE: u8 = 0xA0;
pub(crate) const SMALL_INT: u8 = 0xC0;
pub(crate) const LONG_ASCII: u8 = 0xE0;
pub(crate) const LONG_UNICODE: u8 = 0xE4;
pub(crate) const BINARY_7BIT: u8 = 0xE8;
pub(crate) const START_ARRAY: u8 = 0xF8;
pub(crate) const END_ARRAY: u8 = 0xF9;
pub(crate) const START_OBJECT: u8 = 0xFA;
pub(crate) const END_OBJECT: u8 = 0xFB;
pub(crate) const END_OF_STRING: u8 = 0xFC;
pub(crate) const BINARY_RAW: u8 = 0xFD;
pub(crate) const END_OF_CONTENT: u8 = 0xFF;

// key mode
pub(crate) const KEY_EMPTY: u8 = 0x20;
pub(crate) const KEY_LONG_SHARED: u8 = 0x30;
pub(crate) const KEY_LONG_NAME: u8 = 0x34;
pub(crate) const KEY_SHORT_SHARED: u8 = 0x40;
pub(crate) const KEY_SHORT_ASCII: u8 = 0x80;
pub(crate) const KEY_SHORT_UNICODE: u8 = 0xC0;

/// Back-reference tables are cleared when they reach this size.
pub(crate) const MAX_SHARED: usize = 1024;

/// Longest string value (in bytes) eligible for value sharing.
pub(crate) const MAX_SHARED_VALUE_LEN: usize = 64;

pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Error {
    Error::malformed(ContentFormat::Smile, message).at(offset)
}

pub(crate) const fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub(crate) const fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Append an unsigned variable-length integer.
///
/// Most significant group first; every byte carries 7 bits except the last,
/// which has its high bit set and carries 6.
pub(crate) fn write_vint(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 11];
    let mut at = groups.len() - 1;
    groups[at] = 0x80 | (value & 0x3F) as u8;
    value >>= 6;
    while value > 0 {
        at -= 1;
        groups[at] = (value & 0x7F) as u8;
        value >>= 7;
    }
    out.extend_from_slice(&groups[at..]);
}

/// Spread `bits` over `count` bytes of 7 bits each, most significant first.
pub(crate) fn write_7bit_number(out: &mut Vec<u8>, bits: u64, count: u32) {
    for group in (0..count).rev() {
        out.push(((bits >> (7 * group)) & 0x7F) as u8);
    }
}

/// Append `data` in the 7-bit safe encoding.
///
/// Each chunk of up to 7 bytes becomes one byte more: 7 bits per output
/// byte from the top, and the last byte holds the leftover bits
/// right-aligned.
pub(crate) fn write_7bit_binary(out: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(7) {
        let r = chunk.len() as u32;
        let bits = chunk.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        for i in 1..=r {
            out.push(((bits >> (8 * r - 7 * i)) & 0x7F) as u8);
        }
        out.push((bits & ((1 << r) - 1)) as u8);
    }
}

/// Number of encoded bytes [`write_7bit_binary`] produces for `len` bytes.
pub(crate) const fn encoded_7bit_len(len: usize) -> usize {
    let rem = len % 7;
    len / 7 * 8 + if rem > 0 { rem + 1 } else { 0 }
}

/// Decode 7-bit safe `encoded` data back into `len` raw bytes.
pub(crate) fn decode_7bit_binary(encoded: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut remaining = len;
    for chunk in encoded.chunks(8) {
        let r = remaining.min(7) as u32;
        let Some((&last, groups)) = chunk.split_last() else {
            break;
        };
        let bits = groups
            .iter()
            .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F));
        let bits = (bits << r) | u64::from(last & ((1 << r) - 1) as u8);
        for i in (0..r).rev() {
            out.push((bits >> (8 * i)) as u8);
        }
        remaining -= r as usize;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vint(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_vint(&mut out, value);
        out
    }

    #[test]
    fn vint_layout() {
        assert_eq!(vint(0), [0x80]);
        assert_eq!(vint(63), [0xBF]);
        assert_eq!(vint(64), [0x01, 0x80]);
        assert_eq!(vint(200), [0x03, 0x88]);
        assert_eq!(vint(u64::MAX).len(), 10);
    }

    #[test]
    fn zigzag() {
        for n in [0, -1, 1, -16, 15, i64::from(i32::MIN), i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(n)), n);
        }
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
    }

    #[test]
    fn float_bits_in_seven_bit_groups() {
        let mut out = Vec::new();
        write_7bit_number(&mut out, u64::from(1.0f32.to_bits()), 5);
        assert_eq!(out, [0x03, 0x7C, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn seven_bit_binary() {
        let mut out = Vec::new();
        write_7bit_binary(&mut out, b"hi");
        assert_eq!(out, [0x34, 0x1A, 0x01]);
        assert_eq!(decode_7bit_binary(&out, 2), b"hi");

        let data: Vec<u8> = (0..=255).collect();
        let mut out = Vec::new();
        write_7bit_binary(&mut out, &data);
        assert_eq!(out.len(), encoded_7bit_len(data.len()));
        assert!(out.iter().all(|b| b & 0x80 == 0));
        assert_eq!(decode_7bit_binary(&out, data.len()), data);
    }
}
