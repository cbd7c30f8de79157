// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bit-vector primitive for AIS payloads.
//!
//! AIS packs its fields MSB-first with no regard for byte boundaries. A
//! [`BitVector`] owns the packed bytes plus a logical bit length, which may be
//! shorter than the physical buffer once trailing pad bits are trimmed. Bits
//! past the logical length are always zero.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// The AIS six-bit text alphabet, indexed by six-bit value.
pub const SIXBIT_ALPHABET: &[u8; 64] =
    b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^- !\"#$%&'()*+,-./0123456789:;<=>?";

/// Errors raised when a caller reads outside the vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    #[error("bit range {start}+{width} exceeds vector length {len}")]
    OutOfRange {
        start: usize,
        width: usize,
        len: usize,
    },

    #[error("field width {0} exceeds 64 bits")]
    TooWide(usize),
}

/// Map one armor character onto its six-bit value.
///
/// The armor skips the eight ASCII codepoints between `W` and `` ` ``, so the
/// upper range is shifted down to close the gap.
#[must_use]
pub fn sixbit_value(ch: u8) -> u8 {
    let mut value = ch.wrapping_sub(48);
    if value > 40 {
        value -= 8;
    }
    value & 0x3f
}

/// Whether a byte is a legal six-bit armor character.
#[must_use]
pub fn is_armor_char(ch: u8) -> bool {
    (b'0'..=b'W').contains(&ch) || (b'`'..=b'w').contains(&ch)
}

/// Map a six-bit value back onto its armor character.
fn armor_char(value: u8) -> char {
    let value = value & 0x3f;
    char::from(if value < 40 { value + 48 } else { value + 56 })
}

/// Growable, MSB-first bit buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVector {
    bytes: Vec<u8>,
    bitlen: usize,
}

impl BitVector {
    /// Create an empty bit vector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bit vector from a six-bit armored payload.
    #[must_use]
    pub fn from_sixbit(armor: &str) -> Self {
        let mut bits = Self::new();
        bits.append_sixbit_armor(armor);
        bits
    }

    /// Logical length in bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bitlen
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bitlen == 0
    }

    /// The packed bytes, including any zeroed tail past the logical length.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Append six bits per armor character, most significant bit first.
    pub fn append_sixbit_armor(&mut self, armor: &str) {
        for ch in armor.bytes() {
            self.push_unsigned(u64::from(sixbit_value(ch)), 6);
        }
    }

    /// Append the low `width` bits of `value`, most significant bit first.
    pub fn push_unsigned(&mut self, value: u64, width: usize) {
        for i in (0..width.min(64)).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
    }

    /// Append `value` as a `width`-bit two's complement integer.
    pub fn push_signed(&mut self, value: i64, width: usize) {
        let mask = if width >= 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        self.push_unsigned(value as u64 & mask, width);
    }

    /// Append text in the six-bit alphabet, padding with `@` to `width` bits.
    ///
    /// Characters outside the alphabet are encoded as `@`.
    pub fn push_text(&mut self, text: &str, width: usize) {
        let mut chars = text.bytes();
        for _ in 0..width / 6 {
            let code = chars
                .next()
                .and_then(|c| SIXBIT_ALPHABET.iter().position(|&a| a == c))
                .unwrap_or(0);
            self.push_unsigned(code as u64, 6);
        }
    }

    fn push_bit(&mut self, bit: bool) {
        let index = self.bitlen / 8;
        if index == self.bytes.len() {
            self.bytes.push(0);
        }
        let mask = 1u8 << (7 - self.bitlen % 8);
        if bit {
            self.bytes[index] |= mask;
        } else {
            self.bytes[index] &= !mask;
        }
        self.bitlen += 1;
    }

    fn bit(&self, index: usize) -> bool {
        (self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// Shorten the logical length, zeroing the bits that fall off the end.
    pub fn truncate(&mut self, bitlen: usize) {
        if bitlen >= self.bitlen {
            return;
        }
        self.bitlen = bitlen;
        self.bytes.truncate(bitlen.div_ceil(8));
        if bitlen % 8 != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xffu8 << (8 - bitlen % 8);
            }
        }
    }

    /// Drop declared pad bits from the end of the vector.
    pub fn trim_pad(&mut self, pad: usize) {
        self.truncate(self.bitlen.saturating_sub(pad));
    }

    /// Zero-extend the logical length to at least `min_bitlen`.
    pub fn extend_to(&mut self, min_bitlen: usize) {
        if min_bitlen > self.bitlen {
            self.bytes.resize(min_bitlen.div_ceil(8), 0);
            self.bitlen = min_bitlen;
        }
    }

    /// Extract `width` bits starting at `start` as an unsigned integer.
    pub fn extract_unsigned(&self, start: usize, width: usize) -> Result<u64, BitError> {
        if width > 64 {
            return Err(BitError::TooWide(width));
        }
        let end = start + width;
        if end > self.bitlen {
            return Err(BitError::OutOfRange {
                start,
                width,
                len: self.bitlen,
            });
        }
        if width == 0 {
            return Ok(0);
        }

        // A 64-bit field straddling byte boundaries touches at most 9 bytes.
        let first = start / 8;
        let last = (end - 1) / 8;
        let mut acc: u128 = 0;
        for byte in &self.bytes[first..=last] {
            acc = (acc << 8) | u128::from(*byte);
        }
        acc >>= (last + 1) * 8 - end;

        let mask = if width == 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        Ok(acc as u64 & mask)
    }

    /// Extract `width` bits starting at `start` as a two's complement integer.
    pub fn extract_signed(&self, start: usize, width: usize) -> Result<i64, BitError> {
        let raw = self.extract_unsigned(start, width)?;
        if width == 0 || width == 64 {
            return Ok(raw as i64);
        }
        if raw & (1u64 << (width - 1)) != 0 {
            Ok((i128::from(raw) - (1i128 << width)) as i64)
        } else {
            Ok(raw as i64)
        }
    }

    /// Decode up to `width / 6` characters of six-bit text.
    ///
    /// Decoding stops at the first `@` or when the vector runs out of bits,
    /// whichever comes first; trailing spaces are trimmed.
    #[must_use]
    pub fn extract_text(&self, start: usize, width: usize) -> String {
        let mut text = String::with_capacity(width / 6);
        for i in 0..width / 6 {
            let Ok(code) = self.extract_unsigned(start + 6 * i, 6) else {
                break;
            };
            let ch = SIXBIT_ALPHABET[code as usize];
            if ch == b'@' {
                break;
            }
            text.push(char::from(ch));
        }
        text.trim_end().to_string()
    }

    /// Copy the bits from `start` to the end into a new, realigned vector.
    #[must_use]
    pub fn sub_vector_from(&self, start: usize) -> BitVector {
        let mut out = BitVector::new();
        for index in start..self.bitlen {
            out.push_bit(self.bit(index));
        }
        out
    }

    /// Re-armor the vector, returning the payload and the pad-bit count.
    #[must_use]
    pub fn to_sixbit(&self) -> (String, usize) {
        let pad = (6 - self.bitlen % 6) % 6;
        let mut padded = self.clone();
        padded.extend_to(self.bitlen + pad);

        let armor = (0..padded.len() / 6)
            .filter_map(|i| padded.extract_unsigned(i * 6, 6).ok())
            .map(|v| armor_char(v as u8))
            .collect();
        (armor, pad)
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.bitlen)?;
        for byte in &self.bytes[..self.bitlen.div_ceil(8)] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for BitVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixbit_value_mapping() {
        assert_eq!(sixbit_value(b'0'), 0);
        assert_eq!(sixbit_value(b'W'), 39);
        assert_eq!(sixbit_value(b'`'), 40);
        assert_eq!(sixbit_value(b'w'), 63);
        assert!(is_armor_char(b'1'));
        assert!(!is_armor_char(b'X'));
        assert!(!is_armor_char(b'x'));
    }

    #[test]
    fn test_append_armor_length_and_bits() {
        let bits = BitVector::from_sixbit("1w");
        assert_eq!(bits.len(), 12);
        assert_eq!(bits.extract_unsigned(0, 6).unwrap(), 1);
        assert_eq!(bits.extract_unsigned(6, 6).unwrap(), 63);
        assert_eq!(bits.as_bytes(), &[0b0000_0111, 0b1111_0000]);
    }

    #[test]
    fn test_extract_unaligned_fields() {
        let mut bits = BitVector::new();
        bits.push_unsigned(0b101, 3);
        bits.push_unsigned(371_798_000, 30);
        bits.push_unsigned(0x1_2345_6789, 37);
        assert_eq!(bits.extract_unsigned(0, 3).unwrap(), 0b101);
        assert_eq!(bits.extract_unsigned(3, 30).unwrap(), 371_798_000);
        assert_eq!(bits.extract_unsigned(33, 37).unwrap(), 0x1_2345_6789);
    }

    #[test]
    fn test_extract_full_width_unaligned() {
        let mut bits = BitVector::new();
        bits.push_unsigned(0, 5);
        bits.push_unsigned(u64::MAX - 1, 64);
        assert_eq!(bits.extract_unsigned(5, 64).unwrap(), u64::MAX - 1);
    }

    #[test]
    fn test_extract_out_of_range() {
        let bits = BitVector::from_sixbit("15");
        assert_eq!(
            bits.extract_unsigned(6, 7),
            Err(BitError::OutOfRange {
                start: 6,
                width: 7,
                len: 12
            })
        );
        assert_eq!(bits.extract_unsigned(0, 65), Err(BitError::TooWide(65)));
    }

    #[test]
    fn test_signed_round_trip_all_widths() {
        for width in 2..=64usize {
            let max = if width == 64 {
                i64::MAX
            } else {
                (1i64 << (width - 1)) - 1
            };
            let min = if width == 64 {
                i64::MIN
            } else {
                -(1i64 << (width - 1))
            };
            for value in [min, min + 1, -1, 0, 1, max - 1, max] {
                let mut bits = BitVector::new();
                bits.push_unsigned(0b1, 3);
                bits.push_signed(value, width);
                assert_eq!(
                    bits.extract_signed(3, width).unwrap(),
                    value,
                    "width {width}"
                );
            }
        }
    }

    #[test]
    fn test_sixbit_idempotence() {
        let armor = "15RTgt0PAso;90TKcjM8h6g208CQ";
        let bits = BitVector::from_sixbit(armor);
        let (rearmored, pad) = bits.to_sixbit();
        assert_eq!(rearmored, armor);
        assert_eq!(pad, 0);
    }

    #[test]
    fn test_to_sixbit_pads_partial_group() {
        let mut bits = BitVector::new();
        bits.push_unsigned(0b1111, 4);
        let (armor, pad) = bits.to_sixbit();
        assert_eq!(pad, 2);
        assert_eq!(armor, "t");
        let mut back = BitVector::from_sixbit(&armor);
        back.trim_pad(pad);
        assert_eq!(back, bits);
    }

    #[test]
    fn test_trim_pad_zeroes_tail() {
        let mut bits = BitVector::from_sixbit("w");
        bits.trim_pad(2);
        assert_eq!(bits.len(), 4);
        assert_eq!(bits.as_bytes(), &[0b1111_0000]);
        bits.extend_to(8);
        assert_eq!(bits.extract_unsigned(0, 8).unwrap(), 0b1111_0000);
    }

    #[test]
    fn test_extend_to_only_grows() {
        let mut bits = BitVector::from_sixbit("15");
        bits.extend_to(168);
        assert_eq!(bits.len(), 168);
        assert_eq!(bits.as_bytes().len(), 21);
        assert_eq!(bits.extract_unsigned(12, 64).unwrap(), 0);
        bits.extend_to(10);
        assert_eq!(bits.len(), 168);
    }

    #[test]
    fn test_sub_vector_realigns() {
        let mut bits = BitVector::new();
        bits.push_unsigned(0b11, 3);
        bits.push_unsigned(0xABCD, 16);
        bits.push_unsigned(0b1, 1);
        let sub = bits.sub_vector_from(3);
        assert_eq!(sub.len(), 17);
        assert_eq!(sub.extract_unsigned(0, 16).unwrap(), 0xABCD);
        assert_eq!(sub.to_string(), "17:abcd80");
        assert!(bits.sub_vector_from(40).is_empty());
    }

    #[test]
    fn test_extract_text_stops_at_at_sign() {
        let mut bits = BitVector::new();
        bits.push_text("EVER DIADEM", 120);
        assert_eq!(bits.extract_text(0, 120), "EVER DIADEM");

        let mut bits = BitVector::new();
        bits.push_text("AB", 12);
        bits.push_unsigned(0, 6);
        bits.push_text("CD", 12);
        assert_eq!(bits.extract_text(0, 30), "AB");
    }

    #[test]
    fn test_extract_text_trims_and_tolerates_short_vector() {
        let mut bits = BitVector::new();
        bits.push_text("HELLO  ", 42);
        assert_eq!(bits.extract_text(0, 42), "HELLO");
        assert_eq!(bits.extract_text(0, 936), "HELLO");
        assert_eq!(bits.extract_text(12, 18), "LLO");
    }

    #[test]
    fn test_display_hex_dump() {
        let bits = BitVector::from_sixbit("1w");
        assert_eq!(bits.to_string(), "12:07f0");
        assert_eq!(BitVector::new().to_string(), "0:");
    }
}
