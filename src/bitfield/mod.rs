//! Bit-addressable codecs for packed ECU configuration records
//!
//! Several configuration records exchanged over ReadDataByIdentifier /
//! WriteDataByIdentifier pack integer fields at arbitrary, non-byte-aligned
//! offsets. This module exposes such records as an ordered bit sequence with
//! `get_value`/`set_value` field accessors.
//!
//! Two orderings exist in the wild and are deliberately kept as two distinct
//! types, because mixing them up silently corrupts a record:
//!
//! - [`MsbFirstBits`] - most-significant bit first within each byte, natural
//!   byte order. Used for the long configuration records (e.g. 0xDE01).
//! - [`LsbReversedBits`] - least-significant bit first within each byte,
//!   byte order reversed. Used for the short status/command records passed
//!   to InputOutputControlByIdentifier.
//!
//! Both round-trip exactly: decoding a buffer and re-encoding it unmodified
//! reproduces the original bytes. When a bit sequence is not a multiple of
//! eight bits long, the encoder right-pads the final byte with zero bits;
//! this is the only implicit padding anywhere in the codec.

use thiserror::Error;

/// Errors from field access on a bit stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BitFieldError {
    /// The field mask is not of the form `2^n - 1`.
    #[error("invalid field mask 0x{0:X}: mask + 1 must be a power of two")]
    InvalidMask(u32),

    /// The field extends past the end of the buffer.
    #[error("field at bit {offset} with width {width} exceeds {len} bits")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },
}

/// Field width in bits for a contiguous low-bit mask.
///
/// `mask` must be `2^n - 1` (e.g. `0x01`, `0x07`, `0xFF`); anything else is
/// a caller bug and is rejected rather than guessed at.
fn mask_width(mask: u32) -> Result<usize, BitFieldError> {
    if !(mask as u64 + 1).is_power_of_two() {
        return Err(BitFieldError::InvalidMask(mask));
    }
    Ok(mask.count_ones() as usize)
}

fn check_range(offset: usize, width: usize, len: usize) -> Result<(), BitFieldError> {
    if offset + width > len {
        return Err(BitFieldError::OutOfRange { offset, width, len });
    }
    Ok(())
}

/// MSB-first bit view over a byte buffer in natural byte order.
///
/// Bit 0 is the most significant bit of the first byte. Field values are
/// read and written most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsbFirstBits {
    bits: Vec<bool>,
}

impl MsbFirstBits {
    /// Decode a byte buffer into its bit sequence.
    pub fn new(bytes: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for &byte in bytes {
            for shift in (0..8).rev() {
                bits.push((byte >> shift) & 0x1 != 0);
            }
        }
        Self { bits }
    }

    /// Build directly from a bit sequence, e.g. one produced by hand in
    /// tests. `to_bytes` zero-pads if the length is not a multiple of 8.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Number of addressable bits.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Re-encode to bytes, right-padding the final partial byte with zeros.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.bits.len().div_ceil(8));
        for chunk in self.bits.chunks(8) {
            let mut byte = 0u8;
            for i in 0..8 {
                let bit = chunk.get(i).copied().unwrap_or(false);
                byte = (byte << 1) | bit as u8;
            }
            bytes.push(byte);
        }
        bytes
    }

    /// Read `log2(mask + 1)` bits starting at `offset`, MSB first.
    pub fn get_value(&self, offset: usize, mask: u32) -> Result<u32, BitFieldError> {
        let width = mask_width(mask)?;
        check_range(offset, width, self.bits.len())?;
        let mut value = 0u32;
        for &bit in &self.bits[offset..offset + width] {
            value = (value << 1) | bit as u32;
        }
        Ok(value)
    }

    /// Overwrite `log2(mask + 1)` bits starting at `offset`, MSB first.
    /// Bits of `value` above the field width are ignored.
    pub fn set_value(&mut self, offset: usize, mask: u32, value: u32) -> Result<(), BitFieldError> {
        let width = mask_width(mask)?;
        check_range(offset, width, self.bits.len())?;
        for i in 0..width {
            self.bits[offset + i] = (value >> (width - 1 - i)) & 0x1 != 0;
        }
        Ok(())
    }
}

/// LSB-first bit view over a byte buffer in reversed byte order.
///
/// Bit 0 is the least significant bit of the *last* byte. Field values are
/// read and written least significant bit first. Not interchangeable with
/// [`MsbFirstBits`]; the short I/O-control records use this layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsbReversedBits {
    bits: Vec<bool>,
}

impl LsbReversedBits {
    /// Decode a byte buffer into its bit sequence.
    pub fn new(bytes: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for &byte in bytes.iter().rev() {
            for shift in 0..8 {
                bits.push((byte >> shift) & 0x1 != 0);
            }
        }
        Self { bits }
    }

    /// Build directly from a bit sequence.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Number of addressable bits.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Re-encode to bytes, right-padding the final partial byte with zeros.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.bits.len().div_ceil(8));
        for chunk in self.bits.chunks(8) {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                byte |= (bit as u8) << i;
            }
            bytes.push(byte);
        }
        bytes.reverse();
        bytes
    }

    /// Read `log2(mask + 1)` bits starting at `offset`, LSB first.
    pub fn get_value(&self, offset: usize, mask: u32) -> Result<u32, BitFieldError> {
        let width = mask_width(mask)?;
        check_range(offset, width, self.bits.len())?;
        let mut value = 0u32;
        for (i, &bit) in self.bits[offset..offset + width].iter().enumerate() {
            value |= (bit as u32) << i;
        }
        Ok(value)
    }

    /// Overwrite `log2(mask + 1)` bits starting at `offset`, LSB first.
    /// Bits of `value` above the field width are ignored.
    pub fn set_value(&mut self, offset: usize, mask: u32, value: u32) -> Result<(), BitFieldError> {
        let width = mask_width(mask)?;
        check_range(offset, width, self.bits.len())?;
        for i in 0..width {
            self.bits[offset + i] = (value >> i) & 0x1 != 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn msb_round_trip() {
        let data = [0x00, 0x38, 0x08, 0xA0, 0x50];
        assert_eq!(MsbFirstBits::new(&data).to_bytes(), data);
    }

    #[test]
    fn lsb_reversed_round_trip() {
        let data = [0x00, 0x38, 0x08, 0xA0, 0x50];
        assert_eq!(LsbReversedBits::new(&data).to_bytes(), data);
    }

    #[test]
    fn partial_byte_is_zero_padded() {
        let bits = vec![true, false, true, true];
        assert_eq!(MsbFirstBits::from_bits(bits.clone()).to_bytes(), [0xB0]);
        assert_eq!(LsbReversedBits::from_bits(bits).to_bytes(), [0x0D]);
    }

    #[test]
    fn bits_survive_byte_round_trip() {
        let bits = vec![true, false, true, true, true, false, true, true];
        let stream = MsbFirstBits::from_bits(bits.clone());
        assert_eq!(MsbFirstBits::new(&stream.to_bytes()), stream);
        let stream = LsbReversedBits::from_bits(bits);
        assert_eq!(LsbReversedBits::new(&stream.to_bytes()), stream);
    }

    // Field cases recorded from a 2015-model body control module 0xDE00
    // record: (offset, mask, value in stock buffer, modified buffer).
    #[rstest]
    #[case(19, 3, 0x2, [0x00, 0x38, 0x08, 0xA0, 0x50], 0x1)] // turn signal flashes
    #[case(26, 7, 0x4, [0x00, 0x38, 0x10, 0xA8, 0x50], 0x5)] // head light level
    #[case(16, 7, 0x0, [0x00, 0x38, 0x50, 0xA0, 0x50], 0x2)] // head light off timer
    #[case(24, 3, 0x2, [0x00, 0x38, 0x10, 0x60, 0x50], 0x1)] // rain wiper
    #[case(11, 3, 0x3, [0x00, 0x28, 0x10, 0xA0, 0x50], 0x1)] // interior light
    #[case(32, 7, 0x2, [0x00, 0x38, 0x10, 0xA0, 0x70], 0x3)] // coming light
    fn msb_field_mutation(
        #[case] offset: usize,
        #[case] mask: u32,
        #[case] stock_value: u32,
        #[case] modified: [u8; 5],
        #[case] new_value: u32,
    ) {
        let stock = [0x00, 0x38, 0x10, 0xA0, 0x50];
        let mut stream = MsbFirstBits::new(&stock);
        assert_eq!(stream.get_value(offset, mask).unwrap(), stock_value);

        stream.set_value(offset, mask, new_value).unwrap();
        assert_eq!(stream.to_bytes(), modified);
        assert_eq!(stream.get_value(offset, mask).unwrap(), new_value);

        // Only the addressed field changed.
        assert_eq!(MsbFirstBits::new(&modified).get_value(offset, mask).unwrap(), new_value);
    }

    #[test]
    fn set_then_get_masks_value() {
        let mut stream = MsbFirstBits::new(&[0x00, 0x38, 0x10, 0xA0, 0x50]);
        stream.set_value(19, 3, 0xFF).unwrap();
        assert_eq!(stream.get_value(19, 3).unwrap(), 0x3);
    }

    #[test]
    fn lsb_reversed_field_write() {
        // Door lock command record: one byte at bit offset 16 of a 7-byte
        // all-zero buffer lands in output byte 4.
        let mut stream = LsbReversedBits::new(&[0x00; 7]);
        stream.set_value(16, 255, 4).unwrap();
        assert_eq!(stream.to_bytes(), [0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00]);
        assert_eq!(stream.get_value(16, 255).unwrap(), 4);
    }

    #[test]
    fn non_contiguous_mask_rejected() {
        let mut stream = MsbFirstBits::new(&[0xFF]);
        assert_eq!(stream.get_value(0, 6), Err(BitFieldError::InvalidMask(6)));
        assert_eq!(stream.set_value(0, 6, 1), Err(BitFieldError::InvalidMask(6)));
        let stream = LsbReversedBits::new(&[0xFF]);
        assert_eq!(stream.get_value(0, 6), Err(BitFieldError::InvalidMask(6)));
    }

    #[test]
    fn out_of_range_field_rejected() {
        let stream = MsbFirstBits::new(&[0xFF, 0xFF]);
        assert_eq!(
            stream.get_value(14, 7),
            Err(BitFieldError::OutOfRange {
                offset: 14,
                width: 3,
                len: 16
            })
        );
        // The last in-range field is fine.
        assert_eq!(stream.get_value(13, 7).unwrap(), 0x7);
    }
}
