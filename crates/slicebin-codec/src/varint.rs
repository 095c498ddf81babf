//! Width selection and wire math for the 2-bit length-exponent varint scheme.
//!
//! A VarUInt62/VarInt62 is stored in the smallest of 1, 2, 4 or 8 bytes such
//! that `value << 2` fits; the low 2 bits of the first byte hold
//! `log2(width)`. These helpers are free functions with no hidden state so
//! they can be used without constructing a decoder or encoder.

use crate::error::{invalid_data, Result};

/// Smallest value a VarInt62 can represent.
pub const MIN_VAR_INT62: i64 = -(1 << 61);
/// Largest value a VarInt62 can represent.
pub const MAX_VAR_INT62: i64 = (1 << 61) - 1;
/// Largest value a VarUInt62 can represent.
pub const MAX_VAR_UINT62: u64 = (1 << 62) - 1;

/// Length exponent (0..=3, meaning width `1 << exponent`) of the encoding
/// of an unsigned value.
pub fn var_uint62_exponent(value: u64) -> Result<u8> {
    if value > MAX_VAR_UINT62 {
        return Err(invalid_data(format!(
            "the value '{value}' is out of the varuint62 accepted range"
        )));
    }
    Ok(if value < 1 << 6 {
        0
    } else if value < 1 << 14 {
        1
    } else if value < 1 << 30 {
        2
    } else {
        3
    })
}

/// Length exponent (0..=3) of the encoding of a signed value.
pub fn var_int62_exponent(value: i64) -> Result<u8> {
    if !(MIN_VAR_INT62..=MAX_VAR_INT62).contains(&value) {
        return Err(invalid_data(format!(
            "the value '{value}' is out of the varint62 accepted range"
        )));
    }
    Ok(if (-(1 << 5)..1 << 5).contains(&value) {
        0
    } else if (-(1 << 13)..1 << 13).contains(&value) {
        1
    } else if (-(1 << 29)..1 << 29).contains(&value) {
        2
    } else {
        3
    })
}

/// Encoded byte width (1, 2, 4 or 8) of an unsigned value.
pub fn var_uint62_encoded_size(value: u64) -> Result<usize> {
    Ok(1 << var_uint62_exponent(value)?)
}

/// Encoded byte width (1, 2, 4 or 8) of a signed value.
pub fn var_int62_encoded_size(value: i64) -> Result<usize> {
    Ok(1 << var_int62_exponent(value)?)
}

/// Width of a varint given the first byte of its encoding.
pub fn varint_width_from_first_byte(byte: u8) -> usize {
    1 << (byte & 0x03)
}
