use bytes::Bytes;
use tracing::trace;

use slicebin_buf::ByteSink;

use crate::encoding::Encoding;
use crate::error::{invalid_data, CodecError, Result};
use crate::varint::{var_int62_exponent, var_uint62_encoded_size, var_uint62_exponent};

/// Width of the backpatched size slot in a slice2 tagged field.
///
/// The slot is reserved before the body is written, so its width cannot
/// depend on the body length. A 4-byte container holds lengths up to
/// `2^30 - 1` and is still a well-formed VarUInt62 to any decoder.
const TAGGED_SIZE_WIDTH: usize = 4;

/// Byte count of a bit sequence holding `bit_count` bits.
pub fn bit_sequence_byte_count(bit_count: usize) -> usize {
    (bit_count >> 3) + usize::from(bit_count & 0x07 != 0)
}

/// Encodes Slice values into a growable output buffer.
///
/// The mirror of [`Decoder`](crate::Decoder): fixed-width values are written
/// little-endian, sizes and varints use the same width rules the decoder
/// expects, and tagged fields get their length prefix backpatched after the
/// body is written.
#[derive(Debug, Default)]
pub struct Encoder {
    sink: ByteSink,
    encoding: Encoding,
}

impl Encoder {
    /// Create a slice2 encoder.
    pub fn new() -> Self {
        Self::with_encoding(Encoding::default())
    }

    /// Create an encoder with an explicit encoding version.
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            sink: ByteSink::new(),
            encoding,
        }
    }

    /// The encoding version this encoder speaks.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Current logical write position.
    pub fn position(&self) -> usize {
        self.sink.position()
    }

    /// An independent immutable copy of everything encoded so far.
    pub fn snapshot(&self) -> Bytes {
        self.sink.snapshot()
    }

    /// Consume the encoder and freeze the encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        self.sink.into_bytes()
    }

    /// Encode a bool as a single byte, 0 or 1.
    pub fn encode_bool(&mut self, value: bool) -> Result<()> {
        self.encode_u8(u8::from(value))
    }

    pub fn encode_u8(&mut self, value: u8) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_u16(&mut self, value: u16) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_u32(&mut self, value: u32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_u64(&mut self, value: u64) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_i8(&mut self, value: i8) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_i16(&mut self, value: i16) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_i32(&mut self, value: i32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_i64(&mut self, value: i64) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_f32(&mut self, value: f32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    pub fn encode_f64(&mut self, value: f64) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Encode a VarUInt62 in the smallest container the value fits.
    pub fn encode_var_uint62(&mut self, value: u64) -> Result<()> {
        let exponent = var_uint62_exponent(value)?;
        let packed = (value << 2) | u64::from(exponent);
        match exponent {
            0 => self.encode_u8(packed as u8),
            1 => self.encode_u16(packed as u16),
            2 => self.encode_u32(packed as u32),
            _ => self.encode_u64(packed),
        }
    }

    /// Encode a VarInt62 in the smallest container the value fits.
    pub fn encode_var_int62(&mut self, value: i64) -> Result<()> {
        let exponent = var_int62_exponent(value)?;
        let packed = (value << 2) | i64::from(exponent);
        match exponent {
            0 => self.encode_i8(packed as i8),
            1 => self.encode_i16(packed as i16),
            2 => self.encode_i32(packed as i32),
            _ => self.encode_i64(packed),
        }
    }

    /// Encode a VarUInt32. The type guarantees the 32-bit range.
    pub fn encode_var_uint32(&mut self, value: u32) -> Result<()> {
        self.encode_var_uint62(u64::from(value))
    }

    /// Encode a VarInt32. The type guarantees the 32-bit range.
    pub fn encode_var_int32(&mut self, value: i32) -> Result<()> {
        self.encode_var_int62(i64::from(value))
    }

    /// Encode a Size.
    ///
    /// Slice1 writes one byte for sizes below 255, otherwise `0xFF` followed
    /// by a 4-byte signed length. Slice2 writes a VarUInt62.
    pub fn encode_size(&mut self, size: usize) -> Result<()> {
        match self.encoding {
            Encoding::Slice1 => {
                if size < 255 {
                    self.encode_u8(size as u8)
                } else {
                    let value = i32::try_from(size).map_err(|_| {
                        invalid_data(format!("the size '{size}' is out of the slice1 size range"))
                    })?;
                    self.encode_u8(255)?;
                    self.encode_i32(value)
                }
            }
            Encoding::Slice2 => self.encode_var_uint62(size as u64),
        }
    }

    /// Encode the Size of the UTF-8 byte length followed by the bytes.
    /// An empty string encodes only a zero Size.
    pub fn encode_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.encode_size(bytes.len())?;
        if !bytes.is_empty() {
            self.write(bytes)?;
        }
        Ok(())
    }

    /// Encode a tagged field: VarInt32 tag, VarUInt62 body length, body.
    ///
    /// The body length is not known until `encode_fn` has run, so a
    /// fixed-width size slot is reserved first and backpatched afterwards:
    /// seek back to the slot, overwrite it with the body length, then
    /// advance past the already-written body so subsequent writes append
    /// after it. Slice2 only.
    pub fn encode_tagged<T, F>(&mut self, tag: i32, value: &T, encode_fn: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder, &T) -> Result<()>,
    {
        if self.encoding == Encoding::Slice1 {
            return Err(CodecError::Unimplemented("slice1 tagged field encoding"));
        }

        self.encode_var_int32(tag)?;

        let size_position = self.sink.position();
        self.write(&[0u8; TAGGED_SIZE_WIDTH])?;

        let start_position = self.sink.position();
        encode_fn(self, value)?;
        let current_position = self.sink.position();

        let body_len = current_position - start_position;
        if body_len >= 1 << 30 {
            return Err(invalid_data(format!(
                "tagged field body of {body_len} bytes exceeds the size prefix capacity"
            )));
        }

        self.sink.seek(size_position);
        // VarUInt62 with exponent 2: a 4-byte container regardless of value.
        self.write(&(((body_len as u32) << 2) | 2).to_le_bytes())?;
        self.sink.advance(body_len);
        trace!(tag, body_len, "backpatched tagged field size");
        Ok(())
    }

    /// Number of bytes a Size of `size` occupies under this encoding.
    pub fn size_length(&self, size: usize) -> Result<usize> {
        match self.encoding {
            Encoding::Slice1 => Ok(if size < 255 { 1 } else { 5 }),
            Encoding::Slice2 => var_uint62_encoded_size(size as u64),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write(bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Decoder;
    use crate::varint::{MAX_VAR_INT62, MAX_VAR_UINT62, MIN_VAR_INT62};

    fn slice1_encoder() -> Encoder {
        Encoder::with_encoding(Encoding::Slice1)
    }

    #[test]
    fn fixed_width_little_endian() {
        let mut encoder = Encoder::new();
        encoder.encode_u16(0x1234).unwrap();
        encoder.encode_i32(-2).unwrap();
        encoder.encode_f32(10.5).unwrap();
        assert_eq!(
            encoder.into_bytes().as_ref(),
            &[0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x28, 0x41]
        );
    }

    #[test]
    fn bool_encodes_one_byte() {
        let mut encoder = Encoder::new();
        encoder.encode_bool(true).unwrap();
        encoder.encode_bool(false).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[1, 0]);
    }

    #[test]
    fn var_uint62_wire_bytes() {
        let mut encoder = Encoder::new();
        encoder.encode_var_uint62(63).unwrap();
        encoder.encode_var_uint62(255).unwrap();
        encoder.encode_var_uint62(16384).unwrap();
        assert_eq!(
            encoder.into_bytes().as_ref(),
            &[0xFC, 0xFD, 0x03, 0x02, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn var_width_agrees_with_size_helpers() {
        for value in [
            0u64,
            (1 << 6) - 1,
            1 << 6,
            (1 << 14) - 1,
            1 << 14,
            (1 << 30) - 1,
            1 << 30,
            MAX_VAR_UINT62,
        ] {
            let mut encoder = Encoder::new();
            encoder.encode_var_uint62(value).unwrap();
            assert_eq!(
                encoder.position(),
                var_uint62_encoded_size(value).unwrap(),
                "value {value}"
            );
        }
    }

    #[test]
    fn var_int62_extremes_roundtrip() {
        let mut encoder = Encoder::new();
        encoder.encode_var_int62(MAX_VAR_INT62).unwrap();
        encoder.encode_var_int62(MIN_VAR_INT62).unwrap();
        encoder.encode_var_int62(-1).unwrap();

        let mut decoder = Decoder::new(encoder.into_bytes());
        assert_eq!(decoder.decode_var_int62().unwrap(), MAX_VAR_INT62);
        assert_eq!(decoder.decode_var_int62().unwrap(), MIN_VAR_INT62);
        assert_eq!(decoder.decode_var_int62().unwrap(), -1);
        assert!(decoder.at_end());
    }

    #[test]
    fn var_uint62_out_of_range() {
        let mut encoder = Encoder::new();
        assert!(matches!(
            encoder.encode_var_uint62(MAX_VAR_UINT62 + 1),
            Err(CodecError::InvalidData(_))
        ));
    }

    #[test]
    fn size_slice2_single_byte() {
        let mut encoder = Encoder::new();
        encoder.encode_size(12).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x30]);
    }

    #[test]
    fn size_slice1_both_branches() {
        let mut encoder = slice1_encoder();
        encoder.encode_size(5).unwrap();
        assert_eq!(encoder.snapshot().as_ref(), &[5]);

        let mut encoder = slice1_encoder();
        encoder.encode_size(300).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[255, 44, 1, 0, 0]);
    }

    #[test]
    fn string_wire_bytes() {
        let mut encoder = Encoder::new();
        encoder.encode_string("Hello world").unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(bytes[0], 0x2C);
        assert_eq!(&bytes[1..], b"Hello world");
    }

    #[test]
    fn empty_string_is_a_single_zero_size() {
        let mut encoder = Encoder::new();
        encoder.encode_string("").unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x00]);
    }

    #[test]
    fn size_length_matches_encoded_size() {
        for size in [0usize, 62, 63, 64, 254, 255, 300, 1 << 20] {
            let mut encoder = Encoder::new();
            let expected = encoder.size_length(size).unwrap();
            encoder.encode_size(size).unwrap();
            assert_eq!(encoder.position(), expected, "slice2 size {size}");

            let mut encoder = slice1_encoder();
            let expected = encoder.size_length(size).unwrap();
            encoder.encode_size(size).unwrap();
            assert_eq!(encoder.position(), expected, "slice1 size {size}");
        }
    }

    #[test]
    fn tagged_field_backpatches_body_length() {
        let mut encoder = Encoder::new();
        let begin = encoder.position();
        encoder
            .encode_tagged(3, &"Hello world".to_string(), |e, v| e.encode_string(v))
            .unwrap();
        let encoded_len = encoder.position() - begin;

        let mut decoder = Decoder::new(encoder.into_bytes());
        assert_eq!(decoder.decode_var_int32().unwrap(), 3);
        let tag_width = decoder.position();
        let body_len = decoder.decode_var_uint62().unwrap();
        let size_width = decoder.position() - tag_width;
        assert_eq!(body_len, 12); // 1 size byte + 11 UTF-8 bytes
        assert_eq!(decoder.decode_string().unwrap(), "Hello world");
        assert_eq!(decoder.position(), tag_width + size_width + body_len as usize);
        assert_eq!(encoded_len, decoder.position());
        assert!(decoder.at_end());
    }

    #[test]
    fn tagged_field_after_tagged_field_appends() {
        let mut encoder = Encoder::new();
        encoder.encode_tagged(1, &0xAAu8, |e, v| e.encode_u8(*v)).unwrap();
        encoder.encode_tagged(2, &0xBBu8, |e, v| e.encode_u8(*v)).unwrap();
        encoder.encode_var_int32(crate::TAG_END_MARKER).unwrap();

        let mut decoder = Decoder::new(encoder.into_bytes());
        let first = decoder.decode_tagged(1, None, false, |d| d.decode_u8()).unwrap();
        let second = decoder.decode_tagged(2, None, false, |d| d.decode_u8()).unwrap();
        assert_eq!((first, second), (Some(0xAA), Some(0xBB)));
    }

    #[test]
    fn tagged_encoding_rejected_under_slice1() {
        let mut encoder = slice1_encoder();
        assert!(matches!(
            encoder.encode_tagged(1, &0u8, |e, v| e.encode_u8(*v)),
            Err(CodecError::Unimplemented(_))
        ));
    }

    #[test]
    fn snapshot_does_not_consume() {
        let mut encoder = Encoder::new();
        encoder.encode_u8(1).unwrap();
        let first = encoder.snapshot();
        encoder.encode_u8(2).unwrap();
        assert_eq!(first.as_ref(), &[1]);
        assert_eq!(encoder.into_bytes().as_ref(), &[1, 2]);
    }

    #[test]
    fn end_to_end_mixed_values() {
        let mut encoder = Encoder::new();
        encoder.encode_bool(true).unwrap();
        encoder.encode_u8(255).unwrap();
        encoder.encode_var_uint62(16384).unwrap();
        encoder.encode_string("Hello world").unwrap();
        encoder.encode_f32(10.5).unwrap();

        let mut decoder = Decoder::new(encoder.into_bytes());
        assert!(decoder.decode_bool().unwrap());
        assert_eq!(decoder.decode_u8().unwrap(), 255);
        assert_eq!(decoder.decode_var_uint62().unwrap(), 16384);
        assert_eq!(decoder.decode_string().unwrap(), "Hello world");
        assert_eq!(decoder.decode_f32().unwrap(), 10.5);
        assert_eq!(decoder.unread_len(), 0);
    }
}
