use bytes::Bytes;
use tracing::trace;

use slicebin_buf::ByteCursor;

use crate::encoding::Encoding;
use crate::error::{invalid_data, CodecError, Result};
use crate::tag::{TagFormat, SLICE1_EXTENDED_TAG, SLICE1_TAG_END_MARKER, TAG_END_MARKER};
use crate::encoder::bit_sequence_byte_count;
use crate::varint::varint_width_from_first_byte;

/// Decodes Slice-encoded values from a complete in-memory buffer.
///
/// All reads are sequential through an internal cursor; a failed read leaves
/// the cursor where it was. A failure inside the tagged-field scan leaves
/// the cursor at an undefined position and the decoder should be discarded.
#[derive(Debug)]
pub struct Decoder {
    cursor: ByteCursor,
    encoding: Encoding,
}

impl Decoder {
    /// Create a slice2 decoder over `buffer`.
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self::with_encoding(buffer, Encoding::default())
    }

    /// Create a decoder with an explicit encoding version.
    pub fn with_encoding(buffer: impl Into<Bytes>, encoding: Encoding) -> Self {
        Self {
            cursor: ByteCursor::new(buffer),
            encoding,
        }
    }

    /// The encoding version this decoder speaks.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Current position in the buffer.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Number of bytes left to decode.
    pub fn unread_len(&self) -> usize {
        self.cursor.unread_len()
    }

    /// Whether the whole buffer has been consumed.
    pub fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    /// Decode a bool. Any byte other than 0 or 1 is invalid.
    pub fn decode_bool(&mut self) -> Result<bool> {
        match self.decode_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(invalid_data(format!(
                "the value '{value}' is out of the bool accepted range"
            ))),
        }
    }

    pub fn decode_u8(&mut self) -> Result<u8> {
        Ok(u8::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.cursor.read_array()?))
    }

    pub fn decode_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.cursor.read_array()?))
    }

    /// Decode a VarUInt62. The low 2 bits of the first byte select the
    /// container width; the value is the container shifted right by 2.
    pub fn decode_var_uint62(&mut self) -> Result<u64> {
        match self.cursor.peek_u8()? & 0x03 {
            0 => Ok(u64::from(self.decode_u8()?) >> 2),
            1 => Ok(u64::from(self.decode_u16()?) >> 2),
            2 => Ok(u64::from(self.decode_u32()?) >> 2),
            _ => Ok(self.decode_u64()? >> 2),
        }
    }

    /// Decode a VarInt62. The shift right is arithmetic, preserving sign.
    pub fn decode_var_int62(&mut self) -> Result<i64> {
        match self.cursor.peek_u8()? & 0x03 {
            0 => Ok(i64::from(self.decode_i8()? >> 2)),
            1 => Ok(i64::from(self.decode_i16()? >> 2)),
            2 => Ok(i64::from(self.decode_i32()? >> 2)),
            _ => Ok(self.decode_i64()? >> 2),
        }
    }

    /// Decode a VarUInt62 range-checked to 32 bits.
    pub fn decode_var_uint32(&mut self) -> Result<u32> {
        let value = self.decode_var_uint62()?;
        u32::try_from(value).map_err(|_| {
            invalid_data(format!("the value '{value}' is out of the varuint32 accepted range"))
        })
    }

    /// Decode a VarInt62 range-checked to 32 bits.
    pub fn decode_var_int32(&mut self) -> Result<i32> {
        let value = self.decode_var_int62()?;
        i32::try_from(value).map_err(|_| {
            invalid_data(format!("the value '{value}' is out of the varint32 accepted range"))
        })
    }

    /// Decode a Size.
    ///
    /// Slice1 size decoding is not supported by this codec version.
    pub fn decode_size(&mut self) -> Result<usize> {
        match self.encoding {
            Encoding::Slice1 => Err(CodecError::Unimplemented("slice1 size decoding")),
            Encoding::Slice2 => {
                let value = self.decode_var_uint62()?;
                u32::try_from(value)
                    .map(|v| v as usize)
                    .map_err(|_| invalid_data("cannot decode a size larger than the uint32 maximum"))
            }
        }
    }

    /// Decode a Size-prefixed UTF-8 string.
    pub fn decode_string(&mut self) -> Result<String> {
        let size = self.decode_size()?;
        if size == 0 {
            return Ok(String::new());
        }
        let bytes = self.cursor.read(size)?;
        std::str::from_utf8(&bytes)
            .map(str::to_owned)
            .map_err(|_| invalid_data("invalid UTF-8 string"))
    }

    /// Advance past `count` bytes without interpreting them.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.cursor.advance(count)?;
        Ok(())
    }

    /// Advance past an encoded Size without materializing its value.
    pub fn skip_size(&mut self) -> Result<()> {
        match self.encoding {
            Encoding::Slice1 => {
                if self.decode_u8()? == 255 {
                    self.skip(4)?;
                }
                Ok(())
            }
            Encoding::Slice2 => {
                let width = varint_width_from_first_byte(self.cursor.peek_u8()?);
                self.skip(width)
            }
        }
    }

    /// Decode a tagged field, or report it absent.
    ///
    /// `tag_format` is required under slice1 and forbidden under slice2;
    /// mixing them up is an [`CodecError::InvalidOperation`].
    /// `use_tag_end_marker` only applies to slice1, where a tagged section
    /// is terminated either by the end-marker byte or by the end of the
    /// buffer.
    ///
    /// Under slice2 the buffer holds fields in strictly ascending tag order
    /// and callers must request tags in non-decreasing order on the same
    /// decoder: reporting a field absent rewinds only the last tag read, so
    /// the next request can resume scanning from the same point.
    pub fn decode_tagged<T, F>(
        &mut self,
        tag: i32,
        tag_format: Option<TagFormat>,
        use_tag_end_marker: bool,
        decode_fn: F,
    ) -> Result<Option<T>>
    where
        F: FnOnce(&mut Decoder) -> Result<T>,
    {
        match (self.encoding, tag_format) {
            (Encoding::Slice1, None) => Err(CodecError::InvalidOperation(
                "slice1 encoded tags must be decoded with a tag format",
            )),
            (Encoding::Slice2, Some(_)) => Err(CodecError::InvalidOperation(
                "tag formats can only be used with the slice1 encoding",
            )),
            (Encoding::Slice1, Some(format)) => {
                if self.decode_tag_header(tag, format, use_tag_end_marker)? {
                    // The size prefix implied by the format is consumed here
                    // so the callback starts at the field body.
                    match format {
                        TagFormat::VSize => self.skip_size()?,
                        TagFormat::FSize => self.skip(4)?,
                        _ => {}
                    }
                    decode_fn(self).map(Some)
                } else {
                    Ok(None)
                }
            }
            (Encoding::Slice2, None) => loop {
                let start = self.cursor.position();
                let candidate = self.decode_var_int32()?;

                if candidate == tag {
                    // Found the requested tag; its size prefix is not needed.
                    self.skip_size()?;
                    return decode_fn(self).map(Some);
                } else if candidate == TAG_END_MARKER || candidate > tag {
                    trace!(tag, candidate, "tagged field absent, rewinding");
                    self.cursor.rewind(self.cursor.position() - start)?;
                    return Ok(None);
                } else {
                    trace!(tag, skipped = candidate, "skipping unrecognized tagged field");
                    let size = self.decode_size()?;
                    self.skip(size)?;
                }
            },
        }
    }

    /// Scan the slice1 tagged section for `tag`, validating its format.
    ///
    /// Returns `true` with the cursor positioned after the matching header,
    /// or `false` with the cursor rewound to where the next unconsumed
    /// header begins. Fields with smaller tags are skipped per their format.
    pub fn decode_tag_header(
        &mut self,
        tag: i32,
        expected_format: TagFormat,
        use_tag_end_marker: bool,
    ) -> Result<bool> {
        if self.encoding != Encoding::Slice1 {
            return Err(CodecError::InvalidOperation(
                "tag headers exist only in the slice1 encoding",
            ));
        }

        loop {
            if !use_tag_end_marker && self.cursor.at_end() {
                return Ok(false);
            }

            let saved = self.cursor.position();
            let header = self.decode_u8()?;
            if use_tag_end_marker && header == SLICE1_TAG_END_MARKER {
                self.cursor.rewind(self.cursor.position() - saved)?;
                return Ok(false);
            }

            let format = TagFormat::from_encoded(header & 0x07)?;
            let mut candidate = i32::from(header >> 3);
            if candidate == SLICE1_EXTENDED_TAG {
                candidate = self.decode_size()? as i32;
            }

            if candidate > tag {
                trace!(tag, candidate, "tagged field absent, rewinding");
                self.cursor.rewind(self.cursor.position() - saved)?;
                return Ok(false);
            } else if candidate < tag {
                self.skip_tagged_value(format)?;
            } else {
                let expected = if expected_format == TagFormat::OptimizedVSize {
                    TagFormat::VSize
                } else {
                    expected_format
                };
                if format != expected {
                    return Err(invalid_data(format!(
                        "invalid tag field '{candidate}': unexpected format"
                    )));
                }
                return Ok(true);
            }
        }
    }

    /// Skip every remaining tagged field, up to and including the end marker.
    pub fn skip_tagged(&mut self) -> Result<()> {
        match self.encoding {
            Encoding::Slice1 => Err(CodecError::Unimplemented("slice1 tagged field skipping")),
            Encoding::Slice2 => loop {
                if self.decode_var_int32()? == TAG_END_MARKER {
                    return Ok(());
                }
                let size = self.decode_size()?;
                self.skip(size)?;
            },
        }
    }

    /// Skip one slice1 tagged value according to its wire format.
    fn skip_tagged_value(&mut self, format: TagFormat) -> Result<()> {
        match format {
            TagFormat::F1 => self.skip(1),
            TagFormat::F2 => self.skip(2),
            TagFormat::F4 => self.skip(4),
            TagFormat::F8 => self.skip(8),
            TagFormat::Size => self.skip_size(),
            TagFormat::VSize => {
                let size = self.decode_size()?;
                self.skip(size)
            }
            TagFormat::FSize => {
                let size = self.decode_i32()?;
                if size < 0 {
                    return Err(invalid_data(format!("decoded invalid size: {size}")));
                }
                self.skip(size as usize)
            }
            _ => Err(invalid_data(format!(
                "cannot skip tagged field with tag format '{format:?}'"
            ))),
        }
    }

    /// Carve the next `ceil(bit_count / 8)` bytes off the unread region into
    /// an independent sub-cursor and advance past them. Slice2 only.
    pub fn get_bit_sequence_reader(&mut self, bit_count: usize) -> Result<ByteCursor> {
        if self.encoding == Encoding::Slice1 {
            return Err(CodecError::InvalidOperation(
                "cannot create a bit sequence reader with the slice1 encoding",
            ));
        }
        if bit_count == 0 {
            return Err(CodecError::OutOfBounds(
                slicebin_buf::BufError::ZeroSizedRequest,
            ));
        }

        let size = bit_sequence_byte_count(bit_count);
        let region = self.cursor.unread_view(size)?.slice(..size);
        self.cursor.advance(size)?;
        Ok(ByteCursor::new(region))
    }
}
