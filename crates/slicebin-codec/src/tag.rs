use crate::error::{invalid_data, Result};

/// Reserved tag value marking the end of the tagged-field section (slice2).
///
/// Encoded on the wire as a VarInt32.
pub const TAG_END_MARKER: i32 = -1;

/// Raw header byte marking the end of the tagged-field section (slice1).
///
/// Checked against the header byte before it is split into tag and format.
pub(crate) const SLICE1_TAG_END_MARKER: u8 = 0xFF;

/// Header tag value meaning the real tag follows as a separate Size (slice1).
pub(crate) const SLICE1_EXTENDED_TAG: i32 = 30;

/// How a slice1 tagged field's payload is self-delimited.
///
/// The low 3 bits of a slice1 tag header byte carry one of the wire formats
/// (0 through 7). `OptimizedVSize` is a pseudo format that never appears on
/// the wire; callers pass it to mean "VSize with the size optimized out".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFormat {
    /// A fixed-size numeric encoded on 1 byte, such as bool or uint8.
    F1 = 0,
    /// A fixed-size numeric encoded on 2 bytes, such as int16.
    F2 = 1,
    /// A fixed-size numeric encoded on 4 bytes, such as int32 or float32.
    F4 = 2,
    /// A fixed-size numeric encoded on 8 bytes, such as int64 or float64.
    F8 = 3,
    /// A variable-length size encoded on 1 or 5 bytes.
    Size = 4,
    /// A variable-length size followed by size bytes.
    VSize = 5,
    /// A fixed-length size encoded on 4 bytes, followed by size bytes.
    FSize = 6,
    /// Represents a class, but is no longer encoded or decoded.
    Class = 7,
    /// Pseudo non-encoded format: like VSize but the size is optimized out.
    OptimizedVSize = 8,
}

impl TagFormat {
    /// Decode the low 3 bits of a slice1 tag header byte.
    pub fn from_encoded(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(TagFormat::F1),
            1 => Ok(TagFormat::F2),
            2 => Ok(TagFormat::F4),
            3 => Ok(TagFormat::F8),
            4 => Ok(TagFormat::Size),
            5 => Ok(TagFormat::VSize),
            6 => Ok(TagFormat::FSize),
            7 => Ok(TagFormat::Class),
            other => Err(invalid_data(format!("invalid tag format '{other}'"))),
        }
    }
}
