//! Encoder/decoder for the compact, self-describing Slice wire format used
//! by RPC payloads.
//!
//! Two protocol generations are supported, selected at construction and
//! fixed for the instance's lifetime:
//! - `slice2` (current) — VarUInt62 sizes, ascending-tag scan for tagged
//!   fields, bit sequences
//! - `slice1` (legacy) — one-byte/`0xFF`+4-byte sizes and the header-byte
//!   tag protocol; value decoding is deliberately not implemented
//!
//! Wire basics:
//! - Fixed numerics are little-endian, 1/2/4/8 bytes wide; bool is one byte
//!   restricted to `{0, 1}`
//! - VarInt62/VarUInt62 store `log2(width)` in the low 2 bits of the first
//!   byte; the value is the remaining bits arithmetic-shifted right by 2
//! - A string is a Size followed by that many UTF-8 bytes
//! - A slice2 tagged field is a VarInt32 tag, a VarUInt62 body length, and
//!   the body; fields appear in strictly ascending tag order and a reserved
//!   tag value marks the end of the tagged section
//!
//! A [`Decoder`] wraps one cursor over a complete buffer; an [`Encoder`]
//! wraps one sink. Neither is safe for concurrent use without external
//! synchronization.

pub mod decoder;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod tag;
pub mod varint;


pub use decoder::Decoder;
pub use encoder::{bit_sequence_byte_count, Encoder};
pub use encoding::Encoding;
pub use error::{CodecError, Result};
pub use tag::{TagFormat, TAG_END_MARKER};
