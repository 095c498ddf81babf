//! Compact, self-describing binary codec for RPC payloads.
//!
//! slicebin converts between in-memory scalar/string values and a byte
//! stream in the Slice wire format, with two selectable protocol versions
//! (`slice1` legacy, `slice2` current), forward/backward compatible tagged
//! fields, 2-bit-exponent variable-length integers, and length-prefixed
//! containers.
//!
//! # Crate Structure
//!
//! - [`buf`] — bounds-checked byte cursor and backpatchable byte sink
//! - [`codec`] — the `Decoder`/`Encoder` pair and the tagged-field protocol
//!
//! # Example
//!
//! ```
//! use slicebin::{Decoder, Encoder};
//!
//! let mut encoder = Encoder::new();
//! encoder.encode_string("Hello world").unwrap();
//! encoder.encode_var_uint62(16384).unwrap();
//!
//! let mut decoder = Decoder::new(encoder.into_bytes());
//! assert_eq!(decoder.decode_string().unwrap(), "Hello world");
//! assert_eq!(decoder.decode_var_uint62().unwrap(), 16384);
//! assert!(decoder.at_end());
//! ```

/// Re-export buffer primitives.
pub mod buf {
    pub use slicebin_buf::*;
}

/// Re-export codec types.
pub mod codec {
    pub use slicebin_codec::*;
}

pub use slicebin_buf::{ByteCursor, ByteSink};
pub use slicebin_codec::{
    bit_sequence_byte_count, CodecError, Decoder, Encoder, Encoding, Result, TagFormat,
    TAG_END_MARKER,
};
