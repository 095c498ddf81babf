//! Byte buffer primitives for the Slice codec.
//!
//! This is the lowest layer of slicebin. It provides two types:
//! - [`ByteCursor`] — a bounds-checked read cursor over an immutable buffer
//! - [`ByteSink`] — an append-only output buffer with backward seek and
//!   overwrite-in-place, which is what makes length backpatching possible
//!
//! Everything else builds on top of these two types. Neither knows anything
//! about the Slice wire format itself.

pub mod cursor;
pub mod error;
pub mod sink;

pub use cursor::ByteCursor;
pub use error::{BufError, Result};
pub use sink::ByteSink;
