use std::fmt;

/// The wire-format generation a [`Decoder`](crate::Decoder) or
/// [`Encoder`](crate::Encoder) speaks.
///
/// Selected at construction and fixed for the instance's lifetime. It gates
/// which sub-protocols are legal: tag formats exist only under `Slice1`,
/// the ascending-tag scan and bit sequences only under `Slice2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// The legacy encoding. Sizes are 1 byte, or `0xFF` plus a 4-byte
    /// signed length; tagged fields carry a format in their header byte.
    Slice1,
    /// The current encoding. Sizes are VarUInt62; tagged fields are
    /// length-prefixed and scanned in ascending tag order.
    #[default]
    Slice2,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Slice1 => write!(f, "slice1"),
            Encoding::Slice2 => write!(f, "slice2"),
        }
    }
}
