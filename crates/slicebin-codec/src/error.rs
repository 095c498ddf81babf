use slicebin_buf::BufError;

/// Errors that can occur while encoding or decoding Slice data.
///
/// Every failure aborts the current call; the codec never retries. A cursor
/// read that fails with `OutOfBounds` leaves the position unchanged, but a
/// failure in the middle of a tagged-field scan leaves the decoder in an
/// undefined position and callers should discard it.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A cursor or sink movement crossed a buffer boundary.
    #[error(transparent)]
    OutOfBounds(#[from] BufError),

    /// A value violates its type's accepted range or encoding rule.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The operation is not valid for this instance's encoding version.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// A capability gap of this codec version, not a data error.
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, CodecError>;

pub(crate) fn invalid_data(message: impl Into<String>) -> CodecError {
    CodecError::InvalidData(message.into())
}
