/// Errors that can occur when moving a cursor or sink across buffer bounds.
#[derive(Debug, thiserror::Error)]
pub enum BufError {
    /// A read would cross the end of the buffer.
    #[error("read of {requested} bytes at position {position} exceeds buffer length {length}")]
    ReadPastEnd {
        position: usize,
        requested: usize,
        length: usize,
    },

    /// A seek or forward advance targeted a position outside the buffer.
    #[error("seek to position {target} is outside buffer of length {length}")]
    SeekOutOfRange { target: usize, length: usize },

    /// A rewind would move the cursor before the start of the buffer.
    #[error("rewind of {count} bytes at position {position} crosses the buffer start")]
    RewindPastStart { position: usize, count: usize },

    /// A write was attempted beyond the end of the written region, leaving a gap.
    #[error("write at position {position} would leave a gap past written length {length}")]
    WriteGap { position: usize, length: usize },

    /// A sub-range of zero length was requested where at least one byte is required.
    #[error("requested length must be greater than zero")]
    ZeroSizedRequest,
}

pub type Result<T> = std::result::Result<T, BufError>;
