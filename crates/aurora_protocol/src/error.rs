//! # Codec Error Types
//!
//! Every failure a decode (or bounded encode) can produce. A codec error
//! fails the single operation that raised it; it never corrupts the widget
//! tree or the registry on either side.

use thiserror::Error;

/// Errors raised by the packet codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The stream ended before the requested value could be read.
    #[error("truncated stream: needed {needed} more bytes, {remaining} remaining")]
    Truncated {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the stream.
        remaining: usize,
    },

    /// A length-prefixed string was not valid UTF-8.
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,

    /// A string exceeded the u16 length prefix on encode.
    #[error("string too long for wire format: {0} bytes (max {max})", max = u16::MAX)]
    StringTooLong(usize),

    /// Unknown packet discriminant on the wire.
    #[error("unknown packet type: {0}")]
    UnknownPacketType(u8),

    /// Unknown anchor discriminant on the wire.
    #[error("unknown anchor: {0}")]
    UnknownAnchor(u8),

    /// Unknown render priority discriminant on the wire.
    #[error("unknown render priority: {0}")]
    UnknownPriority(u8),

    /// A frame length prefix exceeded the allowed maximum.
    #[error("frame of {0} bytes exceeds maximum of {max}", max = crate::MAX_FRAME_SIZE)]
    FrameTooLarge(usize),

    /// A frame body was shorter or longer than its length prefix promised.
    #[error("frame length mismatch: prefix said {declared}, body had {actual}")]
    FrameLengthMismatch {
        /// Length the prefix declared.
        declared: usize,
        /// Length actually present.
        actual: usize,
    },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
