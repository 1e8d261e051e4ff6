//! Error types for OxiLZMA operations.
//!
//! Every decoding failure is terminal for the session that produced it.
//! The variants mirror the ways an LZMA stream can go wrong: malformed
//! parameters, an exhausted range decoder, output that disagrees with the
//! declared size, and back-references into history that does not exist.

use std::fmt;
use std::io;
use thiserror::Error;

/// The main error type for OxiLZMA operations.
#[derive(Debug, Error)]
pub enum LzmaError {
    /// I/O error from an underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Properties byte outside the encodable `lc`/`lp`/`pb` range.
    #[error("Invalid LZMA properties byte: {byte:#04x}")]
    InvalidProperties {
        /// The offending properties byte.
        byte: u8,
    },

    /// The range decoder ran out of input, either while reading its five
    /// initialization bytes or while normalizing.
    #[error("Range decoder needs {needed} more input byte(s)")]
    RangeDecoderInit {
        /// Number of bytes that were required but missing.
        needed: usize,
    },

    /// Decoding would produce more bytes than the declared size.
    #[error("Uncompressed size limit of {limit} bytes exceeded")]
    UncompressedSizeExceeded {
        /// Declared uncompressed size.
        limit: u64,
    },

    /// A repeat was requested before any byte was decoded.
    #[error("Nothing to repeat: output window is empty")]
    EmptyWindow,

    /// The stream ended but the range decoder's code register is not zero.
    #[error("Range decoder finished with residual code {code:#010x}")]
    RangeDecoderResidual {
        /// The non-zero code value.
        code: u32,
    },

    /// A match is longer than the bytes left before the declared size.
    #[error("Match of {length} bytes exceeds the {remaining} bytes left to decode")]
    RepeatLengthExceedsRemaining {
        /// Decoded match length.
        length: usize,
        /// Bytes remaining before the declared size.
        remaining: u64,
    },

    /// A match distance reaches further back than the available history.
    #[error("Match distance {distance} exceeds available history of {available} bytes")]
    InsufficientHistory {
        /// 0-based distance of the requested match.
        distance: u64,
        /// Bytes addressable for back-references.
        available: u64,
    },

    /// Decoding was attempted before properties were supplied.
    #[error("Decoder used before its properties were initialized")]
    UninitializedDecoder,

    /// Invalid container header or chunk framing.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Container-level read past the end of the input.
    #[error("Unexpected end of input: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Checksum over the decoded bytes did not match the expected value.
    #[error("{kind} mismatch: expected {expected:#x}, computed {computed:#x}")]
    ChecksumMismatch {
        /// Name of the checksum algorithm.
        kind: &'static str,
        /// Expected value.
        expected: u64,
        /// Value computed over the output.
        computed: u64,
    },
}

/// Result type alias for OxiLZMA operations.
pub type Result<T> = std::result::Result<T, LzmaError>;

/// Fieldless discriminant of [`LzmaError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`LzmaError::Io`].
    Io,
    /// See [`LzmaError::InvalidProperties`].
    InvalidProperties,
    /// See [`LzmaError::RangeDecoderInit`].
    RangeDecoderInit,
    /// See [`LzmaError::UncompressedSizeExceeded`].
    UncompressedSizeExceeded,
    /// See [`LzmaError::EmptyWindow`].
    EmptyWindow,
    /// See [`LzmaError::RangeDecoderResidual`].
    RangeDecoderResidual,
    /// See [`LzmaError::RepeatLengthExceedsRemaining`].
    RepeatLengthExceedsRemaining,
    /// See [`LzmaError::InsufficientHistory`].
    InsufficientHistory,
    /// See [`LzmaError::UninitializedDecoder`].
    UninitializedDecoder,
    /// See [`LzmaError::InvalidHeader`].
    InvalidHeader,
    /// See [`LzmaError::UnexpectedEof`].
    UnexpectedEof,
    /// See [`LzmaError::ChecksumMismatch`].
    ChecksumMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl LzmaError {
    /// Create an invalid properties error.
    pub fn invalid_properties(byte: u8) -> Self {
        Self::InvalidProperties { byte }
    }

    /// Create a range decoder input exhaustion error.
    pub fn range_decoder_init(needed: usize) -> Self {
        Self::RangeDecoderInit { needed }
    }

    /// Create an uncompressed size exceeded error.
    pub fn size_exceeded(limit: u64) -> Self {
        Self::UncompressedSizeExceeded { limit }
    }

    /// Create a residual code error.
    pub fn residual(code: u32) -> Self {
        Self::RangeDecoderResidual { code }
    }

    /// Create a repeat length error.
    pub fn repeat_exceeds(length: usize, remaining: u64) -> Self {
        Self::RepeatLengthExceedsRemaining { length, remaining }
    }

    /// Create an insufficient history error.
    pub fn insufficient_history(distance: u64, available: u64) -> Self {
        Self::InsufficientHistory {
            distance,
            available,
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(kind: &'static str, expected: u64, computed: u64) -> Self {
        Self::ChecksumMismatch {
            kind,
            expected,
            computed,
        }
    }

    /// The fieldless kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidProperties { .. } => ErrorKind::InvalidProperties,
            Self::RangeDecoderInit { .. } => ErrorKind::RangeDecoderInit,
            Self::UncompressedSizeExceeded { .. } => ErrorKind::UncompressedSizeExceeded,
            Self::EmptyWindow => ErrorKind::EmptyWindow,
            Self::RangeDecoderResidual { .. } => ErrorKind::RangeDecoderResidual,
            Self::RepeatLengthExceedsRemaining { .. } => ErrorKind::RepeatLengthExceedsRemaining,
            Self::InsufficientHistory { .. } => ErrorKind::InsufficientHistory,
            Self::UninitializedDecoder => ErrorKind::UninitializedDecoder,
            Self::InvalidHeader { .. } => ErrorKind::InvalidHeader,
            Self::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Self::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
        }
    }

    /// Whether the error signals corrupt or truncated compressed data, as
    /// opposed to an I/O problem or API misuse.
    pub fn is_data_error(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Io | ErrorKind::UninitializedDecoder | ErrorKind::ChecksumMismatch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LzmaError::invalid_properties(0xE1);
        assert!(err.to_string().contains("0xe1"));

        let err = LzmaError::insufficient_history(10, 3);
        assert!(err.to_string().contains("distance 10"));

        let err = LzmaError::residual(0x1234);
        assert!(err.to_string().contains("0x00001234"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: LzmaError = io_err.into();
        assert!(matches!(err, LzmaError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(LzmaError::EmptyWindow.kind(), ErrorKind::EmptyWindow);
        assert_eq!(
            LzmaError::repeat_exceeds(5, 2).kind(),
            ErrorKind::RepeatLengthExceedsRemaining
        );
        assert_eq!(
            LzmaError::UninitializedDecoder.kind(),
            ErrorKind::UninitializedDecoder
        );
    }

    #[test]
    fn test_data_error_classification() {
        assert!(LzmaError::range_decoder_init(1).is_data_error());
        assert!(LzmaError::size_exceeded(4).is_data_error());
        assert!(!LzmaError::UninitializedDecoder.is_data_error());
        assert!(!LzmaError::checksum_mismatch("CRC-32", 1, 2).is_data_error());
    }
}
