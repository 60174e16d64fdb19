//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while framing or unframing a blob.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode value to CBOR.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode CBOR bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// Blob is shorter than the frame header.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Frame does not start with the expected magic bytes.
    #[error("bad magic: expected {expected:02x?}, got {actual:02x?}")]
    BadMagic {
        /// Expected magic bytes.
        expected: [u8; 2],
        /// Magic bytes found in the blob.
        actual: [u8; 2],
    },

    /// Frame was written by a newer, unknown format version.
    #[error("unsupported format version {version} (max supported {max})")]
    UnsupportedVersion {
        /// Version found in the frame.
        version: u16,
        /// Highest version this build understands.
        max: u16,
    },

    /// Bytes were left over after the payload was decoded.
    #[error("{count} trailing bytes after payload")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }
}
