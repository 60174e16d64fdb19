//! Error types for the configuration model.
//!
//! Applying mutations never fails; these errors only come out of the explicit
//! decoding and parsing entry points.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in configuration operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Blob codec error.
    #[error("codec error: {0}")]
    Codec(#[from] clusterconf_codec::CodecError),

    /// A replication policy descriptor could not be parsed.
    #[error("invalid replication policy '{input}': {message}")]
    InvalidPolicy {
        /// The descriptor text that was rejected.
        input: String,
        /// Description of the problem.
        message: String,
    },

    /// An address exclusion could not be parsed.
    #[error("invalid address exclusion: {input}")]
    InvalidExclusion {
        /// The text that was rejected.
        input: String,
    },

    /// Raw key/value pairs were not strictly ordered by key.
    #[error("raw configuration is not sorted: key at index {index} does not follow its predecessor")]
    UnsortedKeys {
        /// Index of the first out-of-order key.
        index: usize,
    },

    /// Unknown named preset.
    #[error("unknown configuration preset: {name}")]
    UnknownPreset {
        /// The name that was looked up.
        name: String,
    },
}

impl CoreError {
    /// Creates an invalid policy error.
    pub fn invalid_policy(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid exclusion error.
    pub fn invalid_exclusion(input: impl Into<String>) -> Self {
        Self::InvalidExclusion {
            input: input.into(),
        }
    }

    /// Creates an unknown preset error.
    pub fn unknown_preset(name: impl Into<String>) -> Self {
        Self::UnknownPreset { name: name.into() }
    }
}
