//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to decode the byte stream.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// The byte stream is structurally invalid.
    #[error("invalid structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Indefinite-length items are forbidden in canonical CBOR.
    #[error("indefinite-length items are forbidden")]
    IndefiniteLengthForbidden,

    /// Float values are forbidden in canonical CBOR.
    #[error("float values are forbidden")]
    FloatForbidden,

    /// Integer overflow during decoding.
    #[error("integer overflow")]
    IntegerOverflow,

    /// A claimed container or string size exceeds the decoder's limit.
    #[error("size limit exceeded: claimed {claimed}, max allowed {max_allowed}")]
    SizeLimitExceeded {
        /// The size claimed by the byte stream.
        claimed: u64,
        /// The maximum the decoder allows.
        max_allowed: u64,
    },

    /// A value is nested deeper than the codec allows.
    #[error("nesting depth limit exceeded: max allowed {max_allowed}")]
    DepthLimitExceeded {
        /// The maximum nesting depth the codec allows.
        max_allowed: usize,
    },
}

impl CodecError {
    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
