//! Error types for WireBond core operations.

use thiserror::Error;

/// Core error type for WireBond operations.
///
/// None of these are retried inside this crate; retry policy belongs to the
/// transport that drives the bridge and the assembler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Declared inbound payload length exceeds the accepted limit.
    #[error("buffer is too large: declared {declared} bytes, limit {limit} bytes")]
    SizeLimitExceeded {
        /// Length declared by the frame sequence.
        declared: u64,
        /// Largest accepted payload length.
        limit: u64,
    },

    /// The transport could not open a cursor over the frame sequence.
    #[error("failed to init buffer reader")]
    ReaderInitFailed,

    /// A payload was required but the transport delivered none.
    #[error("no payload")]
    NoPayload,

    /// Buffer is too short for the requested read.
    #[error("buffer too short: required {required} bytes, available {available} bytes")]
    BufferTooShort {
        /// Required buffer size in bytes.
        required: usize,
        /// Available buffer size in bytes.
        available: usize,
    },

    /// Invalid UTF-8 encoding in a string field.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset where the string starts.
        offset: usize,
    },
}

/// Stable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::SizeLimitExceeded`].
    SizeLimitExceeded,
    /// See [`Error::ReaderInitFailed`].
    ReaderInitFailed,
    /// See [`Error::NoPayload`].
    NoPayload,
    /// Any failure raised while decoding an assembled payload.
    Decode,
}

impl ErrorKind {
    /// Returns the stable identifier for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SizeLimitExceeded => "size_limit_exceeded",
            Self::ReaderInitFailed => "reader_init_failed",
            Self::NoPayload => "no_payload",
            Self::Decode => "decode",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Creates a size limit error.
    pub fn size_limit_exceeded(declared: u64, limit: u64) -> Self {
        Self::SizeLimitExceeded { declared, limit }
    }

    /// Creates a buffer too short error.
    pub fn buffer_too_short(required: usize, available: usize) -> Self {
        Self::BufferTooShort {
            required,
            available,
        }
    }

    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SizeLimitExceeded { .. } => ErrorKind::SizeLimitExceeded,
            Self::ReaderInitFailed => ErrorKind::ReaderInitFailed,
            Self::NoPayload => ErrorKind::NoPayload,
            Self::BufferTooShort { .. } | Self::InvalidUtf8 { .. } => ErrorKind::Decode,
        }
    }
}

/// Result type alias for WireBond core operations.
pub type Result<T> = std::result::Result<T, Error>;
