//! Error types for RecentFileCache decoding.

use thiserror::Error;

/// Decoding and loading errors.
///
/// Decode errors are deterministic: the same bytes always fail the same way.
#[derive(Debug, Error)]
pub enum RfcError {
    /// First byte is not `0xFE` (or the buffer is empty).
    #[error("Invalid signature! Expected first byte 0xfe")]
    InvalidSignature,

    /// The 4-byte little-endian magic at offset 0 is not `0xFFEEFFFE`.
    #[error("Invalid header {found:#010x}, expected 0xffeefffe")]
    InvalidHeader { found: u32 },

    /// A length prefix, string body or terminator runs past the end of the buffer.
    #[error("Truncated record at offset {offset:#x}: need {needed} bytes, {available} available")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The file or its metadata could not be read.
    #[error("I/O error on {path}: {source}")]
    IoFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RfcError {
    /// Create an IoFailure error.
    pub fn io_failure(path: impl Into<String>, source: std::io::Error) -> Self {
        RfcError::IoFailure {
            path: path.into(),
            source,
        }
    }

    /// True for structural failures past the signature check (a malformed record region).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            RfcError::InvalidHeader { .. } | RfcError::TruncatedRecord { .. }
        )
    }
}

pub type RfcResult<T> = Result<T, RfcError>;
