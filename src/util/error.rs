//! Error types for the stepcask library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for container and conversion operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid container file: expected Cask magic bytes")]
    InvalidMagic,

    /// Unsupported file format version
    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u16),

    /// File was never finalized; its record tree may be incomplete
    #[error("Container is not frozen; file is truncated or was abandoned mid-write")]
    NotFrozen,

    /// File is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Group not found by path
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Entry not found by path
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// Path component refers to a dataset where a group is required
    #[error("Not a group: {0}")]
    NotAGroup(String),

    /// Value shape does not match the declared dataset encoding.
    ///
    /// Recoverable: the tree walker retries the offending key with the
    /// textual fallback encoding instead of aborting the traversal.
    #[error("Encoding rejected at {path}: {declared} cannot hold {actual}")]
    EncodingRejected {
        path: String,
        declared: String,
        actual: String,
    },

    /// Type mismatch when reading data back
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Write operation failed
    #[error("Write failed at {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// True for the recoverable per-key rejection the walker retries on.
    #[inline]
    pub fn is_encoding_rejection(&self) -> bool {
        matches!(self, Self::EncodingRejected { .. })
    }
}

/// Result type alias for stepcask operations.
pub type Result<T> = std::result::Result<T, Error>;
