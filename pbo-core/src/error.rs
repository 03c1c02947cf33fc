//! Error types for PBO operations.
//!
//! Every operation in the workspace fails fast with a [`PboError`]. Host
//! filesystem errors are carried verbatim in [`PboError::Io`], so their
//! `std::io::ErrorKind` (e.g. `NotFound`) survives propagation.

use std::io;
use thiserror::Error;

/// The main error type for PBO operations.
#[derive(Debug, Error)]
pub enum PboError {
    /// I/O error from the underlying stream or filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended before a complete field or body could be read.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: u64,
    },

    /// The header block violates the record grammar.
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the violation.
        message: String,
    },

    /// A null-terminated string exceeded its configured bound.
    #[error("{field} exceeds the maximum length of {limit} bytes")]
    StringTooLong {
        /// Which string was being read.
        field: &'static str,
        /// The bound that was exceeded.
        limit: usize,
    },

    /// A value does not fit in a 32-bit header field.
    #[error("{what} of {value} does not fit in a 32-bit field")]
    Overflow {
        /// What was being narrowed.
        what: String,
        /// The offending value.
        value: u64,
    },

    /// Invalid caller-supplied argument.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// Valid but unsupported archive content.
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Description of the unsupported construct.
        message: String,
    },

    /// Entry path would escape the extraction root.
    #[error("Path traversal detected in entry: {path}")]
    PathTraversal {
        /// The suspicious path.
        path: String,
    },
}

/// Result type alias for PBO operations.
pub type Result<T> = std::result::Result<T, PboError>;

/// Coarse classification of a [`PboError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Short read/write or stream failure.
    Io,
    /// Malformed header block.
    InvalidFormat,
    /// String longer than the configured bound.
    PathTooLong,
    /// Value too large for a 32-bit field.
    Overflow,
    /// The host reported that a path does not exist.
    NotFound,
    /// Bad input from the caller.
    InvalidArgument,
    /// Unsupported archive content.
    Unsupported,
}

impl PboError {
    /// Create an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: u64) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a string-too-long error.
    pub fn string_too_long(field: &'static str, limit: usize) -> Self {
        Self::StringTooLong { field, limit }
    }

    /// Create an overflow error.
    pub fn overflow(what: impl Into<String>, value: u64) -> Self {
        Self::Overflow {
            what: what.into(),
            value,
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported content error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create a path traversal error.
    pub fn path_traversal(path: impl Into<String>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::NotFound => ErrorKind::NotFound,
            Self::Io(_) | Self::UnexpectedEof { .. } => ErrorKind::Io,
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::StringTooLong { .. } => ErrorKind::PathTooLong,
            Self::Overflow { .. } => ErrorKind::Overflow,
            Self::InvalidArgument { .. } | Self::PathTraversal { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PboError::invalid_format("unknown entry tag");
        assert!(err.to_string().contains("unknown entry tag"));

        let err = PboError::string_too_long("path", 4095);
        assert_eq!(
            err.to_string(),
            "path exceeds the maximum length of 4095 bytes"
        );

        let err = PboError::overflow("size of big.bin", 1 << 32);
        assert!(err.to_string().contains("4294967296"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: PboError = io_err.into();
        assert!(matches!(err, PboError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: PboError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind() {
        assert_eq!(PboError::unexpected_eof(4).kind(), ErrorKind::Io);
        assert_eq!(
            PboError::string_too_long("property key", 31).kind(),
            ErrorKind::PathTooLong
        );
        assert_eq!(
            PboError::invalid_argument("no input paths").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            PboError::unsupported("zero original size").kind(),
            ErrorKind::Unsupported
        );
    }
}
