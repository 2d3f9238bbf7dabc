//! Error types for byte array and chunked read operations.
//!
//! This module provides the error hierarchy using `thiserror` for buffer
//! contract violations, chunked reads, file adapters, and CLI commands.

use std::fmt;
use thiserror::Error;

/// Result type alias for byte array operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a byte source, kept opaque and downcastable.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer contract violations (indexing, append input, use after retire).
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// Chunked read errors.
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    /// I/O errors from the file and stream adapters.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// The terminal state a buffer was moved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retired {
    /// Memory was handed off by `freeze`.
    Frozen,
    /// Memory was released by `dispose`.
    Disposed,
}

impl fmt::Display for Retired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frozen => f.write_str("frozen"),
            Self::Disposed => f.write_str("disposed"),
        }
    }
}

/// Byte array errors. These are local contract violations and are never
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Indexed access outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Buffer length at the time of access.
        len: usize,
    },

    /// Append was given a value that is neither text nor a byte sequence.
    #[error("unsupported append source type: {type_name}")]
    UnsupportedSourceType {
        /// Name of the rejected value's type.
        type_name: &'static str,
    },

    /// Operation on a buffer after `freeze` or `dispose`.
    #[error("buffer invalidated: already {by}")]
    Invalidated {
        /// Which exit retired the buffer.
        by: Retired,
    },
}

/// Chunked read errors.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Chunk size must be greater than zero.
    #[error("invalid chunk size {size}: must be greater than zero")]
    InvalidChunkSize {
        /// Rejected chunk size.
        size: usize,
    },

    /// Error surfaced by the byte source, passed through unmodified.
    #[error("source read failed: {0}")]
    Source(#[source] BoxError),

    /// The host cancelled the read before the source reached its end.
    #[error("read cancelled")]
    Cancelled,
}

impl ReadError {
    /// Wraps a byte source error.
    pub fn from_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(err))
    }

    /// Returns the original source error if it has type `E`.
    pub fn downcast_source<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Source(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// I/O-specific errors for the file and stream adapters.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to open or inspect a file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// JSON input or output could not be processed.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Command(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_error_display() {
        let err = BufferError::IndexOutOfRange { index: 3, len: 3 };
        assert_eq!(err.to_string(), "index 3 out of range for length 3");

        let err = BufferError::UnsupportedSourceType { type_name: "number" };
        assert_eq!(err.to_string(), "unsupported append source type: number");

        let err = BufferError::Invalidated {
            by: Retired::Frozen,
        };
        assert_eq!(err.to_string(), "buffer invalidated: already frozen");

        let err = BufferError::Invalidated {
            by: Retired::Disposed,
        };
        assert!(err.to_string().contains("disposed"));
    }

    #[test]
    fn test_read_error_display() {
        let err = ReadError::InvalidChunkSize { size: 0 };
        assert_eq!(
            err.to_string(),
            "invalid chunk size 0: must be greater than zero"
        );

        assert_eq!(ReadError::Cancelled.to_string(), "read cancelled");
    }

    #[test]
    fn test_read_error_source_passthrough() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
        let err = ReadError::from_source(io_err);
        assert!(err.to_string().contains("peer reset"));

        let inner = err.downcast_source::<std::io::Error>().unwrap();
        assert_eq!(inner.kind(), std::io::ErrorKind::ConnectionReset);
        assert!(err.downcast_source::<std::fmt::Error>().is_none());
        assert!(ReadError::Cancelled
            .downcast_source::<std::io::Error>()
            .is_none());
    }

    #[test]
    fn test_read_error_exposes_std_source() {
        use std::error::Error as _;

        let err = ReadError::from_source(std::io::Error::other("boom"));
        assert!(err.source().is_some());
        assert!(ReadError::Cancelled.source().is_none());
    }

    #[test]
    fn test_io_error_variants() {
        let err = IoError::FileNotFound {
            path: "/tmp/missing.bin".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.bin");

        let err = IoError::ReadFailed {
            path: "/tmp/test".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/tmp/test"));
        assert!(err.to_string().contains("permission denied"));

        let err = IoError::MmapFailed {
            path: "/tmp/big".to_string(),
            reason: "out of memory".to_string(),
        };
        assert!(err.to_string().contains("memory mapping"));
    }

    #[test]
    fn test_command_error_variants() {
        let err = CommandError::InvalidArgument("--chunk-size".to_string());
        assert!(err.to_string().contains("invalid argument"));

        let err = CommandError::ExecutionFailed("timeout".to_string());
        assert!(err.to_string().contains("execution failed"));

        let err = CommandError::Json("expected value".to_string());
        assert_eq!(err.to_string(), "JSON error: expected value");
    }

    #[test]
    fn test_error_from_buffer() {
        let err: Error = BufferError::Invalidated {
            by: Retired::Frozen,
        }
        .into();
        assert!(matches!(err, Error::Buffer(_)));
        assert!(err.to_string().starts_with("buffer error:"));
    }

    #[test]
    fn test_error_from_read() {
        let err: Error = ReadError::InvalidChunkSize { size: 0 }.into();
        assert!(matches!(
            err,
            Error::Read(ReadError::InvalidChunkSize { size: 0 })
        ));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Command(CommandError::Json(_))));
    }
}
