//! # bytearray-rs
//!
//! Growable byte arrays with a zero-copy freeze, and chunked accumulation
//! from asynchronous byte sources.
//!
//! A [`ByteArray`] collects text and raw bytes, supports indexed reads and
//! writes, and hands its contents over as an immutable [`Bytes`] value with
//! [`ByteArray::freeze`]. Once frozen (or disposed) the array rejects every
//! further operation.
//!
//! [`read_all`] drains a [`ByteSource`] chunk by chunk into a `ByteArray`,
//! stopping on a short read, an empty read, a source error, or cancellation,
//! and always returns the bytes read so far.
//!
//! ## Features
//!
//! - **Amortized growth**: capacity doubles, starting at 64 bytes
//! - **Partial results**: a failing source never loses bytes already read
//! - **Cancellation**: reads can be abandoned through a watch channel
//! - **Memory Mapping**: efficient handling of large files

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod cli;
pub mod core;
pub mod error;
pub mod io;

// Re-export commonly used types at crate root
pub use error::{BufferError, Error, ReadError, Result, Retired};

// Re-export core domain types
pub use core::{AppendSource, ByteArray};

// Re-export I/O types
pub use io::{
    ByteSource, ChunkedReader, DEFAULT_CHUNK_SIZE, FileSource, MemorySource, PartialRead,
    ReadOutcome, StopReason, StreamSource, read_all, read_file,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};

pub use bytes::Bytes;
