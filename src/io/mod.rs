//! Chunked reading from asynchronous byte sources.
//!
//! [`ByteSource`] is the capability consumed here; [`read_all`] drives it
//! into a [`crate::ByteArray`] and freezes the result.

pub mod accumulator;
pub mod reader;
pub mod source;
pub mod unicode;

pub use accumulator::{
    ChunkedReader, DEFAULT_CHUNK_SIZE, PartialRead, ReadOutcome, StopReason, read_all,
};
pub use reader::{FileSource, MMAP_THRESHOLD, read_file};
pub use source::{ByteSource, MemorySource, StreamSource};
pub use unicode::{Sanitized, find_char_boundary, sanitize_utf8, truncate_at_boundary};
