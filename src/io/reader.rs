//! File byte source with memory mapping support.
//!
//! Small files are streamed through `tokio::fs`; files at or above
//! [`MMAP_THRESHOLD`] are memory-mapped and served straight from the map.

// Memory mapping requires unsafe but is well-documented and safe for read-only access
#![allow(unsafe_code)]

use crate::error::{IoError, Result};
use crate::io::accumulator::{ReadOutcome, read_all};
use crate::io::source::{ByteSource, StreamSource};
use async_trait::async_trait;
use bytes::Bytes;
use memmap2::Mmap;
use std::io;
use std::path::Path;
use tokio::fs::File;
use tracing::debug;

/// Threshold for using memory mapping (1MB).
pub const MMAP_THRESHOLD: u64 = 1024 * 1024;

enum Backing {
    Stream(StreamSource<File>),
    Mapped { data: Bytes, pos: usize },
}

/// A [`ByteSource`] reading a file from start to end.
///
/// # Examples
///
/// ```no_run
/// use bytearray_rs::io::{FileSource, read_all};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> bytearray_rs::Result<()> {
/// let mut source = FileSource::open("large_file.bin").await?;
/// let outcome = read_all(&mut source, 64 * 1024).await?;
/// println!("{} bytes", outcome.bytes.len());
/// # Ok(())
/// # }
/// ```
pub struct FileSource {
    backing: Backing,
    /// File size in bytes at open time.
    size: u64,
    /// File path for error messages.
    path: String,
}

impl FileSource {
    /// Opens a file, memory-mapping it if it is at least [`MMAP_THRESHOLD`]
    /// bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] if the file does not exist,
    /// [`IoError::ReadFailed`] if it cannot be opened or inspected, and
    /// [`IoError::MmapFailed`] if mapping fails.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_threshold(path, MMAP_THRESHOLD).await
    }

    /// Opens a file, memory-mapping it if it is at least `threshold` bytes
    /// long. Empty files are never mapped.
    ///
    /// # Errors
    ///
    /// Same as [`FileSource::open`].
    pub async fn open_with_threshold<P: AsRef<Path>>(path: P, threshold: u64) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => IoError::FileNotFound {
                path: path_str.clone(),
            },
            _ => IoError::ReadFailed {
                path: path_str.clone(),
                reason: e.to_string(),
            },
        })?;

        let metadata = file.metadata().await.map_err(|e| IoError::ReadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;
        if metadata.is_dir() {
            return Err(IoError::ReadFailed {
                path: path_str,
                reason: "is a directory".to_string(),
            }
            .into());
        }

        let size = metadata.len();
        let backing = if size > 0 && size >= threshold {
            debug!(path = %path_str, size, "memory-mapping file");
            let std_file = file.into_std().await;
            // Safety: the map is only read, never written
            let map = unsafe {
                Mmap::map(&std_file).map_err(|e| IoError::MmapFailed {
                    path: path_str.clone(),
                    reason: e.to_string(),
                })?
            };
            Backing::Mapped {
                data: Bytes::from_owner(map),
                pos: 0,
            }
        } else {
            debug!(path = %path_str, size, "streaming file");
            Backing::Stream(StreamSource::new(file))
        };

        Ok(Self {
            backing,
            size,
            path: path_str,
        })
    }

    /// Returns the file size in bytes, as seen when the file was opened.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if the file is served from a memory map.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped { .. })
    }
}

#[async_trait]
impl ByteSource for FileSource {
    type Error = io::Error;

    async fn read_chunk(&mut self, max: usize) -> io::Result<Bytes> {
        match &mut self.backing {
            Backing::Stream(stream) => stream.read_chunk(max).await,
            Backing::Mapped { data, pos } => {
                let start = (*pos).min(data.len());
                let end = start.saturating_add(max).min(data.len());
                *pos = end;
                Ok(data.slice(start..end))
            }
        }
    }

    fn take_partial(&mut self) -> Option<Bytes> {
        match &mut self.backing {
            Backing::Stream(stream) => stream.take_partial(),
            Backing::Mapped { .. } => None,
        }
    }
}

/// Reads an entire file in chunks of `chunk_size` bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or `chunk_size` is zero.
/// Errors while reading are carried in the returned [`ReadOutcome`].
///
/// # Examples
///
/// ```no_run
/// use bytearray_rs::io::{DEFAULT_CHUNK_SIZE, read_file};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> bytearray_rs::Result<()> {
/// let outcome = read_file("example.bin", DEFAULT_CHUNK_SIZE).await?;
/// assert!(outcome.is_complete());
/// # Ok(())
/// # }
/// ```
pub async fn read_file<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<ReadOutcome> {
    let mut source = FileSource::open(path).await?;
    read_all(&mut source, chunk_size).await
}
