//! Chunked accumulation from a byte source.
//!
//! [`read_all`] pulls bounded chunks from a [`ByteSource`] into a
//! [`ByteArray`] until the source signals the end of its data with a short
//! or empty chunk, fails, or the host cancels. Whatever was read before the
//! stop is always returned, together with the error that caused it.

use crate::core::ByteArray;
use crate::error::{ReadError, Result};
use crate::io::source::ByteSource;
use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Default number of bytes requested per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Why a chunked read stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source returned fewer bytes than requested.
    ShortRead,
    /// The source returned no bytes.
    EmptyRead,
    /// The source reported an error.
    SourceError,
    /// The host cancelled the read.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ShortRead => "short read",
            Self::EmptyRead => "empty read",
            Self::SourceError => "source error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Result of a chunked read: the accumulated bytes and any error that ended
/// the read early.
#[derive(Debug)]
pub struct ReadOutcome {
    /// Everything read before the stop, in source order.
    pub bytes: Bytes,
    /// The error that ended the read, if any.
    pub error: Option<ReadError>,
    /// Number of read requests issued to the source.
    pub reads: usize,
    /// Why the read stopped.
    pub stop: StopReason,
}

impl ReadOutcome {
    /// Returns `true` if the source reached the end of its data.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Splits into the bytes and the optional error.
    #[must_use]
    pub fn into_parts(self) -> (Bytes, Option<ReadError>) {
        (self.bytes, self.error)
    }

    /// Converts into a `Result`, keeping partial bytes on the error side.
    ///
    /// # Errors
    ///
    /// Returns [`PartialRead`] if the read was ended by an error.
    pub fn into_result(self) -> std::result::Result<Bytes, PartialRead> {
        match self.error {
            None => Ok(self.bytes),
            Some(error) => Err(PartialRead {
                bytes: self.bytes,
                error,
            }),
        }
    }
}

/// A read that failed part way, with the bytes read before the failure.
#[derive(Error, Debug)]
#[error("{error} (after {} bytes)", .bytes.len())]
pub struct PartialRead {
    /// Bytes read before the failure.
    pub bytes: Bytes,
    /// The failure.
    #[source]
    pub error: ReadError,
}

/// One chunked read session over a borrowed source.
///
/// # Examples
///
/// ```
/// use bytearray_rs::io::{ChunkedReader, MemorySource, StopReason};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> bytearray_rs::Result<()> {
/// let mut source = MemorySource::new(vec![7u8; 10]);
/// let outcome = ChunkedReader::new(&mut source).chunk_size(4).read_all().await?;
/// assert_eq!(outcome.bytes.len(), 10);
/// assert_eq!(outcome.reads, 3);
/// assert_eq!(outcome.stop, StopReason::ShortRead);
/// # Ok(())
/// # }
/// ```
pub struct ChunkedReader<'a, S: ?Sized> {
    source: &'a mut S,
    chunk_size: usize,
    cancel: Option<watch::Receiver<bool>>,
}

impl<'a, S> ChunkedReader<'a, S>
where
    S: ByteSource + ?Sized,
{
    /// Starts a session over `source` with [`DEFAULT_CHUNK_SIZE`].
    pub const fn new(source: &'a mut S) -> Self {
        Self {
            source,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel: None,
        }
    }

    /// Sets the number of bytes requested per chunk.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Stops the read once `cancel` holds `true`.
    ///
    /// A pending chunk request is abandoned when the signal arrives. If the
    /// sender is dropped without signalling, the read runs to completion.
    #[must_use]
    pub fn cancel_on(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Reads until a short read, an empty read, an error, or cancellation.
    ///
    /// # Errors
    ///
    /// Fails with [`ReadError::InvalidChunkSize`] before touching the source
    /// when the chunk size is zero. Source errors and cancellation are not
    /// returned here; they are carried in [`ReadOutcome::error`] alongside
    /// the bytes read so far.
    pub async fn read_all(self) -> Result<ReadOutcome> {
        let Self {
            source,
            chunk_size,
            mut cancel,
        } = self;

        if chunk_size == 0 {
            return Err(ReadError::InvalidChunkSize { size: chunk_size }.into());
        }

        debug!(chunk_size, "starting chunked read");
        let mut array = ByteArray::new();
        let mut reads = 0usize;

        let (stop, error) = loop {
            if cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
                break (StopReason::Cancelled, Some(ReadError::Cancelled));
            }

            reads += 1;
            let result = match cancel.as_mut() {
                Some(rx) => tokio::select! {
                    biased;
                    () = cancelled(rx) => None,
                    result = source.read_chunk(chunk_size) => Some(result),
                },
                None => Some(source.read_chunk(chunk_size).await),
            };

            let Some(result) = result else {
                break (StopReason::Cancelled, Some(ReadError::Cancelled));
            };

            match result {
                Err(err) => {
                    if let Some(partial) = source.take_partial() {
                        trace!(read = reads, len = partial.len(), "partial chunk before error");
                        array.append(&partial)?;
                    }
                    break (StopReason::SourceError, Some(ReadError::from_source(err)));
                }
                Ok(chunk) => {
                    let len = chunk.len();
                    trace!(read = reads, len, "chunk received");
                    if len == 0 {
                        break (StopReason::EmptyRead, None);
                    }
                    array.append(&chunk)?;
                    if len < chunk_size {
                        break (StopReason::ShortRead, None);
                    }
                }
            }
        };

        let bytes = array.freeze()?;
        match &error {
            Some(err) => warn!(
                reads,
                len = bytes.len(),
                %stop,
                error = %err,
                "chunked read ended early; returning partial data"
            ),
            None => debug!(reads, len = bytes.len(), %stop, "chunked read complete"),
        }

        Ok(ReadOutcome {
            bytes,
            error,
            reads,
            stop,
        })
    }
}

/// Resolves once the watched flag turns `true`. Never resolves if the
/// sender goes away first.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let signalled = rx.wait_for(|cancelled| *cancelled).await.is_ok();
    if !signalled {
        std::future::pending::<()>().await;
    }
}

/// Reads everything from `source` in chunks of `chunk_size` bytes.
///
/// # Errors
///
/// Fails with [`ReadError::InvalidChunkSize`] when `chunk_size` is zero.
/// Source errors are reported in the returned [`ReadOutcome`].
///
/// # Examples
///
/// ```
/// use bytearray_rs::io::{MemorySource, read_all};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> bytearray_rs::Result<()> {
/// let mut source = MemorySource::new("hello");
/// let outcome = read_all(&mut source, 4096).await?;
/// assert_eq!(&outcome.bytes[..], b"hello");
/// assert!(outcome.is_complete());
/// # Ok(())
/// # }
/// ```
pub async fn read_all<S>(source: &mut S, chunk_size: usize) -> Result<ReadOutcome>
where
    S: ByteSource + ?Sized,
{
    ChunkedReader::new(source)
        .chunk_size(chunk_size)
        .read_all()
        .await
}
