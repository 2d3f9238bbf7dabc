//! Byte source abstraction and in-memory and stream adapters.
//!
//! A [`ByteSource`] answers one question: "give me up to N bytes". The
//! chunked reader treats a chunk shorter than requested as end of data, so
//! adapters fill each chunk as far as the underlying data allows.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::convert::Infallible;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Upper bound on the buffer reserved before a stream chunk is filled.
const INITIAL_RESERVE: usize = 64 * 1024;

/// An asynchronous provider of bounded byte chunks.
///
/// Implementations return at most `max` bytes per call. Returning fewer than
/// `max` bytes (including zero) signals that no more data follows, so an
/// error must never be held back behind a short chunk. A source that fails
/// after gathering part of a chunk returns the error at once and hands the
/// gathered bytes over through [`ByteSource::take_partial`].
///
/// # Examples
///
/// ```
/// use bytearray_rs::io::{ByteSource, MemorySource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut source = MemorySource::new("hello world");
/// let chunk = source.read_chunk(5).await.unwrap();
/// assert_eq!(&chunk[..], b"hello");
/// # }
/// ```
#[async_trait]
pub trait ByteSource: Send {
    /// Error reported by this source.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads up to `max` bytes.
    ///
    /// # Errors
    ///
    /// Returns the source's own error; callers pass it through unchanged.
    async fn read_chunk(&mut self, max: usize) -> Result<Bytes, Self::Error>;

    /// Takes the bytes the last failed [`read_chunk`](Self::read_chunk)
    /// gathered before its error.
    fn take_partial(&mut self) -> Option<Bytes> {
        None
    }
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    type Error = S::Error;

    async fn read_chunk(&mut self, max: usize) -> Result<Bytes, Self::Error> {
        (**self).read_chunk(max).await
    }

    fn take_partial(&mut self) -> Option<Bytes> {
        (**self).take_partial()
    }
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    type Error = S::Error;

    async fn read_chunk(&mut self, max: usize) -> Result<Bytes, Self::Error> {
        (**self).read_chunk(max).await
    }

    fn take_partial(&mut self) -> Option<Bytes> {
        (**self).take_partial()
    }
}

/// Serves chunks from bytes already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    remaining: Bytes,
}

impl MemorySource {
    /// Creates a source over `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            remaining: data.into(),
        }
    }

    /// Number of bytes not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    type Error = Infallible;

    async fn read_chunk(&mut self, max: usize) -> Result<Bytes, Self::Error> {
        let take = max.min(self.remaining.len());
        Ok(self.remaining.split_to(take))
    }
}

/// Adapts any [`AsyncRead`] into a [`ByteSource`].
///
/// Each chunk is filled until it holds `max` bytes or the reader reaches
/// end of file, so a short chunk always means end of data. Reads
/// interrupted by `ErrorKind::Interrupted` are retried.
///
/// When an error strikes after part of a chunk has been read, the error is
/// returned straight away and the bytes already read are kept for
/// [`ByteSource::take_partial`].
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
    partial: Option<Bytes>,
}

impl<R> StreamSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wraps a reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            partial: None,
        }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R> ByteSource for StreamSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    type Error = io::Error;

    async fn read_chunk(&mut self, max: usize) -> Result<Bytes, Self::Error> {
        self.partial = None;

        let mut chunk = BytesMut::with_capacity(max.min(INITIAL_RESERVE));
        while chunk.len() < max {
            let limit = u64::try_from(max - chunk.len()).unwrap_or(u64::MAX);
            let mut limited = (&mut self.reader).take(limit);
            match limited.read_buf(&mut chunk).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) if chunk.is_empty() => return Err(err),
                Err(err) => {
                    debug!(
                        buffered = chunk.len(),
                        error = %err,
                        "stream failed part way through a chunk"
                    );
                    self.partial = Some(chunk.freeze());
                    return Err(err);
                }
            }
        }
        Ok(chunk.freeze())
    }

    fn take_partial(&mut self) -> Option<Bytes> {
        self.partial.take()
    }
}
