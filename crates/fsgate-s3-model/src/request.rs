//! Streaming request bodies.

use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use tokio::io::AsyncRead;

/// A streaming request body handed to the backend.
///
/// Backends consume the inner reader exactly once, typically piping it
/// through a hash accumulator into a staged temp file. Buffered callers
/// (tests, the copy path) build one from [`Bytes`] or a byte vector.
///
/// # Examples
///
/// ```
/// use fsgate_s3_model::StreamingBlob;
///
/// let blob = StreamingBlob::from("hello");
/// let mut reader = blob.into_reader();
/// # tokio_test::block_on(async {
/// let mut buf = std::io::Cursor::new(Vec::new());
/// tokio::io::copy(&mut reader, &mut buf).await.unwrap();
/// assert_eq!(buf.into_inner(), b"hello");
/// # });
/// ```
pub struct StreamingBlob {
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl StreamingBlob {
    /// Wrap an arbitrary async reader.
    #[must_use]
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// An empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(tokio::io::empty())
    }

    /// Unwrap into the inner reader.
    #[must_use]
    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl Default for StreamingBlob {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for StreamingBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingBlob").finish_non_exhaustive()
    }
}

impl From<Bytes> for StreamingBlob {
    fn from(data: Bytes) -> Self {
        Self::new(Cursor::new(data))
    }
}

impl From<Vec<u8>> for StreamingBlob {
    fn from(data: Vec<u8>) -> Self {
        Self::new(Cursor::new(data))
    }
}

impl From<&'static str> for StreamingBlob {
    fn from(data: &'static str) -> Self {
        Self::new(Cursor::new(data.as_bytes()))
    }
}
