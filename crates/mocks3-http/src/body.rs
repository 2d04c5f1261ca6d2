//! Response body for the MockS3 service.
//!
//! [`S3ResponseBody`] has three modes:
//!
//! - **Buffered**: XML documents, error bodies, small payloads.
//! - **Streaming**: object reads. Chunks are pulled from an [`ObjectReader`]
//!   as hyper asks for them, so a large object (or a range of one) is never
//!   loaded into memory in full.
//! - **Empty**: 204s, PUT acknowledgements and every HEAD response.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::StreamExt;
use http_body::Frame;
use http_body_util::Full;
use mocks3_core::ObjectReader;
use tokio_util::io::ReaderStream;

/// MockS3 response body.
///
/// Implements [`http_body::Body`] so it can be used directly with hyper responses.
#[derive(Default)]
pub enum S3ResponseBody {
    /// Buffered body for small responses.
    Buffered(Full<Bytes>),
    /// Object body read on demand.
    Streaming {
        /// Chunked view of the reader.
        stream: ReaderStream<ObjectReader>,
        /// Bytes still expected; drives `size_hint` and end-of-stream.
        remaining: u64,
    },
    /// No body at all.
    #[default]
    Empty,
}

impl fmt::Debug for S3ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(full) => f.debug_tuple("Buffered").field(full).finish(),
            Self::Streaming { remaining, .. } => f
                .debug_struct("Streaming")
                .field("remaining", remaining)
                .finish_non_exhaustive(),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

impl S3ResponseBody {
    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a buffered body from a UTF-8 string.
    #[must_use]
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::Buffered(Full::new(Bytes::from(s.into())))
    }

    /// Create a buffered body from an XML byte vector.
    #[must_use]
    pub fn from_xml(xml: Vec<u8>) -> Self {
        Self::Buffered(Full::new(Bytes::from(xml)))
    }

    /// Stream exactly `len` bytes out of `reader`.
    #[must_use]
    pub fn streaming(reader: ObjectReader, len: u64) -> Self {
        Self::Streaming {
            stream: ReaderStream::new(reader),
            remaining: len,
        }
    }
}

impl http_body::Body for S3ResponseBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Streaming { stream, remaining } => match stream.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    *remaining = remaining.saturating_sub(chunk.len() as u64);
                    Poll::Ready(Some(Ok(Frame::data(chunk))))
                }
                Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    *remaining = 0;
                    Poll::Ready(None)
                }
                Poll::Pending => Poll::Pending,
            },
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Streaming { remaining, .. } => *remaining == 0,
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Streaming { remaining, .. } => http_body::SizeHint::with_exact(*remaining),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}
