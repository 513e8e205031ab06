use std::{error::Error, fmt, io};

use bytes::Bytes;
use futures_core::Stream;
use futures_util::stream;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::mime::Mime;
use crate::multer::{self, Multipart};
use crate::PartContentError;

/// A lazy, single-pass reader over the parts of a `multipart/form-data`
/// body.
///
/// Parts come back in wire order. Each part's content must be consumed, or
/// the part dropped, before the next part can be read; earlier parts cannot
/// be revisited.
pub struct PartReader {
    inner: Multipart<'static>,
}

impl PartReader {
    /// Read parts from a stream of body chunks.
    pub fn new<S, B, E>(body: S, boundary: impl Into<String>) -> PartReader
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: Into<Bytes> + 'static,
        E: Into<Box<dyn Error + Send + Sync>> + 'static, {
        PartReader {
            inner: Multipart::new(body, boundary)
        }
    }

    /// Read parts from a body that is already in memory.
    pub fn from_bytes(body: Bytes, boundary: impl Into<String>) -> PartReader {
        PartReader::new(stream::once(async move { Ok::<_, io::Error>(body) }), boundary)
    }

    /// Read parts from an asynchronous byte reader.
    pub fn from_reader<R>(body: R, boundary: impl Into<String>) -> PartReader
    where
        R: AsyncRead + Send + 'static, {
        PartReader::new(ReaderStream::new(body), boundary)
    }

    /// Advance to the next part.
    ///
    /// `Ok(None)` means the closing boundary was reached. An error means no
    /// further parts can be located; the reader is unusable afterwards.
    pub async fn next_part(&mut self) -> Result<Option<Part>, multer::Error> {
        Ok(self.inner.next_field().await?.map(|inner| Part {
            inner,
        }))
    }
}

impl fmt::Debug for PartReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartReader").finish_non_exhaustive()
    }
}

/// One named, delimited unit of the body.
pub struct Part {
    inner: multer::Field<'static>,
}

impl Part {
    /// The wire-name labelling this part.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    /// The original file name, if the part was submitted as a file. May be
    /// empty: browsers submit untouched file inputs with an empty file name.
    #[inline]
    pub fn file_name(&self) -> Option<&str> {
        self.inner.file_name()
    }

    /// The MIME type declared for the content.
    #[inline]
    pub fn content_type(&self) -> Option<&Mime> {
        self.inner.content_type()
    }

    /// Read the content to completion into an owned buffer, refusing to
    /// retain more than `size_limit` bytes.
    ///
    /// Consumes the part; content can be read exactly once.
    pub async fn bytes(mut self, size_limit: u64) -> Result<Vec<u8>, PartContentError> {
        let mut buffer = Vec::new();

        while let Some(chunk) = self.inner.chunk().await? {
            if buffer.len() as u64 + chunk.len() as u64 > size_limit {
                return Err(PartContentError::TooLarge(size_limit));
            }

            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer)
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("name", &self.inner.name())
            .field("file_name", &self.inner.file_name())
            .field("content_type", &self.inner.content_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "--reader-test-boundary";

    fn two_part_body() -> Bytes {
        let mut body = Vec::new();

        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"picture\"; \
                 filename=\"p.txt\"\r\nContent-Type: text/plain\r\n\r\npayload\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Bytes::from(body)
    }

    #[tokio::test]
    async fn parts_come_back_in_wire_order() {
        let mut reader = PartReader::from_bytes(two_part_body(), BOUNDARY);

        let first = reader.next_part().await.unwrap().unwrap();
        assert_eq!(first.name(), Some("title"));
        assert_eq!(first.file_name(), None);
        assert_eq!(first.bytes(1024).await.unwrap(), b"hello");

        let second = reader.next_part().await.unwrap().unwrap();
        assert_eq!(second.name(), Some("picture"));
        assert_eq!(second.file_name(), Some("p.txt"));
        assert_eq!(second.bytes(1024).await.unwrap(), b"payload");

        assert!(reader.next_part().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn content_past_the_size_limit_is_refused() {
        let mut reader = PartReader::from_bytes(two_part_body(), BOUNDARY);

        let part = reader.next_part().await.unwrap().unwrap();

        assert!(matches!(part.bytes(3).await, Err(PartContentError::TooLarge(3))));
    }

    #[tokio::test]
    async fn unconsumed_parts_are_skipped_on_advance() {
        let mut reader = PartReader::from_bytes(two_part_body(), BOUNDARY);

        drop(reader.next_part().await.unwrap().unwrap());

        let second = reader.next_part().await.unwrap().unwrap();
        assert_eq!(second.name(), Some("picture"));
    }

    #[tokio::test]
    async fn async_readers_are_accepted_as_bodies() {
        let body = io::Cursor::new(two_part_body().to_vec());
        let mut reader = PartReader::from_reader(body, BOUNDARY);

        let first = reader.next_part().await.unwrap().unwrap();
        assert_eq!(first.name(), Some("title"));
    }

    #[tokio::test]
    async fn a_truncated_stream_is_an_error() {
        let body = Bytes::from(format!("--{BOUNDARY}\r\nContent-Dispo"));
        let mut reader = PartReader::from_bytes(body, BOUNDARY);

        assert!(reader.next_part().await.is_err());
    }
}
