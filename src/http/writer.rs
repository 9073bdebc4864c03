use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::HeaderMap;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &[u8] = b"\r\n";

/// Position of a [`ResponseWriter`] within the response message.
///
/// Phases only move forward. `Trailers` and `Done` are reached only through
/// chunked framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WriterPhase {
    StatusLine,
    Headers,
    Body,
    Trailers,
    Done,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("response written out of order: expected {expected:?} phase, writer is in {actual:?}")]
    OrderViolation {
        expected: WriterPhase,
        actual: WriterPhase,
    },
    #[error("unknown status code {0}")]
    UnknownStatusCode(u16),
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes an HTTP/1.1 response to a byte sink in strict framing order.
///
/// Every method checks the current phase before touching the sink, so a
/// rejected call never leaves partial bytes behind.
///
/// ```text
/// StatusLine ─► Headers ─► Body ─┬─ write_body*             (Content-Length framing)
///                                └─ write_chunked_body*
///                                   write_chunked_body_done ─► Trailers
///                                   write_trailers          ─► Done
/// ```
#[derive(Debug)]
pub struct ResponseWriter<W> {
    sink: W,
    phase: WriterPhase,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            phase: WriterPhase::StatusLine,
        }
    }

    pub fn phase(&self) -> WriterPhase {
        self.phase
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    ///
    /// Only 200, 400 and 500 are accepted; any other code is rejected
    /// without writing and the writer stays in the status-line phase.
    pub async fn write_status_line(&mut self, code: u16) -> Result<(), WriteError> {
        self.expect(WriterPhase::StatusLine)?;
        let status = StatusCode::from_u16(code).ok_or(WriteError::UnknownStatusCode(code))?;

        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.sink.write_all(line.as_bytes()).await?;

        self.phase = WriterPhase::Headers;
        Ok(())
    }

    /// Writes every header as `name: value\r\n` in insertion order, then the
    /// blank line ending the header section.
    pub async fn write_headers(&mut self, headers: &HeaderMap) -> Result<(), WriteError> {
        self.expect(WriterPhase::Headers)?;

        let mut buf = Vec::new();
        serialize_fields(&mut buf, headers);
        buf.extend_from_slice(CRLF);
        self.sink.write_all(&buf).await?;

        self.phase = WriterPhase::Body;
        Ok(())
    }

    /// Writes raw body bytes. The caller must have declared a matching
    /// `Content-Length`.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect(WriterPhase::Body)?;
        self.sink.write_all(body).await?;
        Ok(body.len())
    }

    /// Writes one chunk as `<HEX len>\r\n<bytes>\r\n`.
    ///
    /// An empty `chunk` produces `0\r\n\r\n` and does not end the body; use
    /// [`write_chunked_body_done`](Self::write_chunked_body_done) for that.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriteError> {
        self.expect(WriterPhase::Body)?;

        let size_line = format!("{:X}\r\n", chunk.len());
        let mut buf = Vec::with_capacity(size_line.len() + chunk.len() + CRLF.len());
        buf.extend_from_slice(size_line.as_bytes());
        buf.extend_from_slice(chunk);
        buf.extend_from_slice(CRLF);
        self.sink.write_all(&buf).await?;

        Ok(buf.len())
    }

    /// Writes the last-chunk line `0\r\n`. The message is not complete until
    /// [`write_trailers`](Self::write_trailers) has been called.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, WriteError> {
        self.expect(WriterPhase::Body)?;

        const LAST_CHUNK: &[u8] = b"0\r\n";
        self.sink.write_all(LAST_CHUNK).await?;

        self.phase = WriterPhase::Trailers;
        Ok(LAST_CHUNK.len())
    }

    /// Writes the trailer fields followed by the blank line that ends the
    /// chunked message. Must be called exactly once, even with no trailers.
    pub async fn write_trailers(&mut self, trailers: &HeaderMap) -> Result<(), WriteError> {
        self.expect(WriterPhase::Trailers)?;

        let mut buf = Vec::new();
        serialize_fields(&mut buf, trailers);
        buf.extend_from_slice(CRLF);
        self.sink.write_all(&buf).await?;

        self.phase = WriterPhase::Done;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.sink.flush().await?;
        Ok(())
    }

    fn expect(&self, expected: WriterPhase) -> Result<(), WriteError> {
        if self.phase != expected {
            return Err(WriteError::OrderViolation {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }
}

fn serialize_fields(buf: &mut Vec<u8>, fields: &HeaderMap) {
    for (name, value) in fields.iter() {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(CRLF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunk_size_is_uppercase_hex() {
        let mut writer = ResponseWriter::new(Vec::<u8>::new());
        writer.write_status_line(200).await.unwrap();
        writer.write_headers(&HeaderMap::new()).await.unwrap();

        let n = writer.write_chunked_body(&[b'x'; 26]).await.unwrap();

        assert_eq!(n, 4 + 26 + 2);
        let out = writer.into_inner();
        assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n\r\n1A\r\n"));
        assert!(out.ends_with(b"xx\r\n"));
    }

    #[tokio::test]
    async fn empty_chunk_keeps_body_open() {
        let mut writer = ResponseWriter::new(Vec::<u8>::new());
        writer.write_status_line(200).await.unwrap();
        writer.write_headers(&HeaderMap::new()).await.unwrap();

        writer.write_chunked_body(b"").await.unwrap();

        assert_eq!(writer.phase(), WriterPhase::Body);
        writer.write_chunked_body(b"ab").await.unwrap();
    }
}
