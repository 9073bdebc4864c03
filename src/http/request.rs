use bytes::Bytes;

use crate::http::headers::HeaderMap;

/// Parse progress of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Waiting for the request line.
    Initialized,
    /// Request line read; consuming header lines.
    ParsingHeaders,
    /// Header section complete; waiting for `Content-Length` bytes.
    ParsingBody,
    /// The request is complete and must not be fed more input.
    Done,
}

/// Represents an HTTP/1.1 request read from a client connection.
///
/// Built incrementally by [`RequestParser`](crate::http::parser::RequestParser)
/// and handed to the handler once its state is [`RequestState::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request method, e.g. `GET`. Always non-empty uppercase ASCII letters.
    pub method: String,
    /// Request target as sent, e.g. `/search?q=rust`.
    pub target: String,
    /// Protocol version without the `HTTP/` prefix; always `"1.1"`.
    pub version: String,
    /// Request headers, keyed by lowercased name.
    pub headers: HeaderMap,
    /// Request body; exactly `Content-Length` bytes, or empty.
    pub body: Bytes,
    pub(crate) state: RequestState,
}

impl Request {
    pub(crate) fn new() -> Self {
        Self {
            method: String::new(),
            target: String::new(),
            version: String::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            state: RequestState::Initialized,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }
}
