use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::http::buffer::ByteWindow;
use crate::http::headers::{HeaderError, find_crlf};
use crate::http::request::{Request, RequestState};

const SUPPORTED_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("request line must have exactly three space-separated parts")]
    InvalidRequestLine,
    #[error("method must be non-empty uppercase ASCII letters")]
    InvalidMethod,
    #[error("request target must contain '/'")]
    InvalidTarget,
    #[error("only HTTP/1.1 is supported")]
    UnsupportedVersion,
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("Content-Length is not a non-negative integer")]
    InvalidContentLength,
    #[error("body is longer than Content-Length")]
    BodyExceedsContentLength,
    #[error("body present without Content-Length")]
    BodyWithoutContentLength,
    #[error("stream ended before the request line was complete")]
    IncompleteRequestLine,
    #[error("stream ended before the end of the headers")]
    IncompleteHeaders,
    #[error("stream ended before Content-Length bytes of body were read")]
    IncompleteBody,
    #[error("parser fed after the request was complete")]
    ReadAfterDone,
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// True for errors caused by the bytes the peer sent, as opposed to
    /// transport failures or misuse of the parser.
    pub fn is_protocol_error(&self) -> bool {
        !matches!(self, ParseError::Io(_) | ParseError::ReadAfterDone)
    }
}

/// Incremental HTTP/1.1 request parser.
///
/// Feed it the unconsumed bytes of a [`ByteWindow`] with [`parse`]; it
/// returns how many bytes it consumed, and the caller slides the window by
/// that amount before reading more.
///
/// [`parse`]: RequestParser::parse
#[derive(Debug)]
pub struct RequestParser {
    request: Request,
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            request: Request::new(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.request.state
    }

    pub fn is_done(&self) -> bool {
        self.request.state == RequestState::Done
    }

    /// The request as parsed so far.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Runs parse steps over `data` until one consumes nothing or the
    /// request is complete. Returns the total number of bytes consumed.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Err(ParseError::ReadAfterDone);
        }

        let mut total = 0;
        while !self.is_done() {
            let n = self.parse_single(&data[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }

        Ok(total)
    }

    /// Hands out the finished request, or the error matching how far parsing
    /// got before the input ran out.
    pub fn finish(self) -> Result<Request, ParseError> {
        match self.request.state {
            RequestState::Initialized => Err(ParseError::IncompleteRequestLine),
            RequestState::ParsingHeaders => Err(ParseError::IncompleteHeaders),
            RequestState::ParsingBody => Err(ParseError::IncompleteBody),
            RequestState::Done => Ok(self.request),
        }
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.request.state {
            RequestState::Initialized => {
                let n = self.parse_request_line(data)?;
                if n > 0 {
                    self.request.state = RequestState::ParsingHeaders;
                }
                Ok(n)
            }

            RequestState::ParsingHeaders => {
                let (n, done) = self.request.headers.parse(data)?;
                if done {
                    self.request.state = RequestState::ParsingBody;
                }
                Ok(n)
            }

            RequestState::ParsingBody => self.parse_body(data),

            RequestState::Done => Err(ParseError::ReadAfterDone),
        }
    }

    fn parse_request_line(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(line_end) = find_crlf(data) else {
            return Ok(0);
        };

        let line = std::str::from_utf8(&data[..line_end])
            .map_err(|_| ParseError::InvalidRequestLine)?;

        let parts: Vec<&str> = line.split(' ').collect();
        let &[method, target, version] = parts.as_slice() else {
            return Err(ParseError::InvalidRequestLine);
        };

        if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ParseError::InvalidMethod);
        }

        if !target.contains('/') {
            return Err(ParseError::InvalidTarget);
        }

        if version != SUPPORTED_VERSION {
            return Err(ParseError::UnsupportedVersion);
        }

        self.request.method = method.to_string();
        self.request.target = target.to_string();
        self.request.version = version.strip_prefix("HTTP/").unwrap_or(version).to_string();

        Ok(line_end + 2)
    }

    fn parse_body(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(raw) = self.request.headers.get("Content-Length") else {
            if !data.is_empty() {
                return Err(ParseError::BodyWithoutContentLength);
            }
            self.request.state = RequestState::Done;
            return Ok(0);
        };

        let expected = parse_content_length(raw)?;

        if data.len() > expected {
            return Err(ParseError::BodyExceedsContentLength);
        }

        // The window is the buffer of record: wait until the whole body is
        // there, then take it in one piece.
        if data.len() < expected {
            return Ok(0);
        }

        self.request.body = Bytes::copy_from_slice(data);
        self.request.state = RequestState::Done;
        Ok(data.len())
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_content_length(raw: &str) -> Result<usize, ParseError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength);
    }
    raw.parse().map_err(|_| ParseError::InvalidContentLength)
}

/// Reads one complete request from `reader`.
///
/// Bytes are accumulated in a [`ByteWindow`] starting at `buffer_size`
/// capacity and fed to a [`RequestParser`] after every read, so any
/// fragmentation of the stream yields the same request.
pub async fn read_request<R>(reader: &mut R, buffer_size: usize) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut window = ByteWindow::with_capacity(buffer_size);
    let mut parser = RequestParser::new();

    while !parser.is_done() {
        let n = window.fill_from(reader).await?;
        if n == 0 {
            break;
        }

        let consumed = parser.parse(window.filled())?;
        window.slide(consumed);
    }

    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";

        let mut parser = RequestParser::new();
        let consumed = parser.parse(req).unwrap();

        assert_eq!(consumed, req.len());
        let parsed = parser.finish().unwrap();
        assert_eq!(parsed.method, "GET");
        assert_eq!(parsed.target, "/");
        assert_eq!(parsed.version, "1.1");
        assert_eq!(parsed.header("host"), Some("localhost:42069"));
    }

    #[test]
    fn waits_for_full_request_line() {
        let mut parser = RequestParser::new();
        assert_eq!(parser.parse(b"GET / HTT").unwrap(), 0);
        assert_eq!(parser.state(), RequestState::Initialized);
    }

    #[test]
    fn content_length_must_be_digits() {
        assert!(parse_content_length("42").is_ok());
        assert!(matches!(
            parse_content_length("+5"),
            Err(ParseError::InvalidContentLength)
        ));
        assert!(matches!(
            parse_content_length("-1"),
            Err(ParseError::InvalidContentLength)
        ));
        assert!(matches!(
            parse_content_length(""),
            Err(ParseError::InvalidContentLength)
        ));
    }
}
