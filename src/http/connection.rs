use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::http::parser::{ParseError, read_request};
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::ResponseWriter;
use crate::server::Handler;

/// Upper bound on input discarded after a rejected request.
const DRAIN_LIMIT: u64 = 64 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Drives a single request/response exchange over one client stream.
pub struct Connection<S> {
    stream: S,
    read_buffer_size: usize,
    state: ConnectionState,
    drain_on_close: bool,
}

pub enum ConnectionState {
    Reading,
    Handling(Request),
    Rejecting(ParseError),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, read_buffer_size: usize) -> Self {
        Self {
            stream,
            read_buffer_size,
            state: ConnectionState::Reading,
            drain_on_close: false,
        }
    }

    pub async fn run<H: Handler>(&mut self, handler: &H) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match read_request(&mut self.stream, self.read_buffer_size).await {
                        Ok(req) => ConnectionState::Handling(req),
                        Err(ParseError::IncompleteRequestLine) => {
                            debug!("Peer closed before sending a request line");
                            ConnectionState::Closed
                        }
                        Err(e) if e.is_protocol_error() => ConnectionState::Rejecting(e),
                        Err(e) => return Err(e).context("failed to read request"),
                    };
                }

                ConnectionState::Handling(req) => {
                    debug!(method = %req.method, path = %req.target, "Handling request");

                    let mut writer = ResponseWriter::new(&mut self.stream);
                    handler.handle(&req, &mut writer).await;
                    writer.flush().await.context("failed to flush response")?;
                }

                ConnectionState::Rejecting(err) => {
                    warn!(error = %err, "Rejecting malformed request");
                    Self::write_bad_request(&mut self.stream, &err)
                        .await
                        .context("failed to write 400 response")?;
                    self.drain_on_close = true;
                }

                ConnectionState::Closed => {
                    self.stream
                        .shutdown()
                        .await
                        .context("failed to close connection")?;
                    if self.drain_on_close {
                        self.drain().await;
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads and discards whatever the peer is still sending, so closing the
    /// socket with unread input does not reset the 400 away before the client
    /// reads it. Stops at EOF, [`DRAIN_LIMIT`] bytes or [`DRAIN_TIMEOUT`].
    async fn drain(&mut self) {
        let mut rest = (&mut self.stream).take(DRAIN_LIMIT);
        match timeout(DRAIN_TIMEOUT, tokio::io::copy(&mut rest, &mut tokio::io::sink())).await {
            Ok(Ok(n)) => debug!(bytes = n, "Drained rejected connection"),
            Ok(Err(e)) => debug!(error = %e, "Drain ended with error"),
            Err(_) => debug!("Drain timed out"),
        }
    }

    async fn write_bad_request(stream: &mut S, err: &ParseError) -> anyhow::Result<()> {
        let body = err.to_string();
        let mut writer = ResponseWriter::new(stream);
        writer.write_status_line(StatusCode::BadRequest.as_u16()).await?;
        writer.write_headers(&default_headers(body.len())).await?;
        writer.write_body(body.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}
