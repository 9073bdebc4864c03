//! Connection-accepting server.
//!
//! [`serve`] binds a TCP listener and spawns an accept loop. Every accepted
//! connection gets its own task that reads exactly one request, passes it
//! to the [`Handler`] together with a [`ResponseWriter`] bound to the same
//! connection, and then closes the connection.

use std::future::Future;

use tokio::io::AsyncWrite;

use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

pub mod listener;

pub use listener::{Server, serve, serve_config};

/// Produces the response for a parsed request.
///
/// The writer owns the whole response: status line, headers, body and, for
/// chunked responses, trailers. Nothing is written on the handler's behalf,
/// so a handler that never writes a status line sends an empty response.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        request: &Request,
        writer: &mut ResponseWriter<W>,
    ) -> impl Future<Output = ()> + Send
    where
        W: AsyncWrite + Unpin + Send;
}
