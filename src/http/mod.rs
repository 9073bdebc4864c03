//! HTTP/1.1 message framing.
//!
//! This module implements HTTP/1.1 framing directly on top of byte streams.
//! Every connection carries exactly one request and one response.
//!
//! # Architecture
//!
//! - **`headers`**: case-insensitive, insertion-ordered header map with an incremental line parser
//! - **`buffer`**: growable read window that slides past consumed bytes
//! - **`request`**: the parsed request value
//! - **`parser`**: incremental request parser and the read loop driving it
//! - **`response`**: status codes and default response headers
//! - **`writer`**: phase-ordered response writer with chunked bodies and trailers
//! - **`connection`**: per-connection driver tying parser, handler and writer together
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until a full request is parsed
//!        └──────┬──────┘
//!               │
//!       ┌───────┴────────┐
//!       │ ok             │ protocol error
//!       ▼                ▼
//! ┌────────────┐  ┌─────────────┐
//! │  Handling  │  │  Rejecting  │ ← 400 Bad Request
//! └─────┬──────┘  └──────┬──────┘
//!       └───────┬────────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Closed    │
//!        └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use httpwire::http::parser::read_request;
//! use httpwire::http::response::default_headers;
//! use httpwire::http::writer::ResponseWriter;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:42069").await?;
//!     let (mut socket, _addr) = listener.accept().await?;
//!
//!     let request = read_request(&mut socket, 1024).await?;
//!     let body = format!("you asked for {}\n", request.target);
//!
//!     let mut writer = ResponseWriter::new(&mut socket);
//!     writer.write_status_line(200).await?;
//!     writer.write_headers(&default_headers(body.len())).await?;
//!     writer.write_body(body.as_bytes()).await?;
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
