//! httpwire - HTTP/1.1 framing over raw TCP
//!
//! Core library: incremental request parsing, phase-ordered response
//! writing, and a one-request-per-connection server.

pub mod config;
pub mod http;
pub mod server;
