//! Strand - Incremental HTTP/1.x server core
//!
//! Resumable request parsing over fragmented byte streams, plus response
//! serialization.

pub mod config;
pub mod http;
pub mod server;
