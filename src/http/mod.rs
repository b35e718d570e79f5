//! HTTP/1.x protocol implementation.
//!
//! Requests are parsed incrementally: bytes arrive in arbitrary fragments
//! and the connection context resumes where it stopped on each delivery.
//!
//! # Architecture
//!
//! - **`scanner`**: Line terminator search and token character checks
//! - **`parser`**: Request line and header block parsing
//! - **`body`**: Fixed-length and chunked body framing
//! - **`connection`**: Per-connection state machine and the TCP driver
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`error`**: Protocol violations and their status codes
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌───────────────────┐
//!   ┌──▶ │  AwaitingHeaders  │ ← Wait for a blank line ending the head
//!   │    └─────────┬─────────┘
//!   │              │ Head parsed
//!   │              ├─ Content-Length ──────▶ AwaitingFixedBody
//!   │              ├─ Transfer-Encoding ───▶ AwaitingChunkedBody
//!   │              └─ neither ─────────────▶ complete
//!   │                                            │
//!   │    callback(handle, request), reset        │
//!   └────────────────────────────────────────────┘
//!
//!   any violation ──▶ Closed
//! ```
//!
//! # Example
//!
//! ```
//! use strand::config::Limits;
//! use strand::http::connection::{ConnectionContext, ConnectionHandle};
//! use strand::http::request::Request;
//! use strand::http::response::Response;
//!
//! let mut ctx = ConnectionContext::new(
//!     ConnectionHandle::new(1, None),
//!     Limits::default(),
//!     |handle: &mut ConnectionHandle, request: Request| {
//!         handle.send(&Response::ok(request.path));
//!     },
//! );
//!
//! ctx.on_bytes(b"GET /hello HTT").unwrap();
//! assert!(!ctx.handle().has_outbound());
//!
//! ctx.on_bytes(b"P/1.1\r\n\r\n").unwrap();
//! assert!(ctx.handle().has_outbound());
//! ```

pub mod body;
pub mod connection;
pub mod error;
pub mod parser;
pub mod request;
pub mod response;
pub mod scanner;
pub mod writer;
