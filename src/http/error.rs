//! Protocol violations.
//!
//! Every variant is fatal to the connection that produced it. The driver
//! logs it, optionally writes [`HttpError::to_response`] back, and closes.

use crate::http::response::{Response, ResponseBuilder, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Buffered input would grow past the configured cap.
    #[error("request exceeds the {limit} byte limit")]
    RequestTooLarge { limit: usize },

    #[error("malformed request line")]
    InvalidRequestLine,

    #[error("invalid character in method")]
    InvalidMethod,

    #[error("method longer than {limit} bytes")]
    MethodTooLong { limit: usize },

    #[error("invalid character in request target")]
    InvalidPath,

    #[error("request target longer than {limit} bytes")]
    PathTooLong { limit: usize },

    #[error("unsupported protocol version")]
    InvalidVersion,

    /// A `CR` not followed by `LF`, or a missing terminator where one is required.
    #[error("invalid line ending")]
    InvalidLineEnding,

    /// A control or non-ASCII byte inside a header line.
    #[error("invalid character 0x{0:02x} in header block")]
    InvalidCharacter(u8),

    #[error("malformed header line")]
    InvalidHeader,

    #[error("invalid Content-Length header value")]
    InvalidContentLength,

    #[error("unsupported Transfer-Encoding {0:?}")]
    UnsupportedTransferEncoding(String),

    #[error("invalid chunk size line")]
    InvalidChunkSize,

    #[error("unexpected data after chunk payload")]
    InvalidChunkTerminator,

    /// The stream ended with a partial request buffered.
    #[error("connection closed mid-request")]
    TruncatedRequest,

    #[error("connection in unexpected state")]
    UnexpectedState,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::RequestTooLarge { .. } => StatusCode::PayloadTooLarge,
            HttpError::PathTooLong { .. } => StatusCode::UriTooLong,
            HttpError::UnsupportedTransferEncoding(_) => StatusCode::NotImplemented,
            HttpError::UnexpectedState => StatusCode::InternalServerError,
            HttpError::InvalidRequestLine
            | HttpError::InvalidMethod
            | HttpError::MethodTooLong { .. }
            | HttpError::InvalidPath
            | HttpError::InvalidVersion
            | HttpError::InvalidLineEnding
            | HttpError::InvalidCharacter(_)
            | HttpError::InvalidHeader
            | HttpError::InvalidContentLength
            | HttpError::InvalidChunkSize
            | HttpError::InvalidChunkTerminator
            | HttpError::TruncatedRequest => StatusCode::BadRequest,
        }
    }

    /// Renders the violation as a response the driver can write before closing.
    pub fn to_response(&self) -> Response {
        let status = self.status();
        ResponseBuilder::new(status)
            .header("Connection", "close")
            .body(status.reason_phrase().as_bytes().to_vec())
            .build()
    }
}

