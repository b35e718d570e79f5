//! Body framing: fixed length or chunked.

use std::collections::HashMap;

use crate::config::Limits;
use crate::http::error::HttpError;
use crate::http::parser::parse_header_line;
use crate::http::request::Request;
use crate::http::scanner::{check_eol, find_eol};

/// How the body following a header block is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Neither Content-Length nor Transfer-Encoding: no body.
    Empty,
    /// Exactly this many bytes follow.
    Fixed(usize),
    Chunked,
}

impl Framing {
    /// Picks the framing from the request headers.
    ///
    /// Content-Length is consulted first. Any Transfer-Encoding other than
    /// `chunked` is rejected.
    pub fn for_request(request: &Request, limits: &Limits) -> Result<Self, HttpError> {
        if let Some(value) = request.header("Content-Length") {
            let length: u64 = value
                .trim_end_matches([' ', '\t'])
                .parse()
                .map_err(|_| HttpError::InvalidContentLength)?;
            if length > limits.max_request_len as u64 {
                return Err(HttpError::RequestTooLarge {
                    limit: limits.max_request_len,
                });
            }
            return Ok(Framing::Fixed(length as usize));
        }

        if let Some(value) = request.header("Transfer-Encoding") {
            let value = value.trim_end_matches([' ', '\t']);
            if !value.eq_ignore_ascii_case("chunked") {
                return Err(HttpError::UnsupportedTransferEncoding(value.to_string()));
            }
            return Ok(Framing::Chunked);
        }

        Ok(Framing::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    Complete,
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Size,
    Data { remaining: usize },
    DataEnd,
    Trailer,
    Done,
}

/// Resumable decoder for `Transfer-Encoding: chunked`.
///
/// Each call to [`ChunkedDecoder::decode`] consumes as much of the input as
/// it can and appends decoded payload to the caller's body.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: ChunkState,
    limit: usize,
    trailers: HashMap<String, String>,
    trailer_len: usize,
}

impl ChunkedDecoder {
    /// `limit` caps the decoded body length.
    pub fn new(limit: usize) -> Self {
        Self {
            state: ChunkState::Size,
            limit,
            trailers: HashMap::new(),
            trailer_len: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ChunkState::Done
    }

    /// Bytes of trailer lines read so far.
    pub fn trailer_len(&self) -> usize {
        self.trailer_len
    }

    pub fn take_trailers(&mut self) -> HashMap<String, String> {
        std::mem::take(&mut self.trailers)
    }

    /// Decodes from `input`, returning whether the terminating chunk and
    /// trailer have been read, and how many input bytes were consumed.
    pub fn decode(
        &mut self,
        input: &[u8],
        body: &mut Vec<u8>,
    ) -> Result<(DecodeStatus, usize), HttpError> {
        let mut consumed = 0;
        loop {
            let rest = &input[consumed..];
            let step = match self.state {
                ChunkState::Size => self.decode_size(rest, body.len())?,
                ChunkState::Data { remaining } => {
                    let take = remaining.min(rest.len());
                    body.extend_from_slice(&rest[..take]);
                    if take == remaining {
                        self.state = ChunkState::DataEnd;
                    } else {
                        self.state = ChunkState::Data {
                            remaining: remaining - take,
                        };
                    }
                    (take > 0).then_some(take)
                }
                ChunkState::DataEnd => match rest {
                    [] | [b'\r'] => None,
                    [b'\r', b'\n', ..] => {
                        self.state = ChunkState::Size;
                        Some(2)
                    }
                    [b'\n', ..] => {
                        self.state = ChunkState::Size;
                        Some(1)
                    }
                    _ => return Err(HttpError::InvalidChunkTerminator),
                },
                ChunkState::Trailer => self.decode_trailer(rest, body.len())?,
                ChunkState::Done => return Ok((DecodeStatus::Complete, consumed)),
            };

            match step {
                Some(n) => consumed += n,
                None => return Ok((DecodeStatus::Incomplete, consumed)),
            }
        }
    }

    fn decode_size(&mut self, rest: &[u8], decoded: usize) -> Result<Option<usize>, HttpError> {
        let Some(end) = find_eol(rest)? else {
            return Ok(None);
        };

        let line = &rest[..end.pos];
        // Chunk extensions are ignored.
        let digits = match line.iter().position(|&b| b == b';') {
            Some(semi) => &line[..semi],
            None => line,
        };
        let digits = digits.trim_ascii();
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(HttpError::InvalidChunkSize);
        }

        let size = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| usize::from_str_radix(s, 16).ok())
            .ok_or(HttpError::InvalidChunkSize)?;
        if decoded.saturating_add(size) > self.limit {
            return Err(HttpError::RequestTooLarge { limit: self.limit });
        }

        self.state = match size {
            0 => ChunkState::Trailer,
            remaining => ChunkState::Data { remaining },
        };
        Ok(Some(end.next()))
    }

    fn decode_trailer(&mut self, rest: &[u8], decoded: usize) -> Result<Option<usize>, HttpError> {
        if rest == b"\r" {
            return Ok(None);
        }

        let width = check_eol(rest)?;
        if width > 0 {
            self.state = ChunkState::Done;
            return Ok(Some(width));
        }

        let Some(end) = find_eol(rest)? else {
            return Ok(None);
        };
        // Trailers count toward the same cap as the body.
        self.trailer_len += end.next();
        if decoded.saturating_add(self.trailer_len) > self.limit {
            return Err(HttpError::RequestTooLarge { limit: self.limit });
        }

        let (name, value) = parse_header_line(&rest[..end.pos])?;
        self.trailers.insert(name, value);
        Ok(Some(end.next()))
    }
}
