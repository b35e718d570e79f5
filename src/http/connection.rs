use std::net::SocketAddr;

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use crate::config::{Config, Limits};
use crate::http::body::{ChunkedDecoder, DecodeStatus, Framing};
use crate::http::error::HttpError;
use crate::http::parser::{Progress, parse_head};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::{ResponseWriter, serialize_response};

/// The application's view of a connection while handling a request.
///
/// Responses are queued here and flushed by the driver once the current
/// delivery has been processed.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: u64,
    peer: Option<SocketAddr>,
    outbound: BytesMut,
    close_requested: bool,
}

impl ConnectionHandle {
    pub fn new(id: u64, peer: Option<SocketAddr>) -> Self {
        Self {
            id,
            peer,
            outbound: BytesMut::new(),
            close_requested: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Queues raw bytes for transmission.
    pub fn write(&mut self, bytes: &[u8]) {
        self.outbound.extend_from_slice(bytes);
    }

    /// Queues a serialized response for transmission.
    pub fn send(&mut self, response: &Response) {
        self.write(&serialize_response(response));
    }

    /// Asks the driver to close once queued bytes are written.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    pub fn is_closing(&self) -> bool {
        self.close_requested
    }

    pub fn has_outbound(&self) -> bool {
        !self.outbound.is_empty()
    }

    pub fn take_outbound(&mut self) -> Bytes {
        self.outbound.split().freeze()
    }
}

/// Parsing phase of a connection.
#[derive(Debug)]
pub enum State {
    AwaitingHeaders,
    AwaitingFixedBody { length: usize },
    AwaitingChunkedBody(ChunkedDecoder),
    /// A violation or end-of-stream was seen; nothing more is parsed.
    Closed,
}

enum Step {
    NeedMoreData,
    Continue,
    Complete,
}

/// Per-connection parsing state.
///
/// Bytes are appended on every delivery and the parser for the current
/// [`State`] is driven until it needs more data. Consumed bytes are
/// released from the front of the buffer, so anything left after a
/// completed request belongs to the next one.
pub struct ConnectionContext<F> {
    handle: ConnectionHandle,
    buffer: BytesMut,
    scan_cursor: usize,
    state: State,
    request: Request,
    limits: Limits,
    on_request: F,
}

impl<F> ConnectionContext<F>
where
    F: FnMut(&mut ConnectionHandle, Request),
{
    pub fn new(handle: ConnectionHandle, limits: Limits, on_request: F) -> Self {
        Self {
            handle,
            buffer: BytesMut::with_capacity(4096),
            scan_cursor: 0,
            state: State::AwaitingHeaders,
            request: Request::default(),
            limits,
            on_request,
        }
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut ConnectionHandle {
        &mut self.handle
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Bytes held for the request in progress: unconsumed input plus any
    /// body and trailer lines already decoded.
    pub fn buffered(&self) -> usize {
        let trailers = match &self.state {
            State::AwaitingChunkedBody(decoder) => decoder.trailer_len(),
            _ => 0,
        };
        self.buffer.len() + self.request.body.len() + trailers
    }

    /// Handles a delivery of bytes from the transport.
    ///
    /// Completed requests are passed to the callback before this returns.
    /// Any error leaves the context closed.
    pub fn on_bytes(&mut self, data: &[u8]) -> Result<(), HttpError> {
        if matches!(self.state, State::Closed) {
            return Err(HttpError::UnexpectedState);
        }

        if self.buffered() + data.len() > self.limits.max_request_len {
            self.shut();
            return Err(HttpError::RequestTooLarge {
                limit: self.limits.max_request_len,
            });
        }

        self.buffer.extend_from_slice(data);

        let result = self.drive();
        if result.is_err() {
            self.shut();
        }
        result
    }

    /// Handles end-of-stream. No parsing happens; a partially received
    /// request is reported as truncated.
    pub fn on_end(&mut self) -> Result<(), HttpError> {
        let truncated = match self.state {
            State::AwaitingHeaders => !self.buffer.is_empty(),
            State::Closed => false,
            _ => true,
        };
        self.shut();

        if truncated {
            Err(HttpError::TruncatedRequest)
        } else {
            Ok(())
        }
    }

    fn drive(&mut self) -> Result<(), HttpError> {
        loop {
            let step = match self.state {
                State::AwaitingHeaders => self.on_start()?,
                State::AwaitingFixedBody { length } => self.on_body(length),
                State::AwaitingChunkedBody(_) => self.on_chunked()?,
                State::Closed => return Err(HttpError::UnexpectedState),
            };

            match step {
                Step::NeedMoreData => return Ok(()),
                Step::Continue => {}
                Step::Complete => {
                    self.complete();
                    if self.buffer.is_empty() || self.handle.is_closing() {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn on_start(&mut self) -> Result<Step, HttpError> {
        let progress = parse_head(&self.buffer, &mut self.scan_cursor, &self.limits)?;
        let Progress::Complete((mut request, head_len)) = progress else {
            return Ok(Step::NeedMoreData);
        };

        self.buffer.advance(head_len);
        self.scan_cursor = 0;

        let framing = Framing::for_request(&request, &self.limits)?;
        self.state = match framing {
            Framing::Empty => {
                self.request = request;
                return Ok(Step::Complete);
            }
            Framing::Fixed(length) => {
                request.body_length = Some(length as u64);
                State::AwaitingFixedBody { length }
            }
            Framing::Chunked => {
                State::AwaitingChunkedBody(ChunkedDecoder::new(self.limits.max_request_len))
            }
        };
        trace!(
            method = %request.method,
            path = %request.path,
            framing = ?framing,
            "Header block parsed"
        );
        self.request = request;

        Ok(Step::Continue)
    }

    fn on_body(&mut self, length: usize) -> Step {
        if self.buffer.len() < length {
            return Step::NeedMoreData;
        }

        self.request.body = self.buffer.split_to(length).to_vec();
        Step::Complete
    }

    fn on_chunked(&mut self) -> Result<Step, HttpError> {
        let State::AwaitingChunkedBody(decoder) = &mut self.state else {
            return Err(HttpError::UnexpectedState);
        };

        let (status, consumed) = decoder.decode(&self.buffer, &mut self.request.body)?;
        self.buffer.advance(consumed);

        match status {
            DecodeStatus::Incomplete => Ok(Step::NeedMoreData),
            DecodeStatus::Complete => {
                self.request.trailers = decoder.take_trailers();
                Ok(Step::Complete)
            }
        }
    }

    fn complete(&mut self) {
        let request = std::mem::take(&mut self.request);
        debug!(
            connection = self.handle.id,
            peer = ?self.handle.peer(),
            method = %request.method,
            path = %request.path,
            body_len = request.body.len(),
            "Request complete"
        );

        (self.on_request)(&mut self.handle, request);
        self.reset();
    }

    /// Starts over for the next request. Surplus input stays buffered.
    fn reset(&mut self) {
        self.state = State::AwaitingHeaders;
        self.scan_cursor = 0;
        self.request = Request::default();
    }

    fn shut(&mut self) {
        self.state = State::Closed;
        self.buffer.clear();
        self.request = Request::default();
    }
}

/// Drives a [`ConnectionContext`] from a TCP stream.
pub struct Connection<F> {
    stream: TcpStream,
    context: ConnectionContext<F>,
    read_buffer_size: usize,
    error_responses: bool,
}

impl<F> Connection<F>
where
    F: FnMut(&mut ConnectionHandle, Request),
{
    pub fn new(stream: TcpStream, id: u64, cfg: &Config, on_request: F) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            stream,
            context: ConnectionContext::new(ConnectionHandle::new(id, peer), cfg.limits, on_request),
            read_buffer_size: cfg.server.read_buffer_size.max(1),
            error_responses: cfg.server.error_responses,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut temp = vec![0u8; self.read_buffer_size];

        loop {
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                if let Err(e) = self.context.on_end() {
                    debug!(
                        connection = self.context.handle().id(),
                        error = %e,
                        "Stream ended mid-request"
                    );
                }
                break;
            }

            match self.context.on_bytes(&temp[..n]) {
                Ok(()) => {
                    self.flush().await?;
                    if self.context.handle().is_closing() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        connection = self.context.handle().id(),
                        status = e.status().as_u16(),
                        error = %e,
                        "Protocol violation, closing connection"
                    );
                    self.flush().await?;
                    if self.error_responses {
                        ResponseWriter::new(&e.to_response())
                            .write_to_stream(&mut self.stream)
                            .await?;
                    }
                    break;
                }
            }
        }

        self.stream.shutdown().await?;
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        if !self.context.handle().has_outbound() {
            return Ok(());
        }

        let bytes = self.context.handle_mut().take_outbound();
        ResponseWriter::from_bytes(bytes.to_vec())
            .write_to_stream(&mut self.stream)
            .await
    }
}
