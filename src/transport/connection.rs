use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, warn};

use crate::http::parser;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::transport::wire::{parse_http_request, ParseError, ServerContext};
use crate::transport::writer::ResponseWriter;
use crate::transport::TransportState;

/// Application callback turning a parsed request into a reply.
pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    ctx: ServerContext,
    handler: Handler,
}

pub enum ConnectionState {
    Reading,
    Processing(TransportState),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, ctx: ServerContext, handler: Handler) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            ctx,
            handler,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(Ok(raw)) => ConnectionState::Processing(raw),
                    Some(Err(e)) => {
                        warn!("Malformed request: {:?}", e);
                        let status = e.status();
                        let response =
                            Response::with_status(status.to_string(), status, Default::default());
                        ConnectionState::Writing(ResponseWriter::from_response(response, false)?, false)
                    }
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(raw) => {
                    let (response, keep_alive, head_only) = self.handle_request(&raw);
                    let writer = ResponseWriter::from_response(response, head_only)?;
                    ConnectionState::Writing(writer, keep_alive)
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Reads until one full request is buffered.
    ///
    /// `Ok(None)` means the client closed the connection; `Some(Err(_))` is a
    /// framing or size error, answered with [`ParseError::status`] before
    /// closing. The buffer never grows much past the wire size limits.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Result<TransportState, ParseError>>> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer, &self.ctx) {
                Ok((raw, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(Ok(raw)));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Ok(Some(Err(e))),
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }
        }
    }

    fn handle_request(&self, raw: &TransportState) -> (Response, bool, bool) {
        match parser::parse(raw) {
            Ok(request) => {
                let response = (self.handler)(&request);
                debug!(
                    method = %request.method(),
                    uri = request.uri(),
                    status = response.status_code(),
                    "Handled request"
                );
                (response, request.keep_alive(), request.method() == Method::HEAD)
            }
            Err(e) => {
                warn!(code = e.code(), "Request rejected: {}", e);
                (Response::from_error(&e), false, false)
            }
        }
    }
}
