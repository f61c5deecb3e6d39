//! Stream-level framing on top of the buffer parsers.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::parser::{self, MAX_HEAD_SIZE, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;

const BUFFER_SIZE: usize = 8192;

/// Reads whole HTTP messages from a byte stream.
///
/// Bytes read past the end of one message stay buffered for the next, so a
/// single reader must be kept for the lifetime of a keep-alive connection.
pub struct MessageReader<S> {
    stream: S,
    buffer: BytesMut,
}

impl<S: AsyncRead + Unpin> MessageReader<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(BUFFER_SIZE),
        }
    }

    /// Reads the next request.
    ///
    /// `Ok(None)` means the peer closed the connection cleanly between
    /// requests; a close in the middle of a request is `UnexpectedEof`.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        self.read_message(parser::parse_http_request).await
    }

    /// Reads the next response. Any close before it is complete is an error.
    pub async fn read_response(&mut self) -> Result<Response, ParseError> {
        self.read_message(parser::parse_http_response)
            .await?
            .ok_or(ParseError::UnexpectedEof)
    }

    async fn read_message<T>(
        &mut self,
        parse: fn(&[u8]) -> Result<(T, usize), ParseError>,
    ) -> Result<Option<T>, ParseError> {
        loop {
            match parse(&self.buffer[..]) {
                Ok((message, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(message));
                }
                Err(ParseError::Incomplete) => {
                    let oversized = self.buffer.len() > MAX_HEAD_SIZE;
                    if oversized && !parser::head_complete(&self.buffer[..]) {
                        return Err(ParseError::HeadTooLarge(MAX_HEAD_SIZE));
                    }
                }
                Err(e) => return Err(e),
            }

            self.buffer.reserve(BUFFER_SIZE);
            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                let only_blank_lines = self.buffer.iter().all(|&b| b == b'\r' || b == b'\n');
                return if only_blank_lines {
                    Ok(None)
                } else {
                    Err(ParseError::UnexpectedEof)
                };
            }
        }
    }

    /// Access to the underlying stream, e.g. for writing the reply.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}
