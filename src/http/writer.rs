use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::request::Request;
use crate::http::response::Response;

pub fn serialize_request(req: &Request) -> Vec<u8> {
    let mut buf = Vec::new();

    // Request line
    let request_line = format!("{} {} {}\r\n", req.method, req.uri, req.version);
    put_text(&mut buf, &request_line);

    write_headers_and_body(&mut buf, req.headers.iter(), &req.body);
    buf
}

pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = if resp.reason.is_empty() {
        format!("{} {}\r\n", resp.version, resp.status)
    } else {
        format!("{} {} {}\r\n", resp.version, resp.status, resp.reason)
    };
    put_text(&mut buf, &status_line);

    write_headers_and_body(&mut buf, resp.headers.iter(), &resp.body);
    buf
}

fn write_headers_and_body<'a>(
    buf: &mut Vec<u8>,
    headers: impl Iterator<Item = (&'a String, &'a String)>,
    body: &[u8],
) {
    for (k, v) in headers {
        put_text(buf, k);
        buf.extend_from_slice(b": ");
        put_text(buf, v);
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf.extend_from_slice(body);
}

/// Inverse of the parser's ISO-8859-1 decoding: chars up to U+00FF go out as
/// the single byte they came from, anything wider as UTF-8.
fn put_text(buf: &mut Vec<u8>, text: &str) {
    if text.is_ascii() {
        buf.extend_from_slice(text.as_bytes());
        return;
    }

    for c in text.chars() {
        match u8::try_from(c) {
            Ok(byte) => buf.push(byte),
            Err(_) => buf.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
        }
    }
}

/// A serialized message plus how much of it has reached the stream.
pub struct MessageWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl MessageWriter {
    pub fn request(request: &Request) -> Self {
        Self {
            buffer: serialize_request(request),
            written: 0,
        }
    }

    pub fn response(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes the remaining bytes and flushes the stream.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}

pub async fn write_request<W>(stream: &mut W, request: &Request) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    MessageWriter::request(request).write_to_stream(stream).await
}

pub async fn write_response<W>(stream: &mut W, response: &Response) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    MessageWriter::response(response).write_to_stream(stream).await
}
