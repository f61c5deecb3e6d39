//! Origin server connections
//!
//! Each cache miss dials the origin named by the request's Host header,
//! sends the request, and reads back exactly one response. The connection
//! is never reused.

use anyhow::{Context, Result};
use tokio::net::TcpStream;

use crate::config::OriginConfig;
use crate::http::reader::MessageReader;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::MessageWriter;

/// Resolves a Host header value to a `host:port` dial address.
///
/// An explicit port in the header is kept; otherwise `default_port` is
/// appended.
///
/// # Example
///
/// ```
/// # use relaycache::proxy::origin::origin_addr;
/// assert_eq!(origin_addr("example.com", 80), "example.com:80");
/// assert_eq!(origin_addr("example.com:8080", 80), "example.com:8080");
/// assert_eq!(origin_addr("[::1]", 80), "[::1]:80");
/// ```
pub fn origin_addr(host: &str, default_port: u16) -> String {
    if has_explicit_port(host) {
        host.to_string()
    } else {
        format!("{}:{}", host, default_port)
    }
}

fn has_explicit_port(host: &str) -> bool {
    let Some((name, port)) = host.rsplit_once(':') else {
        return false;
    };

    let bracketed_v6 = name.starts_with('[') && name.ends_with(']');
    let plain_name = !name.contains(':');

    (bracketed_v6 || plain_name) && !port.is_empty() && port.parse::<u16>().is_ok()
}

/// A connected origin that has been sent one request and owes one response.
pub struct OriginExchange {
    addr: String,
    reader: MessageReader<TcpStream>,
}

impl OriginExchange {
    /// Dials the origin for `host` and forwards `request` verbatim.
    pub async fn send(host: &str, request: &Request, cfg: &OriginConfig) -> Result<Self> {
        let addr = origin_addr(host, cfg.default_port);

        let mut stream = TcpStream::connect(&addr)
            .await
            .with_context(|| format!("failed to connect to origin {}", addr))?;

        tracing::debug!(origin = %addr, uri = %request.uri, "Connected to origin");

        MessageWriter::request(request)
            .write_to_stream(&mut stream)
            .await
            .with_context(|| format!("failed to send request to origin {}", addr))?;

        Ok(Self {
            addr,
            reader: MessageReader::new(stream),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Reads the response and closes the origin connection.
    pub async fn receive(mut self) -> Result<Response> {
        let response = self
            .reader
            .read_response()
            .await
            .with_context(|| format!("failed to parse response from origin {}", self.addr))?;

        // Dropping the stream closes the socket
        drop(self.reader);

        Ok(response)
    }
}

/// Full cache-miss round trip: connect, send, receive, close.
pub async fn fetch(host: &str, request: &Request, cfg: &OriginConfig) -> Result<Response> {
    OriginExchange::send(host, request, cfg).await?.receive().await
}
