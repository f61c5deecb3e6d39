use crate::http::request::{self, Method, Request};
use crate::http::response::{Response, StatusCode};
use std::collections::HashMap;
use thiserror::Error;

/// Upper bound on the start line plus header block of a single message.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("incomplete message")]
    Incomplete,
    #[error("malformed request line")]
    InvalidRequestLine,
    #[error("malformed status line")]
    InvalidStatusLine,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("message head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("connection closed before a complete message was read")]
    UnexpectedEof,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// `ParseError::Incomplete` when more input is needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let skipped = leading_blank_bytes(buf);
    let (start_line, headers, body, consumed) = split_message(&buf[skipped..])?;

    let mut parts = start_line.split_ascii_whitespace();
    let (Some(method), Some(uri), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidRequestLine);
    };

    if !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidRequestLine);
    }

    let request = Request {
        method: Method::parse(method),
        uri: uri.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    Ok((request, skipped + consumed))
}

/// Parses one response from the front of `buf`.
pub fn parse_http_response(buf: &[u8]) -> Result<(Response, usize), ParseError> {
    let (status_line, headers, body, consumed) = split_message(buf)?;

    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().ok_or(ParseError::InvalidStatusLine)?;
    let code = parts.next().ok_or(ParseError::InvalidStatusLine)?;
    let reason = parts.next().unwrap_or("");

    let code_is_valid = code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit());
    if !version.starts_with("HTTP/") || !code_is_valid {
        return Err(ParseError::InvalidStatusLine);
    }
    let code: u16 = code.parse().map_err(|_| ParseError::InvalidStatusLine)?;

    let response = Response {
        version: version.to_string(),
        status: StatusCode(code),
        reason: reason.to_string(),
        headers,
        body,
    };

    Ok((response, consumed))
}

/// Whether `buf` already holds a full message head (through the blank line).
pub(crate) fn head_complete(buf: &[u8]) -> bool {
    find_head_end(&buf[leading_blank_bytes(buf)..]).is_some()
}

/// Splits a message into start line, headers, body and total length.
///
/// The head is split on raw bytes and decoded as ISO-8859-1, one char per
/// byte, so any octet (obs-text included) is accepted and written back out
/// unchanged by the writer.
fn split_message(
    buf: &[u8],
) -> Result<(String, HashMap<String, String>, Vec<u8>, usize), ParseError> {
    let (head_len, body_start) = find_head_end(buf).ok_or(ParseError::Incomplete)?;

    let mut lines = buf[..head_len]
        .split(|&b| b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l));

    let start_line = decode_latin1(lines.next().unwrap_or_default());

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(ParseError::InvalidHeader)?;
        let key = line[..colon].trim_ascii();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader);
        }
        let value = line[colon + 1..].trim_ascii();

        // Repeated names: last one wins
        headers.insert(decode_latin1(key), decode_latin1(value));
    }

    let content_length = request::content_length(&headers);
    let body_bytes = &buf[body_start..];

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();
    Ok((start_line, headers, body, body_start + content_length))
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Locates the blank line ending the head.
///
/// Returns `(head_len, body_start)`: the head without its terminating blank
/// line, and the offset right after it. Accepts CRLF or bare LF.
fn find_head_end(buf: &[u8]) -> Option<(usize, usize)> {
    let mut line_start = 0;

    for (i, &b) in buf.iter().enumerate() {
        if b != b'\n' {
            continue;
        }

        let line = &buf[line_start..i];
        if line_start > 0 && (line.is_empty() || line == b"\r") {
            return Some((line_start, i + 1));
        }
        line_start = i + 1;
    }

    None
}

/// Empty lines a client may send ahead of a request line.
fn leading_blank_bytes(buf: &[u8]) -> usize {
    buf.iter().take_while(|&&b| b == b'\r' || b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.uri, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn head_end_requires_blank_line() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n"), None);
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\n"), Some((16, 18)));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\n\nrest"), Some((15, 16)));
    }

    #[test]
    fn leading_blank_lines_are_consumed() {
        let req = b"\r\n\r\nGET /x HTTP/1.1\r\nHost: a\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.uri, "/x");
        assert_eq!(consumed, req.len());
        assert!(head_complete(req));
    }

    #[test]
    fn high_bytes_decode_one_char_each() {
        assert_eq!(decode_latin1(b"caf\xe9"), "caf\u{e9}");
        assert_eq!(decode_latin1(b"\xc3\xa9").chars().count(), 2);
    }
}
