use std::collections::HashMap;
use std::fmt;

/// An HTTP status code as carried on the status line.
///
/// Any three-digit code relayed from an origin is kept as is. A few common
/// codes have named constants for building responses by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 204 No Content
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    /// 304 Not Modified
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    /// 502 Bad Gateway
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use relaycache::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode(418).as_u16(), 418);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the standard reason phrase, if this code has a well-known one.
    ///
    /// # Example
    ///
    /// ```
    /// # use relaycache::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.canonical_reason(), Some("OK"));
    /// assert_eq!(StatusCode(299).canonical_reason(), None);
    /// ```
    pub fn canonical_reason(&self) -> Option<&'static str> {
        let reason = match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => return None,
        };
        Some(reason)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a complete HTTP response, either parsed from an origin or
/// served from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP version from the status line
    pub version: String,
    /// The HTTP status code
    pub status: StatusCode,
    /// Reason phrase exactly as received (may be empty)
    pub reason: String,
    /// HTTP headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use relaycache::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .header("Content-Type", "text/plain")
///     .body(b"hello".to_vec())
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("5"));
/// ```
pub struct ResponseBuilder {
    version: String,
    status: StatusCode,
    reason: Option<String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status,
            reason: None,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Overrides the reason phrase. Defaults to the canonical one.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds a Content-Length header based on body size if not already present.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());

        let reason = self
            .reason
            .unwrap_or_else(|| self.status.canonical_reason().unwrap_or("").to_string());

        Response {
            version: self.version,
            status: self.status,
            reason,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::OK).body(body.into()).build()
    }

    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Parsed Content-Length; 0 when missing or not numeric.
    pub fn content_length(&self) -> usize {
        crate::http::request::content_length(&self.headers)
    }

    /// Like [`content_length`](Self::content_length), but hands back the raw
    /// header value when it is not a number.
    pub fn declared_length(&self) -> Result<usize, &str> {
        crate::http::request::declared_length(&self.headers)
    }

    /// True only when the `Connection` header is exactly `close`.
    pub fn closes_connection(&self) -> bool {
        self.header("Connection") == Some("close")
    }
}
