use std::collections::HashMap;
use std::fmt;

/// HTTP request methods.
///
/// The proxy never rejects a method: anything outside the well-known set is
/// carried through verbatim as `Extension`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other token, kept exactly as received
    Extension(String),
}

impl Method {
    /// Parses an HTTP method token. Matching is case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use relaycache::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Extension("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Extension(other.to_string()),
        }
    }

    /// The method token as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Extension(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Header names are stored exactly as received; a repeated header keeps the
/// last value seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as the client sent it
    pub uri: String,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Request headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Request body, delimited by Content-Length
    pub body: Vec<u8>,
}

/// Builder for constructing Request objects.
#[derive(Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body and a matching Content-Length header.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            uri: self.uri.ok_or("uri missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Request {
    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// The `Host` header, which names the origin server for this request.
    pub fn host(&self) -> Option<&str> {
        self.header("Host")
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        content_length(&self.headers)
    }
}

/// Shared Content-Length rule for both message kinds: absent or non-numeric means zero.
pub(crate) fn content_length(headers: &HashMap<String, String>) -> usize {
    declared_length(headers).unwrap_or(0)
}

/// Content-Length as declared: `Ok(0)` when absent, `Err(raw)` when the value
/// is not a number.
pub(crate) fn declared_length(headers: &HashMap<String, String>) -> Result<usize, &str> {
    match headers.get("Content-Length") {
        Some(value) => value.trim().parse().map_err(|_| value.as_str()),
        None => Ok(0),
    }
}
