use std::time::SystemTime;

use bytes::Bytes;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = "statik";

/// Version used when the request line could not be read.
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): File found and served
/// - `BadRequest` (400): Request line could not be parsed
/// - `Forbidden` (403): Resource type is not servable
/// - `NotFound` (404): No such file under the document root
/// - `MethodNotAllowed` (405): Method other than GET or HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method not allowed
    MethodNotAllowed,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use statik::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            400 => Some(StatusCode::BadRequest),
            403 => Some(StatusCode::Forbidden),
            404 => Some(StatusCode::NotFound),
            405 => Some(StatusCode::MethodNotAllowed),
            _ => None,
        }
    }

    /// Returns the reason phrase sent on the status line.
    ///
    /// # Example
    ///
    /// ```
    /// # use statik::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::MethodNotAllowed.reason_phrase(), "Method not allowed");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method not allowed",
        }
    }
}

/// A complete HTTP response ready to be serialized.
///
/// Headers keep their insertion order, which is the order they go on the wire.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Protocol version echoed on the status line
    pub version: String,
    /// Header name/value pairs, unique names, in wire order
    pub headers: Vec<(String, String)>,
    /// Response body; empty for HEAD and non-200 responses
    pub body: Bytes,
}

impl Response {
    /// Starts a response carrying the standard header set:
    /// `Server`, `Date`, `Content-Type` and `Connection: Closed`.
    pub fn standard(status: StatusCode, version: &str, content_type: &str) -> ResponseBuilder {
        ResponseBuilder::new(status)
            .version(version)
            .header("Server", SERVER_NAME)
            .header("Date", httpdate::fmt_http_date(SystemTime::now()))
            .header("Content-Type", content_type)
            .header("Connection", "Closed")
    }

    /// Looks up a header by exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(b"<h1>hi</h1>".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    version: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: DEFAULT_VERSION.to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds a header, or replaces the value of an existing one in place.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// Appends `Content-Length` from the body size unless it was already set
    /// (HEAD responses set it to the size of the body they omit).
    pub fn build(mut self) -> Response {
        if !self.headers.iter().any(|(k, _)| k == "Content-Length") {
            let len = self.body.len().to_string();
            self.headers.push(("Content-Length".to_string(), len));
        }

        Response {
            status: self.status,
            version: self.version,
            headers: self.headers,
            body: self.body,
        }
    }
}
