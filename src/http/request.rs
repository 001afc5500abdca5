use std::fmt;

use crate::http::parser::ParseError;

/// HTTP request methods.
///
/// Only `GET` and `HEAD` are served. Any other token is kept verbatim so it
/// can be logged, and is answered with 405 Method Not Allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// Any other method token
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::Other(token) => token,
        }
    }

    /// Returns `true` for the methods this server answers.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

impl From<&str> for Method {
    /// Method tokens are case-sensitive: `get` is not `GET`.
    fn from(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request line.
///
/// Headers and bodies are never read, so the request line is all there is.
/// A `Request` can only be obtained fully populated, through [`Request::new`]
/// or the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    version: String,
}

impl Request {
    /// Builds a request, rejecting targets that are not origin-form paths.
    pub fn new(
        method: impl Into<Method>,
        path: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(ParseError::InvalidTarget);
        }

        Ok(Self {
            method: method.into(),
            path,
            version: version.into(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Protocol version token, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_valid_method(&self) -> bool {
        self.method.is_allowed()
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}
