use std::fmt;

use crate::http::request::{Method, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing before the first line terminator.
    EmptyRequest,
    /// The request line is not exactly `METHOD SP TARGET SP VERSION`.
    InvalidRequestLine,
    /// The target does not start with `/`.
    InvalidTarget,
    /// The request line is not valid UTF-8.
    InvalidEncoding,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::EmptyRequest => "empty request line",
            ParseError::InvalidRequestLine => "malformed request line",
            ParseError::InvalidTarget => "request target must start with '/'",
            ParseError::InvalidEncoding => "request line is not valid UTF-8",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Parses the request line at the start of `buf`.
///
/// Everything after the first CRLF (headers, body) is ignored. When `buf`
/// holds no CRLF at all, the whole buffer is taken as the request line.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    let line = match find_line_end(buf) {
        Some(end) => &buf[..end],
        None => buf,
    };

    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
    if line.is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    let mut parts = line.split(' ');
    let method = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let target = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let version = parts.next().ok_or(ParseError::InvalidRequestLine)?;

    if parts.next().is_some() || method.is_empty() || version.is_empty() {
        return Err(ParseError::InvalidRequestLine);
    }

    Request::new(Method::from(method), target, version)
}

/// Offset of the first CRLF in `buf`, if any.
pub fn find_line_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
