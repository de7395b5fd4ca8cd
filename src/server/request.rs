//! Raw HTTP request parser operating directly on a buffered byte stream.
//!
//! One connection carries exactly one request: the request line, zero or
//! more header lines, an empty line, then — if a `Content-Length` header is
//! present — exactly that many raw body bytes. Chunked bodies, multipart,
//! and URL escaping are out of scope. A body shorter than declared blocks on
//! the underlying read until the peer closes the connection.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, Read};

/// A parsed request, owned exclusively by the worker handling its connection.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method token, verbatim from the request line.
    pub method: String,
    /// Request path, verbatim from the request line.
    pub path: String,
    /// Protocol version token, when the client sent one.
    pub version: Option<String>,
    /// Header map. Keys are case-sensitive; a later header with the same key
    /// overwrites the earlier one.
    pub headers: HashMap<String, String>,
    /// Raw body bytes, read byte-exact against `Content-Length`.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// The dispatch key: method and path concatenated with no separator.
    #[must_use]
    pub fn action(&self) -> String {
        format!("{}{}", self.method, self.path)
    }
}

/// Wire parse failure. Contained per-connection, never fatal to a worker.
#[derive(Debug)]
pub enum ParseError {
    /// The stream ended before a request line arrived.
    MissingRequestLine,
    /// The request line did not carry both a method and a path.
    MalformedRequestLine(String),
    /// `Content-Length` was present but not a usable integer.
    BadContentLength(String),
    /// The underlying socket read failed.
    Io(io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingRequestLine => write!(f, "missing request line"),
            ParseError::MalformedRequestLine(line) => {
                write!(f, "malformed request line: {line:?}")
            }
            ParseError::BadContentLength(raw) => {
                write!(f, "invalid Content-Length value: {raw:?}")
            }
            ParseError::Io(err) => write!(f, "i/o error while reading request: {err}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err)
    }
}

/// Parse one request from a buffered stream.
///
/// Reads the request line, header lines up to the terminating empty line,
/// and — when `Content-Length` declares a positive size — exactly that many
/// further bytes. Both `\r\n` and bare `\n` line endings are accepted.
pub fn parse_request<R: BufRead>(reader: &mut R) -> Result<HttpRequest, ParseError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(ParseError::MissingRequestLine);
    }
    let request_line = line.trim_end();
    if request_line.is_empty() {
        return Err(ParseError::MissingRequestLine);
    }

    let mut tokens = request_line.splitn(3, ' ');
    let method = tokens.next().unwrap_or_default();
    let path = tokens
        .next()
        .ok_or_else(|| ParseError::MalformedRequestLine(request_line.to_string()))?;
    if method.is_empty() || path.is_empty() {
        return Err(ParseError::MalformedRequestLine(request_line.to_string()));
    }
    let method = method.to_string();
    let path = path.to_string();
    let version = tokens.next().map(str::to_string);

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        // Split at the first colon; a colon in position zero is not a header.
        if let Some(idx) = line.find(':') {
            if idx > 0 {
                headers.insert(
                    line[..idx].trim().to_string(),
                    line[idx + 1..].trim().to_string(),
                );
            }
        }
    }

    let body = match headers.get("Content-Length") {
        Some(raw) => {
            let len: usize = raw
                .parse()
                .map_err(|_| ParseError::BadContentLength(raw.clone()))?;
            if len > 0 {
                let mut buf = vec![0u8; len];
                reader.read_exact(&mut buf)?;
                Some(buf)
            } else {
                None
            }
        }
        None => None,
    };

    Ok(HttpRequest {
        method,
        path,
        version,
        headers,
        body,
    })
}
