//! Fixed response writer: every reachable outcome answers `HTTP/1.0 200`
//! with a JSON content type.

use std::io::{self, Write};

/// Server identifier advertised in the `Server-name` response header.
pub const SERVER_NAME: &str = "VjRestServer";

const STATUS_LINE: &str = "HTTP/1.0 200";
const CONTENT_TYPE: &str = "Content-type: application/json";

/// Write the fixed header block and the serialized body.
///
/// The advertised `Content-length` is the body length plus one: the writer
/// appends a trailing newline after the body and counts it, preserving the
/// original wire format byte for byte.
pub fn write_response<W: Write>(out: &mut W, body: &[u8]) -> io::Result<()> {
    let header = format!(
        "{STATUS_LINE}\r\n{CONTENT_TYPE}\r\nServer-name: {SERVER_NAME}\r\nContent-length: {}\r\n\r\n",
        body.len() + 1
    );
    out.write_all(header.as_bytes())?;
    out.write_all(body)?;
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_counts_trailing_newline() {
        let mut out = Vec::new();
        write_response(&mut out, b"{\"ok\":true}").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.0 200\r\n"));
        assert!(text.contains("Content-type: application/json\r\n"));
        assert!(text.contains("Server-name: VjRestServer\r\n"));
        assert!(text.contains("Content-length: 12\r\n"));
        assert!(text.ends_with("{\"ok\":true}\n"));
    }
}
