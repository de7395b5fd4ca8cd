//! Tests for the raw request parser.

use std::io::Cursor;
use vrest::{parse_request, ParseError};

fn parse(raw: &str) -> Result<vrest::HttpRequest, ParseError> {
    parse_request(&mut Cursor::new(raw.as_bytes().to_vec()))
}

#[test]
fn test_parse_request_with_headers_and_no_body() {
    let req = parse("GET /cities/NYC HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n").unwrap();
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/cities/NYC");
    assert_eq!(req.version.as_deref(), Some("HTTP/1.1"));
    assert_eq!(req.headers.get("Host"), Some(&"x".to_string()));
    assert_eq!(req.headers.get("Content-Length"), Some(&"0".to_string()));
    assert!(req.body.is_none());
}

#[test]
fn test_action_concatenates_method_and_path() {
    let req = parse("DELETE /cities/NYC HTTP/1.0\r\n\r\n").unwrap();
    assert_eq!(req.action(), "DELETE/cities/NYC");
}

#[test]
fn test_body_consumes_exactly_content_length_bytes() {
    // The body contains \r\n sequences that look like header terminators.
    let req = parse("POST /x HTTP/1.0\r\nContent-Length: 10\r\n\r\nab\r\n\r\ncdef").unwrap();
    assert_eq!(req.body.as_deref(), Some(&b"ab\r\n\r\ncdef"[..]));
}

#[test]
fn test_json_body_round_trips_through_codec() {
    let payload = r#"{"code":"BOS","name":"Boston"}"#;
    let raw = format!(
        "POST /cities/new HTTP/1.0\r\nContent-Length: {}\r\n\r\n{}",
        payload.len(),
        payload
    );
    let req = parse(&raw).unwrap();
    let value: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(value["code"], "BOS");
    assert_eq!(value["name"], "Boston");
}

#[test]
fn test_header_values_are_trimmed_and_split_at_first_colon() {
    let req = parse("GET / HTTP/1.0\r\nX-Custom:   a:b:c  \r\n\r\n").unwrap();
    assert_eq!(req.headers.get("X-Custom"), Some(&"a:b:c".to_string()));
}

#[test]
fn test_duplicate_header_overwrites_earlier_value() {
    let req = parse("GET / HTTP/1.0\r\nX-Dup: one\r\nX-Dup: two\r\n\r\n").unwrap();
    assert_eq!(req.headers.get("X-Dup"), Some(&"two".to_string()));
}

#[test]
fn test_lines_without_colon_are_ignored() {
    let req = parse("GET / HTTP/1.0\r\nnot a header line\r\nHost: y\r\n\r\n").unwrap();
    assert_eq!(req.headers.len(), 1);
    assert_eq!(req.headers.get("Host"), Some(&"y".to_string()));
}

#[test]
fn test_bare_newline_line_endings_are_accepted() {
    let req = parse("GET /plain HTTP/1.0\nHost: z\n\n").unwrap();
    assert_eq!(req.path, "/plain");
    assert_eq!(req.headers.get("Host"), Some(&"z".to_string()));
}

#[test]
fn test_request_line_without_version_parses() {
    let req = parse("GET /short\r\n\r\n").unwrap();
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/short");
    assert!(req.version.is_none());
}

#[test]
fn test_empty_stream_is_missing_request_line() {
    assert!(matches!(parse(""), Err(ParseError::MissingRequestLine)));
    assert!(matches!(parse("\r\n"), Err(ParseError::MissingRequestLine)));
}

#[test]
fn test_method_without_path_is_malformed() {
    assert!(matches!(
        parse("GET\r\n\r\n"),
        Err(ParseError::MalformedRequestLine(_))
    ));
}

#[test]
fn test_non_numeric_content_length_is_rejected() {
    let result = parse("POST /x HTTP/1.0\r\nContent-Length: lots\r\n\r\n");
    match result {
        Err(ParseError::BadContentLength(raw)) => assert_eq!(raw, "lots"),
        other => panic!("expected BadContentLength, got {other:?}"),
    }
}

#[test]
fn test_truncated_body_is_io_error() {
    let result = parse("POST /x HTTP/1.0\r\nContent-Length: 50\r\n\r\nshort");
    assert!(matches!(result, Err(ParseError::Io(_))));
}
