//! End-to-end tests over real sockets: raw request bytes in, wire-exact
//! response bytes out.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpStream;
use vrest::cities::{self, CityStore};
use vrest::runtime_config::RuntimeConfig;
use vrest::{Dispatcher, RestServer, ServerHandle};

fn start_server() -> ServerHandle {
    may::config().set_stack_size(0x10000);

    let mut router = vrest::Router::new();
    let store = CityStore::with_samples();
    cities::register_routes(&mut router, &store);

    let config = RuntimeConfig {
        stack_size: 0x10000,
        workers: 4,
    };
    let server = RestServer::with_config(Dispatcher::new(router), config);
    let handle = server.start("127.0.0.1:0").expect("bind failed");
    handle.wait_ready().expect("server not ready");
    handle
}

/// Send raw bytes, read until the server closes, and split the response into
/// status line, headers, and body bytes.
fn send_raw(handle: &ServerHandle, raw: &[u8]) -> (String, HashMap<String, String>, Vec<u8>) {
    let mut stream = TcpStream::connect(handle.local_addr()).expect("connect failed");
    stream.write_all(raw).expect("write failed");
    let mut response = Vec::new();
    stream.read_to_end(&mut response).expect("read failed");

    let split = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator in response");
    let head = String::from_utf8(response[..split].to_vec()).expect("header block not UTF-8");
    let body = response[split + 4..].to_vec();

    let mut lines = head.lines();
    let status = lines.next().unwrap_or_default().to_string();
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    (status, headers, body)
}

fn body_json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).expect("body is JSON")
}

#[test]
fn test_get_city_end_to_end() {
    let handle = start_server();
    let (status, headers, body) = send_raw(&handle, b"GET /cities/NYC HTTP/1.1\r\nHost: x\r\n\r\n");

    assert_eq!(status, "HTTP/1.0 200");
    assert_eq!(
        headers.get("Content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        headers.get("Server-name").map(String::as_str),
        Some("VjRestServer")
    );
    // Advertised length covers the body plus the trailing newline.
    let advertised: usize = headers.get("Content-length").unwrap().parse().unwrap();
    assert_eq!(advertised, body.len());
    assert_eq!(body.last(), Some(&b'\n'));

    let value = body_json(&body[..body.len() - 1]);
    assert_eq!(value["code"], "NYC");
    assert_eq!(value["name"], "New York");

    handle.stop();
}

#[test]
fn test_create_then_fetch_city() {
    let handle = start_server();
    let payload = br#"{"code":"BOS2","name":"Boston Two"}"#;
    let request = format!(
        "POST /cities/new HTTP/1.0\r\nContent-Length: {}\r\n\r\n",
        payload.len()
    );
    let mut raw = request.into_bytes();
    raw.extend_from_slice(payload);

    let (status, _, body) = send_raw(&handle, &raw);
    assert_eq!(status, "HTTP/1.0 200");
    let created = body_json(&body[..body.len() - 1]);
    assert_eq!(created["code"], "BOS2");
    assert_eq!(created["name"], "Boston Two");

    let (_, _, body) = send_raw(&handle, b"GET /cities/BOS2 HTTP/1.0\r\n\r\n");
    let fetched = body_json(&body[..body.len() - 1]);
    assert_eq!(fetched["code"], "BOS2");

    handle.stop();
}

#[test]
fn test_delete_city_end_to_end() {
    let handle = start_server();

    let (status, _, body) = send_raw(&handle, b"DELETE /cities/LAX HTTP/1.0\r\n\r\n");
    assert_eq!(status, "HTTP/1.0 200");
    assert_eq!(
        body_json(&body[..body.len() - 1]),
        serde_json::json!("City [LAX] deleted successfully")
    );

    // The route still resolves; the entity is gone.
    let (_, _, body) = send_raw(&handle, b"GET /cities/LAX HTTP/1.0\r\n\r\n");
    assert_eq!(&body, b"null\n");

    handle.stop();
}

#[test]
fn test_unregistered_route_echoes_request() {
    let handle = start_server();
    let (status, _, body) = send_raw(
        &handle,
        b"GET /definitely/not/registered HTTP/1.1\r\nHost: here\r\n\r\n",
    );

    assert_eq!(status, "HTTP/1.0 200");
    let value = body_json(&body[..body.len() - 1]);
    assert_eq!(value["Http-Method"], "GET");
    assert_eq!(value["Context-Path"], "/definitely/not/registered");
    assert_eq!(value["Action"], "GET/definitely/not/registered");
    assert_eq!(value["Host"], "here");

    handle.stop();
}

#[test]
fn test_echo_route_registered_at_root() {
    let handle = start_server();
    let (_, _, body) = send_raw(&handle, b"GET /echo/hello HTTP/1.0\r\n\r\n");
    assert_eq!(
        body_json(&body[..body.len() - 1]),
        serde_json::json!("echo: hello")
    );
    handle.stop();
}

#[test]
fn test_malformed_request_still_answers_200() {
    let handle = start_server();
    let (status, _, body) = send_raw(&handle, b"\r\n\r\n");

    assert_eq!(status, "HTTP/1.0 200");
    let value = body_json(&body[..body.len() - 1]);
    assert!(value["error"].is_string());

    handle.stop();
}

#[test]
fn test_start_without_workers_is_refused() {
    may::config().set_stack_size(0x10000);
    let config = RuntimeConfig {
        stack_size: 0x10000,
        workers: 0,
    };
    let server = RestServer::with_config(Dispatcher::new(vrest::Router::new()), config);
    assert!(server.start("127.0.0.1:0").is_err());
}

#[test]
fn test_sequential_connections_are_independent() {
    let handle = start_server();
    for code in ["NYC", "SFO", "BOS"] {
        let raw = format!("GET /cities/{code} HTTP/1.0\r\n\r\n");
        let (_, _, body) = send_raw(&handle, raw.as_bytes());
        let value = body_json(&body[..body.len() - 1]);
        assert_eq!(value["code"], code.to_string());
    }
    handle.stop();
}
