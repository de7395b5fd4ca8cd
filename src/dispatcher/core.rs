//! Dispatcher core - the per-request resolve/bind/invoke/serialize path.

use crate::dispatcher::bind_params;
use crate::router::Router;
use crate::server::HttpRequest;
use http::Method;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a process-unique request id for correlation in logs and
/// fallback bodies.
#[must_use]
pub fn next_request_id() -> String {
    format!("request-{}", NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
}

/// Dispatches parsed requests against a read-only route registry.
///
/// The registry is built before serving starts and never re-enters a build
/// phase, so the dispatcher holds it behind a plain `Arc`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    /// The registry this dispatcher resolves against.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Resolve, bind, invoke, and serialize one request.
    ///
    /// Always yields response body bytes:
    /// - an unregistered route is not an error — the parsed request
    ///   parameters echo back as the diagnostic body
    /// - a handler error or panic is contained here and degrades the body to
    ///   serialized `null`; the connection still completes normally
    #[must_use]
    pub fn dispatch(&self, request: &HttpRequest) -> Vec<u8> {
        let request_id = next_request_id();
        debug!(
            request_id = %request_id,
            action = %request.action(),
            "Dispatching request"
        );

        let method = Method::from_bytes(request.method.as_bytes()).ok();
        let route = method
            .as_ref()
            .and_then(|m| self.router.lookup(m, &request.path));

        let route = match route {
            Some(route) => route,
            None => {
                info!(
                    request_id = %request_id,
                    action = %request.action(),
                    "No route matched, echoing request parameters"
                );
                return serialize(&fallback_body(request, &request_id));
            }
        };

        let bound = bind_params(&route, request, &request_id);
        let start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| (route.handler)(&bound)));
        let latency_us = start.elapsed().as_micros() as u64;

        match outcome {
            Ok(Ok(value)) => {
                info!(
                    request_id = %request_id,
                    pattern = %route.pattern,
                    latency_us = latency_us,
                    "Handler completed"
                );
                serialize(&value)
            }
            Ok(Err(err)) => {
                error!(
                    request_id = %request_id,
                    pattern = %route.pattern,
                    error = %err,
                    "Handler failed, degrading to null body"
                );
                serialize(&Value::Null)
            }
            Err(panic) => {
                error!(
                    request_id = %request_id,
                    pattern = %route.pattern,
                    panic = ?panic.downcast_ref::<&str>(),
                    "Handler panicked, degrading to null body"
                );
                serialize(&Value::Null)
            }
        }
    }
}

fn serialize(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|err| {
        warn!(error = %err, "Response serialization failed");
        b"null".to_vec()
    })
}

/// The diagnostic body for an unrouted request: the flat parsed-parameter
/// map the original wire protocol exposed.
fn fallback_body(request: &HttpRequest, request_id: &str) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(
        "Http-Method".to_string(),
        Value::String(request.method.clone()),
    );
    map.insert(
        "Context-Path".to_string(),
        Value::String(request.path.clone()),
    );
    map.insert("Action".to_string(), Value::String(request.action()));
    if let Some(version) = &request.version {
        map.insert("Http-Version".to_string(), Value::String(version.clone()));
    }
    map.insert("RequestId".to_string(), Value::String(request_id.to_string()));
    for (key, value) in &request.headers {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    if let Some(body) = &request.body {
        if let Ok(text) = std::str::from_utf8(body) {
            map.insert("Payload".to_string(), Value::String(text.to_string()));
        }
    }
    Value::Object(map)
}
