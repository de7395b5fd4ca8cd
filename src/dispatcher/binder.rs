//! Param binder - assembles named parameter values for a matched route.

use crate::router::{BoundParams, ParamSource, Route};
use crate::server::HttpRequest;
use serde_json::Value;
use tracing::debug;

/// Produce the name → value map a handler receives.
///
/// Path parameters are bound first, by indexing the split concrete path at
/// each recorded position (positions beyond the path's actual segment count
/// are skipped). Declared header inputs resolve against the request's header
/// map by name, then against the synthesized top-level request fields
/// (`Http-Method`, `Context-Path`, `Action`, `Http-Version`, `RequestId`);
/// a declared body input decodes the raw body bytes as JSON. A missing
/// header, missing body, or a body that fails to decode all bind as `Null`
/// — binding never errors, the handler sees the hole instead.
///
/// Path bindings win over same-named header inputs.
#[must_use]
pub fn bind_params(route: &Route, request: &HttpRequest, request_id: &str) -> BoundParams {
    let mut bound = BoundParams::new();

    let segments: Vec<&str> = request.path.split('/').filter(|s| !s.is_empty()).collect();
    for (idx, name) in &route.param_positions {
        if let Some(seg) = segments.get(*idx) {
            bound.insert(name.clone(), Value::String((*seg).to_string()));
        }
    }

    for spec in &route.inputs {
        match spec.source {
            ParamSource::Path => {} // already bound from positions
            ParamSource::Header => {
                if !bound.contains_key(&spec.name) {
                    let value = request
                        .headers
                        .get(&spec.name)
                        .map(|v| Value::String(v.clone()))
                        .or_else(|| synthesized_field(&spec.name, request, request_id))
                        .unwrap_or(Value::Null);
                    bound.insert(spec.name.clone(), value);
                }
            }
            ParamSource::Body => {
                let value = match request.body.as_deref() {
                    Some(bytes) => serde_json::from_slice(bytes).unwrap_or_else(|err| {
                        debug!(
                            param = %spec.name,
                            error = %err,
                            "Body decode failed, binding null"
                        );
                        Value::Null
                    }),
                    None => Value::Null,
                };
                bound.insert(spec.name.clone(), value);
            }
        }
    }

    bound
}

/// The synthesized request fields that share the header namespace, so an
/// input named after one resolves even though no client sent such a header.
/// An actual header with the same name takes precedence.
fn synthesized_field(name: &str, request: &HttpRequest, request_id: &str) -> Option<Value> {
    match name {
        "Http-Method" => Some(Value::String(request.method.clone())),
        "Context-Path" => Some(Value::String(request.path.clone())),
        "Action" => Some(Value::String(request.action())),
        "Http-Version" => request.version.clone().map(Value::String),
        "RequestId" => Some(Value::String(request_id.to_string())),
        _ => None,
    }
}
