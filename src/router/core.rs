//! Router core - route registration and the hot lookup path.

use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Named parameter values assembled for a single dispatch.
///
/// Keys are parameter names, values are the bound JSON values (path segments
/// bind as strings, a body input binds as the decoded document or `Null`).
pub type BoundParams = serde_json::Map<String, Value>;

/// Uniform handler signature: bound parameters in, JSON value out.
///
/// Handlers own no routing state; whatever store they mutate is captured
/// explicitly at registration time.
pub type Handler = Arc<dyn Fn(&BoundParams) -> anyhow::Result<Value> + Send + Sync>;

/// Where a declared handler input is bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// A `:name` segment of the matched pattern.
    Path,
    /// A request header looked up by the declared name.
    Header,
    /// The whole request body, decoded as JSON.
    Body,
}

/// A declared handler input: a name plus the source it binds from.
///
/// Path parameters are recorded automatically from the pattern's `:name`
/// segments; header and body inputs must be declared explicitly via
/// [`Router::register_with_inputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub source: ParamSource,
}

impl ParamSpec {
    pub fn header(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: ParamSource::Header,
        }
    }

    pub fn body(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: ParamSource::Body,
        }
    }
}

/// A registered (method, pattern, handler) triple. Immutable once registered.
#[derive(Clone)]
pub struct Route {
    /// HTTP method the route answers to.
    pub method: Method,
    /// Fully normalized path pattern, e.g. `/cities/:city`.
    pub pattern: String,
    /// Segment index → parameter name, for each `:name` segment of the
    /// pattern. Indices count non-empty segments only.
    pub param_positions: Vec<(usize, String)>,
    /// Declared non-path inputs (headers, body).
    pub inputs: Vec<ParamSpec>,
    /// The handler invoked when this route matches.
    pub handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("param_positions", &self.param_positions)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// One node of the per-method segment trie.
///
/// Invariant: at most one wildcard child and at most one terminal route per
/// node. Both hold by construction — registration funnels every `:name`
/// segment through the single `wildcard` slot.
#[derive(Debug, Default)]
struct RouteNode {
    children: HashMap<String, RouteNode>,
    wildcard: Option<Box<RouteNode>>,
    terminal: Option<Arc<Route>>,
}

/// Route registry mapping HTTP methods to segment tries.
///
/// Built once during startup; lookups are read-only afterwards, so a shared
/// `Arc<Router>` is safe for unsynchronized concurrent reads.
#[derive(Debug)]
pub struct Router {
    roots: HashMap<Method, RouteNode>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty registry supporting GET, POST, PUT and DELETE.
    #[must_use]
    pub fn new() -> Self {
        let mut roots = HashMap::new();
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            roots.insert(method, RouteNode::default());
        }
        Self { roots }
    }

    /// Register a handler for `method` under the pattern formed from
    /// `prefix` and `suffix`.
    ///
    /// Normalization rules:
    /// - a blank prefix normalizes to `/`
    /// - a suffix starting with `/` is rooted: it replaces the prefix entirely
    /// - otherwise the suffix is appended, inserting a `/` separator if the
    ///   prefix does not already end in one
    ///
    /// Registering the same (method, normalized pattern) twice overwrites the
    /// previous route — last write wins.
    ///
    /// Returns `false` without mutating state if `method` is not one of the
    /// supported verbs.
    pub fn register(&mut self, method: &str, prefix: &str, suffix: &str, handler: Handler) -> bool {
        self.register_with_inputs(method, prefix, suffix, Vec::new(), handler)
    }

    /// Like [`register`](Self::register), additionally declaring header and
    /// body inputs the binder should resolve for the handler.
    pub fn register_with_inputs(
        &mut self,
        method: &str,
        prefix: &str,
        suffix: &str,
        inputs: Vec<ParamSpec>,
        handler: Handler,
    ) -> bool {
        let method = match Method::from_bytes(method.as_bytes()) {
            Ok(m) if self.roots.contains_key(&m) => m,
            _ => {
                warn!(method = %method, "Unsupported http method, route not registered");
                return false;
            }
        };

        let pattern = normalize_pattern(prefix, suffix);
        let mut param_positions = Vec::new();
        for (idx, seg) in pattern.split('/').filter(|s| !s.is_empty()).enumerate() {
            if let Some(name) = seg.strip_prefix(':') {
                param_positions.push((idx, name.to_string()));
            }
        }

        let route = Arc::new(Route {
            method: method.clone(),
            pattern: pattern.clone(),
            param_positions,
            inputs,
            handler,
        });

        let mut node = self
            .roots
            .get_mut(&method)
            .expect("supported method roots are pre-seeded");
        for seg in pattern.split('/').filter(|s| !s.is_empty()) {
            if seg.starts_with(':') {
                node = node.wildcard.get_or_insert_with(Default::default).as_mut();
            } else {
                node = node.children.entry(seg.to_string()).or_default();
            }
        }
        if node.terminal.is_some() {
            debug!(method = %method, pattern = %pattern, "Overwriting existing route");
        }
        node.terminal = Some(route);

        info!(method = %method, pattern = %pattern, "Route registered");
        true
    }

    /// Look up the route for a concrete request path.
    ///
    /// Walks the method's trie segment by segment, preferring an exact
    /// literal child and falling back to the wildcard child. There is no
    /// backtracking: a path that could have matched a wildcard at a shallower
    /// level is never retried once a deeper literal walk dead-ends. A miss at
    /// any level is a clean not-found.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<Arc<Route>> {
        let mut node = self.roots.get(method)?;
        for seg in path.split('/').filter(|s| !s.is_empty()) {
            node = match node.children.get(seg) {
                Some(child) => child,
                None => node.wildcard.as_deref()?,
            };
        }
        node.terminal.clone()
    }

    /// All registered patterns, for startup logging and debugging.
    #[must_use]
    pub fn patterns(&self) -> Vec<(Method, String)> {
        let mut out = Vec::new();
        for (method, root) in &self.roots {
            collect_patterns(root, method, &mut out);
        }
        out.sort_by(|a, b| a.1.cmp(&b.1));
        out
    }
}

fn collect_patterns(node: &RouteNode, method: &Method, out: &mut Vec<(Method, String)>) {
    if let Some(route) = &node.terminal {
        out.push((method.clone(), route.pattern.clone()));
    }
    for child in node.children.values() {
        collect_patterns(child, method, out);
    }
    if let Some(wild) = &node.wildcard {
        collect_patterns(wild, method, out);
    }
}

/// Join a resource-level path prefix and an operation-level suffix into one
/// absolute pattern.
fn normalize_pattern(prefix: &str, suffix: &str) -> String {
    let prefix = prefix.trim();
    let suffix = suffix.trim();

    let mut pattern = if prefix.is_empty() {
        "/".to_string()
    } else {
        prefix.to_string()
    };
    if !suffix.is_empty() {
        if suffix.starts_with('/') {
            // Rooted suffix replaces the prefix entirely.
            pattern = suffix.to_string();
        } else {
            if !pattern.ends_with('/') {
                pattern.push('/');
            }
            pattern.push_str(suffix);
        }
    }
    pattern
}
