//! # vrest
//!
//! **vrest** is a minimal embedded REST server for Rust: handler functions are
//! registered against URL path patterns (with `:name` positional wildcards) and
//! invoked for incoming socket connections, with no HTTP server stack in
//! between. The wire protocol is deliberately tiny — one request per
//! connection, every reachable outcome answers `HTTP/1.0 200` with a JSON body.
//!
//! ## Architecture
//!
//! The crate is organized into a handful of modules:
//!
//! - **[`router`]** - Per-method segment trie: route registration, pattern
//!   normalization, and literal-before-wildcard lookup
//! - **[`dispatcher`]** - Resolves a parsed request to a route, binds named
//!   parameters from path/headers/body, invokes the handler, and serializes
//!   the result
//! - **[`server`]** - Raw request-line/header/body parser, the fixed response
//!   writer, and the coroutine-pool TCP server
//! - **[`runtime_config`]** - Environment-variable runtime tuning
//! - **[`cities`]** - Sample CRUD resource backed by an in-memory store,
//!   used by the binary and the integration tests
//!
//! Data flow: socket bytes → parser → [`server::HttpRequest`] → dispatcher
//! (→ registry lookup → param binding → handler → `serde_json`) → response
//! bytes → socket.
//!
//! ## Runtime Considerations
//!
//! vrest runs on the `may` coroutine runtime, not tokio or async-std:
//!
//! - One acceptor coroutine plus a fixed pool of connection workers
//!   (default 100, see [`runtime_config::RuntimeConfig`])
//! - Coroutine stack size is configurable via the `VREST_STACK_SIZE`
//!   environment variable
//! - Socket reads block the owning worker; a silent client holds its worker
//!   slot until the peer closes the connection
//!
//! ## Quick Start
//!
//! ```no_run
//! use vrest::{cities, Dispatcher, RestServer, Router};
//!
//! let mut router = Router::new();
//! let store = cities::CityStore::with_samples();
//! cities::register_routes(&mut router, &store);
//!
//! let server = RestServer::new(Dispatcher::new(router));
//! let handle = server.start("0.0.0.0:4001").expect("failed to bind");
//! handle.join().unwrap();
//! ```

pub mod cities;
pub mod dispatcher;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::Dispatcher;
pub use router::{BoundParams, Handler, ParamSource, ParamSpec, Route, Router};
pub use server::{parse_request, HttpRequest, ParseError, RestServer, ServerHandle};
