//! Route registry: a per-method segment trie with positional wildcards.
//!
//! Routes are registered once at startup and the registry is read-only
//! afterwards, so lookups need no synchronization beyond an `Arc`.

mod core;

pub use self::core::{BoundParams, Handler, ParamSource, ParamSpec, Route, Router};
