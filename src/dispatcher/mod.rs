//! Dispatcher: registry lookup, parameter binding, handler invocation, and
//! result serialization for one parsed request.

mod binder;
mod core;

pub use binder::bind_params;
pub use self::core::{next_request_id, Dispatcher};
