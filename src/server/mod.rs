//! Socket front end: raw request parsing, the fixed response writer, and the
//! coroutine-pool TCP server.

pub mod http_server;
pub mod request;
pub mod response;

pub use http_server::{RestServer, ServerHandle};
pub use request::{parse_request, HttpRequest, ParseError};
pub use response::{write_response, SERVER_NAME};
