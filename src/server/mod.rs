//! # Server Module
//!
//! The transport boundary: incremental request parsing, response
//! serialization and the coroutine-per-connection TCP server.

pub mod http_server;
pub mod request;
pub mod response;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{ParseError, ParsedRequest, RequestParser};
pub use response::serialize_response;
