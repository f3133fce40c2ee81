//! # Dispatcher Module
//!
//! Orchestration of the request pipeline: receive a parsed request, run
//! the middleware chain, resolve the route, invoke the handler and map
//! the result (or any failure along the way) to a concrete response.
//!
//! Handlers are plain fallible functions invoked inside the connection's
//! coroutine; panics are caught and converted to 500 responses so one
//! failing handler never tears down the server.

mod core;

pub use core::{DispatchError, Dispatcher, Handler, HandlerRequest, HandlerResponse};
