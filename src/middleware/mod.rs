//! # Middleware Module
//!
//! An ordered chain of pre-handler hooks with abort-on-failure semantics:
//! the dispatcher runs every middleware in registration order and
//! short-circuits on the first failure, in which case the handler is
//! never invoked and the client receives a generic 500.

mod auth;
mod core;
mod tracing;

pub use auth::AuthMiddleware;
pub use core::{Middleware, MiddlewareError};
pub use tracing::TracingMiddleware;
