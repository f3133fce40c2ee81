use std::fmt;

use crate::dispatcher::HandlerRequest;

/// Failure signaled by a middleware to abort the chain.
///
/// The reason is logged server-side; clients only ever see the generic
/// 500 body produced by the error mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewareError {
    reason: String,
}

impl MiddlewareError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for MiddlewareError {}

/// A pre-handler hook.
///
/// Middleware runs strictly in registration order before route
/// resolution. Its only binary outcome is continue (`Ok`) or abort
/// (`Err`); it inspects the request and may perform side effects, but it
/// does not construct the final response. An abort is mapped to a
/// generic 500 by the dispatcher.
pub trait Middleware: Send + Sync {
    fn before(&self, req: &HandlerRequest) -> Result<(), MiddlewareError>;
}
