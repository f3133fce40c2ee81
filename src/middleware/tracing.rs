use tracing::info;

use super::{Middleware, MiddlewareError};
use crate::dispatcher::HandlerRequest;

/// Logs every request entering the pipeline. Always passes.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Result<(), MiddlewareError> {
        info!(
            method = %req.method,
            path = %req.path,
            has_body = req.body.is_some(),
            "Request received"
        );
        Ok(())
    }
}
