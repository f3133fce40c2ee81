use super::{Middleware, MiddlewareError};
use crate::dispatcher::HandlerRequest;

/// Aborts the chain unless the `Authorization` header equals the
/// configured token.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Middleware for AuthMiddleware {
    fn before(&self, req: &HandlerRequest) -> Result<(), MiddlewareError> {
        match req.get_header("authorization") {
            Some(h) if h == self.token => Ok(()),
            _ => Err(MiddlewareError::new("missing or invalid authorization")),
        }
    }
}
