//! Router core - hot path for route resolution.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::pattern::{PathPattern, PatternError};
use crate::dispatcher::Handler;

/// A registered route: compiled matcher, HTTP method and handler.
///
/// Created at registration time and immutable afterwards.
pub struct Route {
    pub pattern: PathPattern,
    pub method: Method,
    pub handler: Arc<dyn Handler>,
}

/// Result of successfully resolving a request path to a route.
///
/// Carries the handler reference plus the path parameters extracted from
/// the winning pattern.
#[derive(Clone)]
pub struct RouteMatch {
    /// Handler registered for the winning route.
    pub handler: Arc<dyn Handler>,
    /// Path parameters extracted from the URL (e.g. `{id}` → `{"id": "123"}`).
    pub path_params: HashMap<String, String>,
}

/// Router matching request paths to handlers.
///
/// Routes are kept in registration order and scanned linearly: the first
/// pattern that matches the path *and* carries the request method wins.
/// This first-match-wins policy is load-bearing: overlapping patterns
/// must be registered from most-specific to least-specific by the caller.
///
/// The route table is written only during startup registration; at request
/// time it is read-only and shared without locks.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a handler for `(path, method)`.
    ///
    /// A duplicate `(path, method)` registration silently replaces the
    /// earlier handler in place, keeping its original position in the
    /// resolution order.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the path template does not compile
    /// (malformed or duplicate `{placeholder}`).
    pub fn register(
        &mut self,
        path: &str,
        method: Method,
        handler: Arc<dyn Handler>,
    ) -> Result<(), PatternError> {
        if let Some(existing) = self
            .routes
            .iter_mut()
            .find(|r| r.pattern.path() == path && r.method == method)
        {
            debug!(method = %method, path = %path, "Route re-registered, handler replaced");
            existing.handler = handler;
            return Ok(());
        }

        let pattern = PathPattern::compile(path)?;
        info!(
            method = %method,
            path = %path,
            params = ?pattern.param_names(),
            total_routes = self.routes.len() + 1,
            "Route registered"
        );
        self.routes.push(Route {
            pattern,
            method,
            handler,
        });
        Ok(())
    }

    /// Resolve a request path and method to a handler.
    ///
    /// Scans routes in registration order; a pattern that matches the path
    /// but not the method keeps scanning. When no route matches, the
    /// caller treats the request as not found; a path match with no
    /// method match is deliberately not distinguished from no match at
    /// all.
    #[must_use]
    pub fn resolve(&self, path: &str, method: &Method) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for route in &self.routes {
            let Some(path_params) = route.pattern.match_path(path) else {
                continue;
            };
            if route.method != *method {
                continue;
            }

            info!(
                method = %method,
                path = %path,
                route_pattern = %route.pattern.path(),
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch {
                handler: Arc::clone(&route.handler),
                path_params,
            });
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Print all registered routes to stdout. Useful for debugging.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!("[route] {} {}", route.method, route.pattern.path());
        }
    }
}
