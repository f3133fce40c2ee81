//! Dispatcher core - hot path for request dispatch.
//!
//! Walks each parsed request through the middleware chain, route
//! resolution and handler invocation, and maps every failure to a
//! concrete response. Nothing propagates past the dispatch boundary
//! uncaught: the connection handler always receives exactly one response
//! per request.

use http::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::middleware::Middleware;
use crate::router::Router;

/// Request data passed to a handler.
///
/// Built once per connection when the parser reports message-complete,
/// then mutated exactly once to attach `path_params` after route
/// resolution. Header keys are lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, ...).
    pub method: Method,
    /// Raw request path.
    pub path: String,
    /// Path parameters extracted from the winning route pattern.
    pub path_params: HashMap<String, String>,
    /// HTTP headers (lowercase keys).
    pub headers: HashMap<String, String>,
    /// JSON-decoded request body, absent when the request carried none.
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a path parameter by name.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Outgoing response produced by a handler or the error mapper.
///
/// Immutable once handed back to the dispatcher; serialized exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, ...).
    pub status: u16,
    /// Additional headers beyond the fixed serialization set.
    pub headers: Vec<(String, String)>,
    /// JSON response body, `None` for a body-less response.
    pub body: Option<Value>,
}

impl HandlerResponse {
    /// Create a JSON response with the given status and body.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Create a response with no body.
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add or replace a header (case-insensitive on the name).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Get a header by name.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A request handler: a function from request to response or failure.
///
/// Implemented for any `Fn(HandlerRequest) -> anyhow::Result<HandlerResponse>`,
/// so plain functions and closures register directly.
pub trait Handler: Send + Sync {
    fn handle(&self, req: HandlerRequest) -> anyhow::Result<HandlerResponse>;
}

impl<F> Handler for F
where
    F: Fn(HandlerRequest) -> anyhow::Result<HandlerResponse> + Send + Sync,
{
    fn handle(&self, req: HandlerRequest) -> anyhow::Result<HandlerResponse> {
        self(req)
    }
}

/// Failure taxonomy for the request pipeline.
///
/// Every variant is caught at the dispatch boundary and converted to a
/// response via [`DispatchError::to_response`]. Clients never see the
/// detail strings; all 500-class failures render the same generic body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No registered route's pattern and method both match.
    NotFound,
    /// Body present but not valid JSON.
    MalformedBody { detail: String },
    /// A middleware aborted the chain.
    MiddlewareAbort { reason: String },
    /// The handler failed, panicked or returned a malformed response.
    HandlerFault { detail: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NotFound => write!(f, "no matching route"),
            DispatchError::MalformedBody { detail } => {
                write!(f, "malformed request body: {detail}")
            }
            DispatchError::MiddlewareAbort { reason } => {
                write!(f, "middleware aborted request: {reason}")
            }
            DispatchError::HandlerFault { detail } => {
                write!(f, "handler fault: {detail}")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl DispatchError {
    /// Map a failure to the concrete response written to the client.
    ///
    /// `NotFound` renders 404; every other class renders 500 with one
    /// generic message so internals never leak.
    #[must_use]
    pub fn to_response(&self) -> HandlerResponse {
        match self {
            DispatchError::NotFound => {
                HandlerResponse::json(404, json!({ "message": "Not Found" }))
            }
            _ => HandlerResponse::json(500, json!({ "message": "Unexpected error" })),
        }
    }
}

/// Dispatcher orchestrating the request pipeline.
///
/// State machine per request:
/// `RECEIVED → MIDDLEWARE → ROUTED → HANDLED → RESPONDED`, with `ERRORED`
/// reachable from every stage. [`Dispatcher::dispatch`] is infallible:
/// the `ERRORED` path resolves to a response through the error mapper and
/// terminates in `RESPONDED` like any success.
pub struct Dispatcher {
    router: Arc<Router>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// Create a dispatcher over a fully registered router.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware to the chain.
    ///
    /// Middleware runs strictly in registration order, before route
    /// resolution, short-circuiting on the first failure.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// The router this dispatcher resolves against.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run one request through the pipeline and produce its response.
    pub fn dispatch(&self, mut req: HandlerRequest) -> HandlerResponse {
        let method = req.method.clone();
        let path = req.path.clone();
        let start = Instant::now();

        // MIDDLEWARE
        debug!(
            method = %method,
            path = %path,
            middleware_count = self.middlewares.len(),
            "Middleware chain start"
        );
        for (idx, mw) in self.middlewares.iter().enumerate() {
            if let Err(err) = mw.before(&req) {
                warn!(
                    method = %method,
                    path = %path,
                    middleware_idx = idx,
                    reason = %err,
                    "Middleware aborted chain"
                );
                return DispatchError::MiddlewareAbort {
                    reason: err.to_string(),
                }
                .to_response();
            }
        }

        // ROUTED
        let Some(route_match) = self.router.resolve(&path, &method) else {
            return DispatchError::NotFound.to_response();
        };
        req.path_params = route_match.path_params;

        // HANDLED
        let handler = route_match.handler;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(req)));
        let resp = match outcome {
            Ok(Ok(resp)) => resp,
            Ok(Err(err)) => {
                error!(
                    method = %method,
                    path = %path,
                    error = %err,
                    "Handler returned an error"
                );
                return DispatchError::HandlerFault {
                    detail: err.to_string(),
                }
                .to_response();
            }
            Err(panic) => {
                error!(
                    method = %method,
                    path = %path,
                    panic = ?panic,
                    "Handler panicked"
                );
                return DispatchError::HandlerFault {
                    detail: format!("handler panicked: {panic:?}"),
                }
                .to_response();
            }
        };

        // RESPONDED - the handler's return value must be a well-formed
        // response; a nonsensical status code is itself an internal fault.
        if resp.status < 100 || resp.status > 599 {
            error!(
                method = %method,
                path = %path,
                status = resp.status,
                "Handler returned a malformed response"
            );
            return DispatchError::HandlerFault {
                detail: format!("invalid status code {}", resp.status),
            }
            .to_response();
        }

        info!(
            method = %method,
            path = %path,
            status = resp.status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Request dispatched"
        );
        resp
    }
}
