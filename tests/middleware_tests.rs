use http::Method;
use microframe::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use microframe::middleware::{AuthMiddleware, Middleware, MiddlewareError, TracingMiddleware};
use microframe::router::Router;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn request(method: Method, path: &str) -> HandlerRequest {
    HandlerRequest {
        method,
        path: path.to_string(),
        path_params: HashMap::new(),
        headers: HashMap::new(),
        body: None,
    }
}

/// Records its tag into a shared log, optionally aborting.
struct Recorder {
    tag: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    abort: bool,
}

impl Middleware for Recorder {
    fn before(&self, _req: &HandlerRequest) -> Result<(), MiddlewareError> {
        self.log.lock().unwrap().push(self.tag);
        if self.abort {
            Err(MiddlewareError::new(format!("{} aborted", self.tag)))
        } else {
            Ok(())
        }
    }
}

fn dispatcher_with_ok_route() -> Dispatcher {
    let mut router = Router::new();
    router
        .register(
            "/ok",
            Method::GET,
            Arc::new(|_req: HandlerRequest| Ok(HandlerResponse::json(200, json!({ "ok": true })))),
        )
        .unwrap();
    Dispatcher::new(Arc::new(router))
}

#[test]
fn test_middlewares_run_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = dispatcher_with_ok_route();
    dispatcher.add_middleware(Arc::new(Recorder {
        tag: "first",
        log: Arc::clone(&log),
        abort: false,
    }));
    dispatcher.add_middleware(Arc::new(Recorder {
        tag: "second",
        log: Arc::clone(&log),
        abort: false,
    }));

    let resp = dispatcher.dispatch(request(Method::GET, "/ok"));
    assert_eq!(resp.status, 200);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn test_first_failure_short_circuits_the_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = dispatcher_with_ok_route();
    dispatcher.add_middleware(Arc::new(Recorder {
        tag: "aborter",
        log: Arc::clone(&log),
        abort: true,
    }));
    dispatcher.add_middleware(Arc::new(Recorder {
        tag: "never",
        log: Arc::clone(&log),
        abort: false,
    }));

    let resp = dispatcher.dispatch(request(Method::GET, "/ok"));
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body, Some(json!({ "message": "Unexpected error" })));
    assert_eq!(*log.lock().unwrap(), vec!["aborter"]);
}

#[test]
fn test_auth_middleware_passes_matching_token() {
    let mw = AuthMiddleware::new("secret-token");
    let mut req = request(Method::GET, "/ok");
    req.headers
        .insert("authorization".to_string(), "secret-token".to_string());
    assert!(mw.before(&req).is_ok());
}

#[test]
fn test_auth_middleware_aborts_on_missing_or_wrong_token() {
    let mw = AuthMiddleware::new("secret-token");

    let req = request(Method::GET, "/ok");
    assert!(mw.before(&req).is_err());

    let mut req = request(Method::GET, "/ok");
    req.headers
        .insert("authorization".to_string(), "wrong".to_string());
    assert!(mw.before(&req).is_err());
}

#[test]
fn test_tracing_middleware_always_passes() {
    let mw = TracingMiddleware;
    assert!(mw.before(&request(Method::GET, "/anything")).is_ok());
}
