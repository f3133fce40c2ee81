use http::Method;
use microframe::dispatcher::{Handler, HandlerRequest, HandlerResponse};
use microframe::router::{PatternError, Router};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Handler that identifies itself in the response body.
fn named(name: &'static str) -> Arc<dyn Handler> {
    Arc::new(move |_req: HandlerRequest| {
        Ok(HandlerResponse::json(200, json!({ "handler": name })))
    })
}

fn request(method: Method, path: &str) -> HandlerRequest {
    HandlerRequest {
        method,
        path: path.to_string(),
        path_params: HashMap::new(),
        headers: HashMap::new(),
        body: None,
    }
}

fn handler_name(m: &microframe::router::RouteMatch, method: Method, path: &str) -> String {
    let resp = m.handler.handle(request(method, path)).unwrap();
    resp.body.unwrap()["handler"].as_str().unwrap().to_string()
}

#[test]
fn test_literal_route_resolves_to_its_handler() {
    let mut router = Router::new();
    router.register("/a", Method::GET, named("a")).unwrap();
    router.register("/b", Method::GET, named("b")).unwrap();

    let m = router.resolve("/b", &Method::GET).unwrap();
    assert_eq!(handler_name(&m, Method::GET, "/b"), "b");
    assert!(m.path_params.is_empty());
}

#[test]
fn test_dynamic_route_extracts_params() {
    let mut router = Router::new();
    router
        .register("/book/{name}/action/{author}", Method::GET, named("book"))
        .unwrap();

    let m = router
        .resolve("/book/dune/action/herbert", &Method::GET)
        .unwrap();
    assert_eq!(m.path_params.get("name").map(String::as_str), Some("dune"));
    assert_eq!(
        m.path_params.get("author").map(String::as_str),
        Some("herbert")
    );
}

#[test]
fn test_param_value_is_url_decoded() {
    let mut router = Router::new();
    router
        .register("/hello_world/{name}", Method::GET, named("greet"))
        .unwrap();

    let m = router
        .resolve("/hello_world/Ada%20Lovelace", &Method::GET)
        .unwrap();
    assert_eq!(
        m.path_params.get("name").map(String::as_str),
        Some("Ada Lovelace")
    );
}

#[test]
fn test_unregistered_path_does_not_resolve() {
    let mut router = Router::new();
    router.register("/a", Method::GET, named("a")).unwrap();
    assert!(router.resolve("/missing", &Method::GET).is_none());
}

#[test]
fn test_path_match_with_method_miss_does_not_resolve() {
    let mut router = Router::new();
    router.register("/a", Method::GET, named("a")).unwrap();
    // Same outcome as an unknown path - no 405 distinction.
    assert!(router.resolve("/a", &Method::POST).is_none());
}

#[test]
fn test_first_match_wins_over_specificity() {
    let mut router = Router::new();
    router
        .register("/overlap/{x}", Method::GET, named("generic"))
        .unwrap();
    router
        .register("/overlap/special", Method::GET, named("specific"))
        .unwrap();

    // The earlier, less specific registration wins.
    let m = router.resolve("/overlap/special", &Method::GET).unwrap();
    assert_eq!(handler_name(&m, Method::GET, "/overlap/special"), "generic");
}

#[test]
fn test_method_miss_keeps_scanning_later_routes() {
    let mut router = Router::new();
    router
        .register("/overlap/{x}", Method::POST, named("poster"))
        .unwrap();
    router
        .register("/overlap/special", Method::GET, named("getter"))
        .unwrap();

    // The first pattern matches the path but not the method; the scan
    // continues and the second route wins.
    let m = router.resolve("/overlap/special", &Method::GET).unwrap();
    assert_eq!(handler_name(&m, Method::GET, "/overlap/special"), "getter");
}

#[test]
fn test_duplicate_registration_overwrites_in_place() {
    let mut router = Router::new();
    router.register("/dup/{x}", Method::GET, named("old")).unwrap();
    router.register("/dup/two", Method::GET, named("later")).unwrap();
    router.register("/dup/{x}", Method::GET, named("new")).unwrap();

    assert_eq!(router.len(), 2);
    // Replacement keeps the original position, so it still shadows the
    // later literal route.
    let m = router.resolve("/dup/two", &Method::GET).unwrap();
    assert_eq!(handler_name(&m, Method::GET, "/dup/two"), "new");
}

#[test]
fn test_resolution_is_idempotent() {
    let mut router = Router::new();
    router
        .register("/items/{id}", Method::GET, named("item"))
        .unwrap();

    let first = router.resolve("/items/42", &Method::GET).unwrap();
    let second = router.resolve("/items/42", &Method::GET).unwrap();
    assert!(Arc::ptr_eq(&first.handler, &second.handler));
    assert_eq!(first.path_params, second.path_params);
}

#[test]
fn test_duplicate_param_name_is_a_registration_error() {
    let mut router = Router::new();
    let err = router
        .register("/a/{id}/b/{id}", Method::GET, named("dup"))
        .unwrap_err();
    assert!(matches!(err, PatternError::DuplicateParam { ref name, .. } if name == "id"));
    assert!(router.is_empty());
}

#[test]
fn test_dump_routes_covers_every_registration() {
    let mut router = Router::new();
    router.register("/a", Method::GET, named("a")).unwrap();
    router
        .register("/b/{id}", Method::POST, named("b"))
        .unwrap();
    // Dumping is diagnostic-only: it must not disturb the route table.
    router.dump_routes();
    assert_eq!(router.len(), 2);
    assert!(router.resolve("/a", &Method::GET).is_some());
    assert!(router.resolve("/b/7", &Method::POST).is_some());
}

#[test]
fn test_case_sensitive_literal_match() {
    let mut router = Router::new();
    router.register("/Things", Method::GET, named("things")).unwrap();
    assert!(router.resolve("/things", &Method::GET).is_none());
    assert!(router.resolve("/Things", &Method::GET).is_some());
}
