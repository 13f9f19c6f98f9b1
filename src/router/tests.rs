use super::{Route, Router};
use crate::handler::{ParamKind, ParamSpec, Registry, Resource};
use crate::request::RequestContext;
use crate::response::{BufferedResponse, Response};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn users() -> Arc<Resource> {
    Arc::new(
        Resource::new("Users")
            .action("get", vec![], |_| Ok(Some(Response::new().body(json!("list")))))
            .action(
                "getUser",
                vec![ParamSpec::required("id", ParamKind::Int)],
                |args| Ok(Some(Response::new().body(json!({ "id": args.int("id") })))),
            ),
    )
}

#[test]
fn test_request_normalization() {
    let ctx = RequestContext::new("PUT", " index.php/api/// ")
        .with_content_type("Application/JSON; charset=utf-8");
    let router = Router::new(ctx);
    assert_eq!(router.path(), "index.php/api");
    assert_eq!(router.verb(), "put");
    assert_eq!(router.content_type(), "application/json");
}

#[test]
fn test_setters_normalize() {
    let mut router = Router::new(RequestContext::new("GET", "/"));
    router
        .set_path("/a/b/")
        .set_verb("DELETE")
        .set_content_type("text/plain;q=1");
    assert_eq!(router.path(), "/a/b");
    assert_eq!(router.verb(), "delete");
    assert_eq!(router.content_type(), "text/plain");
}

#[test]
fn test_root_path_normalizes_to_empty() {
    let router = Router::new(RequestContext::new("GET", "/"));
    assert_eq!(router.path(), "");
}

#[test]
fn test_route_table_order() {
    let mut router = Router::new(RequestContext::new("GET", "/"));
    router
        .append_route(Route::new("/b", users()))
        .append_route(Route::new("/c", users()))
        .prepend_route(Route::new("/a", users()));
    let patterns: Vec<&str> = router.routes().iter().map(Route::pattern).collect();
    assert_eq!(patterns, vec!["/a", "/b", "/c"]);

    router.clear_routing_table();
    assert!(router.routes().is_empty());
}

#[test]
fn test_dispatch_binds_captures() {
    let mut router = Router::new(RequestContext::new("GET", "/users/42"));
    router.append_route(Route::new("/users/{id}", users()).with_method("getUser"));
    let response = router.dispatch().unwrap().unwrap();
    assert_eq!(response.code(), 200);

    let mut sink = BufferedResponse::new();
    response.send(&mut sink);
    assert_eq!(sink.body_json(), Some(json!({"id": 42})));
}

#[test]
fn test_dispatch_skips_non_invocable() {
    let mut router = Router::new(RequestContext::new("GET", "/users/missing"));
    router
        .append_route(Route::new("/users", users()).with_method("nothing"))
        .append_route(Route::new("/users", users()).with_method("get"));
    let response = router.dispatch().unwrap().unwrap();
    assert!(matches!(response.payload(), crate::response::Body::Value(v) if v == "list"));
}

#[test]
fn test_dispatch_no_match() {
    let mut router = Router::new(RequestContext::new("POST", "/nowhere"));
    router.append_route(Route::new("/users", users()));
    let err = router.dispatch().unwrap_err();
    assert_eq!(err.kind(), "NoRouteMatch");
    assert_eq!(
        err.to_string(),
        "post /nowhere could not be routed, no matching routes found"
    );
}

#[test]
fn test_bind_service_parameter() {
    let clock = Resource::new("Clock").action(
        "get",
        vec![ParamSpec::required("epoch", ParamKind::service("Epoch"))],
        |args| {
            let epoch = args.service::<u64>("epoch").map_or(0, |e| *e);
            Ok(Some(Response::new().body(epoch)))
        },
    );

    let mut registry = Registry::new();
    registry.register_service("Epoch", Arc::new(1_700_000_000_u64));

    let router = Router::new(RequestContext::new("GET", "/clock")).with_registry(Arc::new(registry));
    let args = router.bind_parameters(&clock, "get", &HashMap::new()).unwrap();
    assert_eq!(args.service::<u64>("epoch").as_deref(), Some(&1_700_000_000));

    let bare = Router::new(RequestContext::new("GET", "/clock"));
    let err = bare.bind_parameters(&clock, "get", &HashMap::new()).unwrap_err();
    assert_eq!(err.kind(), "MissingParameter");
}

#[test]
fn test_bind_unknown_method_is_invalid_target() {
    let router = Router::new(RequestContext::new("GET", "/users"));
    let err = router
        .bind_parameters(users().as_ref(), "nope", &HashMap::new())
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidTarget");
}
