use micro_router::handler::{Registry, Resource, Target};
use micro_router::{RequestContext, Response, Route, Router};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::controllers;
use common::harness::route_request;

fn assert_route_match(verb: &str, path: &str, pattern: &str, expected: serde_json::Value) {
    let res = route_request(
        RequestContext::new(verb, path),
        vec![Route::new(pattern, controllers::users())],
    );
    assert_eq!(res.status, 200, "{verb} {path} → {}", res.body_text());
    assert_eq!(res.body_json(), Some(expected), "{verb} {path}");
}

#[test]
fn test_derived_methods() {
    assert_route_match("GET", "/api/users", "/api/users", json!(["ada", "grace"]));
    assert_route_match("GET", "/api/users/", "/api/users", json!(["ada", "grace"]));
    // a captured value is never the action
    assert_route_match("GET", "/api/users/42", "/api/users/{id}", json!(["ada", "grace"]));
    assert_route_match(
        "GET",
        "/api/users/settings",
        "/api/users",
        json!({"verbose": false}),
    );
}

#[test]
fn test_typed_placeholder_rejects_non_digits() {
    let routes = || vec![Route::new("/users/{id:#\\d+#}", controllers::users()).with_method("getUser")];

    let res = route_request(RequestContext::new("GET", "/users/42"), routes());
    assert_eq!(res.body_json(), Some(json!({"id": 42})));

    let res = route_request(RequestContext::new("GET", "/users/abc"), routes());
    assert_eq!(res.status, 404);
}

#[test]
fn test_no_route_match_is_404() {
    let res = route_request(
        RequestContext::new("GET", "/nowhere/"),
        vec![Route::new("/users", controllers::users())],
    );
    assert_eq!(res.status, 404);
    assert_eq!(res.reason, "Not Found");
    assert_eq!(
        res.body_json(),
        Some(json!({
            "error": "NoRouteMatch",
            "message": "get /nowhere could not be routed, no matching routes found",
            "code": 0,
        }))
    );
}

#[test]
fn test_end_anchor_uses_bare_verb() {
    let routes = || vec![Route::new("/users$", controllers::users())];

    let res = route_request(RequestContext::new("DELETE", "/users"), routes());
    assert_eq!(res.status, 204);
    assert!(res.body.is_empty());

    let res = route_request(RequestContext::new("DELETE", "/users/1"), routes());
    assert_eq!(res.status, 404);
}

#[test]
fn test_first_match_wins() {
    let res = route_request(
        RequestContext::new("GET", "/users/42"),
        vec![
            Route::new("/users", controllers::users()).with_method("get"),
            Route::new("/users/{id}", controllers::users()).with_method("getUser"),
        ],
    );
    assert_eq!(res.body_json(), Some(json!(["ada", "grace"])));
}

#[test]
fn test_continue_propagation_runs_every_match() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let audit = Arc::new(Resource::new("Audit").action("record", vec![], move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Response::new().body(json!("audited"))))
    }));

    let res = route_request(
        RequestContext::new("GET", "/users/42"),
        vec![
            Route::new("/", Arc::clone(&audit))
                .with_method("record")
                .continue_propagation(true),
            Route::new("/users/{id}", controllers::users()).with_method("getUser"),
            Route::new("/users", audit).with_method("record"),
        ],
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(res.body_json(), Some(json!({"id": 42})));
    assert_eq!(res.sends, 1);
}

#[test]
fn test_continue_propagation_sends_last_result() {
    let res = route_request(
        RequestContext::new("GET", "/users/42"),
        vec![
            Route::new("/users/{id}", controllers::users())
                .with_method("getUser")
                .continue_propagation(true),
            Route::new("/users", controllers::users()).with_method("get"),
        ],
    );
    assert_eq!(res.body_json(), Some(json!(["ada", "grace"])));
}

#[test]
fn test_unresolvable_target_is_skipped() {
    let res = route_request(
        RequestContext::new("GET", "/users"),
        vec![
            Route::new("/users", "users.controller"),
            Route::new("/users", controllers::users()).with_method("nope"),
            Route::new("/users", controllers::users()),
        ],
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.body_json(), Some(json!(["ada", "grace"])));
}

#[test]
fn test_matched_but_never_invocable_is_404() {
    let res = route_request(
        RequestContext::new("PATCH", "/users"),
        vec![Route::new("/users", controllers::users())],
    );
    assert_eq!(res.status, 404);
}

#[test]
fn test_registry_targets() {
    #[derive(Default)]
    struct Health;

    impl micro_router::handler::Controller for Health {
        fn name(&self) -> &str {
            "Health"
        }

        fn signature(&self, method: &str) -> Option<&[micro_router::handler::ParamSpec]> {
            if method == "get" {
                Some(&[])
            } else {
                None
            }
        }

        fn call(
            &self,
            _method: &str,
            _args: micro_router::handler::Args,
        ) -> micro_router::handler::HandlerResult {
            Ok(Some(Response::new().body(json!({"status": "ok"}))))
        }
    }

    let mut registry = Registry::new();
    registry.register_controller("users.controller", controllers::users());

    let mut router = Router::new(RequestContext::new("GET", "/users/7"))
        .with_registry(Arc::new(registry));
    router
        .append_route(Route::new("/users/{id}", "users.controller").with_method("getUser"));
    let mut sink = micro_router::BufferedResponse::new();
    router.run(&mut sink);
    assert_eq!(sink.body_json(), Some(json!({"id": 7})));

    let res = route_request(
        RequestContext::new("GET", "/health"),
        vec![Route::new("/health", Target::constructor::<Health>())],
    );
    assert_eq!(res.body_json(), Some(json!({"status": "ok"})));
}

#[test]
fn test_handler_without_response_sends_nothing() {
    let res = route_request(
        RequestContext::new("PUT", "/users"),
        vec![Route::new("/users", controllers::users())],
    );
    assert_eq!(res.sends, 0);
    assert!(res.body.is_empty());
}

#[test]
fn test_application_error_status() {
    let res = route_request(
        RequestContext::new("GET", "/users/forbidden"),
        vec![Route::new("/users", controllers::users())],
    );
    assert_eq!(res.status, 403);
    assert_eq!(
        res.body_json(),
        Some(json!({"error": "Forbidden", "message": "not yours", "code": 7}))
    );
}

#[test]
fn test_handler_panic_is_500() {
    let res = route_request(
        RequestContext::new("GET", "/users/boom"),
        vec![Route::new("/users", controllers::users())],
    );
    assert_eq!(res.status, 500);
    let body = res.body_json().unwrap();
    assert_eq!(body["error"], "HandlerPanic");
    assert_eq!(body["message"], "boom");
}

#[test]
fn test_invalid_pattern_is_500() {
    let res = route_request(
        RequestContext::new("GET", "/users/1"),
        vec![Route::new("/users/{id:#[0-9#}", controllers::users())],
    );
    assert_eq!(res.status, 500);
    assert_eq!(res.body_json().unwrap()["error"], "InvalidRoutePattern");
}
