use globroute::{Handler, HandlerRequest, HandlerResponse, MethodSpec, Router, RouterError};
use http::Method;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing_util::TestTracing;

/// Direct handler answering with an identifying tag.
fn tagged(tag: &'static str) -> Handler {
    Handler::direct(move |_req| Ok(HandlerResponse::json(200, json!({ "handler": tag }))))
}

/// Dispatch and return the tag of the handler that answered, or `<none>`.
fn dispatch_tag(router: &Router, method: Method, target: &str) -> String {
    match router.handle_request(HandlerRequest::new(method, target)) {
        Ok(resp) => resp.body["handler"]
            .as_str()
            .unwrap_or("<untagged>")
            .to_string(),
        Err(RouterError::NoRouteMatched { .. }) => "<none>".to_string(),
        Err(err) => panic!("unexpected routing error: {err}"),
    }
}

#[test]
fn test_register_rejects_unknown_method() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    let err = router
        .register("/anything", tagged("h"), "PROPFIND")
        .unwrap_err();
    match err {
        RouterError::InvalidMethod { method } => assert_eq!(method, "PROPFIND"),
        other => panic!("expected InvalidMethod, got {other}"),
    }
    assert!(router.routes().is_empty(), "registry must stay unchanged");
}

#[test]
fn test_register_is_case_sensitive() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    assert!(router.register("/x", tagged("h"), "get").is_err());
    assert!(router.routes().is_empty());
}

#[test]
fn test_register_chains_fluently() -> Result<(), RouterError> {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router
        .register("/a", tagged("a"), "GET")?
        .register("/b", tagged("b"), "POST")?
        .register("/c", tagged("c"), "ALL")?;
    assert_eq!(router.routes().len(), 3);
    assert_eq!(dispatch_tag(&router, Method::GET, "/a"), "a");
    assert_eq!(dispatch_tag(&router, Method::POST, "/b"), "b");
    assert_eq!(dispatch_tag(&router, Method::DELETE, "/c"), "c");
    Ok(())
}

#[test]
fn test_first_registered_match_wins() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/users/*", tagged("narrow"));
    router.all("/users/**", tagged("wide"));
    assert_eq!(dispatch_tag(&router, Method::GET, "/users/42"), "narrow");
    // The wide entry still catches what the narrow one cannot.
    assert_eq!(
        dispatch_tag(&router, Method::GET, "/users/42/posts"),
        "wide"
    );
    assert_eq!(dispatch_tag(&router, Method::POST, "/users/42"), "wide");
}

#[test]
fn test_later_matching_entry_is_never_invoked() {
    let _tracing = TestTracing::init();
    let shadowed_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&shadowed_calls);

    let mut router = Router::new();
    router.get("/items/*", tagged("first"));
    router.get("/items/*", Handler::direct(move |_req| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(HandlerResponse::json(200, json!({ "handler": "shadowed" })))
    }));

    assert_eq!(dispatch_tag(&router, Method::GET, "/items/7"), "first");
    assert_eq!(shadowed_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_all_entry_catches_otherwise_unmatched_method() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/resource", tagged("get_only"));
    router.all("/resource", tagged("fallback"));
    assert_eq!(dispatch_tag(&router, Method::GET, "/resource"), "get_only");
    assert_eq!(
        dispatch_tag(&router, Method::DELETE, "/resource"),
        "fallback"
    );
}

#[test]
fn test_method_mismatch_skips_entry() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.post("/submit", tagged("post"));
    assert_eq!(dispatch_tag(&router, Method::GET, "/submit"), "<none>");
    assert_eq!(dispatch_tag(&router, Method::POST, "/submit"), "post");
}

#[test]
fn test_glob_semantics_through_dispatch() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/item", tagged("literal"));
    router.get("/one/*", tagged("segment"));
    router.get("/deep/**", tagged("tree"));

    assert_eq!(dispatch_tag(&router, Method::GET, "/item"), "literal");
    assert_eq!(dispatch_tag(&router, Method::GET, "/items"), "<none>");

    assert_eq!(dispatch_tag(&router, Method::GET, "/one/abc"), "segment");
    assert_eq!(dispatch_tag(&router, Method::GET, "/one/abc/def"), "<none>");

    assert_eq!(dispatch_tag(&router, Method::GET, "/deep/abc"), "tree");
    assert_eq!(dispatch_tag(&router, Method::GET, "/deep/abc/def"), "tree");
}

#[test]
fn test_query_and_fragment_excluded_from_matching() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/users/*", tagged("users"));
    assert_eq!(
        dispatch_tag(&router, Method::GET, "/users/42?limit=10&offset=0"),
        "users"
    );
    assert_eq!(
        dispatch_tag(&router, Method::GET, "/users/42#profile"),
        "users"
    );
}

#[test]
fn test_empty_registry_yields_no_route_matched() {
    let _tracing = TestTracing::init();
    let router = Router::new();
    let err = router
        .handle_request(HandlerRequest::new(Method::GET, "/anything"))
        .unwrap_err();
    match err {
        RouterError::NoRouteMatched { method, path } => {
            assert_eq!(method, Method::GET);
            assert_eq!(path, "/anything");
        }
        other => panic!("expected NoRouteMatched, got {other}"),
    }
}

#[test]
fn test_dispatch_is_deterministic_for_equivalent_requests() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/a/*", tagged("one"));
    router.get("/a/**", tagged("two"));
    let first = dispatch_tag(&router, Method::GET, "/a/x");
    let second = dispatch_tag(&router, Method::GET, "/a/x");
    assert_eq!(first, "one");
    assert_eq!(first, second);
}

#[test]
fn test_get_or_head_registers_both_methods() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get_or_head("/page", tagged("page"));
    assert_eq!(router.routes().len(), 2);
    assert_eq!(dispatch_tag(&router, Method::GET, "/page"), "page");
    assert_eq!(dispatch_tag(&router, Method::HEAD, "/page"), "page");
    assert_eq!(dispatch_tag(&router, Method::POST, "/page"), "<none>");
}

#[test]
fn test_convenience_methods_map_to_expected_specs() {
    let _tracing = TestTracing::init();
    let mut router = Router::new();
    router.get("/g", tagged("g"));
    router.post("/p", tagged("p"));
    router.put("/u", tagged("u"));
    router.patch("/pa", tagged("pa"));
    router.delete("/d", tagged("d"));
    router.head("/h", tagged("h"));
    router.options("/o", tagged("o"));
    router.all("/a", tagged("a"));

    let specs: Vec<MethodSpec> = router.routes().iter().map(|e| e.method).collect();
    assert_eq!(
        specs,
        vec![
            MethodSpec::Get,
            MethodSpec::Post,
            MethodSpec::Put,
            MethodSpec::Patch,
            MethodSpec::Delete,
            MethodSpec::Head,
            MethodSpec::Options,
            MethodSpec::All,
        ]
    );
}
