//! # Globroute
//!
//! **Globroute** is a small glob-pattern HTTP request router for Rust on the
//! `may` coroutine runtime, with first-match-wins dispatch and support for
//! both eagerly-registered and lazily-loaded handlers.
//!
//! ## Overview
//!
//! A [`Router`] holds an ordered, append-only registry of
//! (method, glob pattern, handler) entries. Each inbound request is matched
//! against the registry in registration order; the first entry whose method
//! and pattern both match receives the request. Handlers come in two
//! flavors, fixed at registration time:
//!
//! - **Direct** — a plain function from request to response.
//! - **Lazy** — an export name paired with a module loader; the loader
//!   resolves a [`HandlerModule`] on each matched request and the named
//!   export is invoked.
//!
//! ## Architecture
//!
//! - **[`router`]** - Route registry, glob pattern matching, and dispatch
//! - **[`dispatcher`]** - Handler sum type, request/response types, and
//!   handler invocation
//! - **[`metrics`]** - Optional per-dispatch timing recorder
//! - **[`server`]** - Dev HTTP server built on `may_minihttp` embedding a
//!   router
//! - **[`runtime_config`]** - Environment-driven coroutine runtime tuning
//!
//! ## Matching Rules
//!
//! Patterns are globs over the request URL's path component (query string
//! and fragment never participate): `*` matches within one path segment,
//! `**` matches across segments, everything else is literal. Registering
//! through [`Router::register`] validates the method string eagerly; the
//! per-method helpers (`get`, `post`, ..., `all`, `get_or_head`) are
//! infallible sugar.
//!
//! ## Quick Start
//!
//! ```
//! use globroute::{Handler, HandlerModule, HandlerRequest, HandlerResponse, Router};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), globroute::RouterError> {
//! let mut router = Router::new();
//! router
//!     .get(
//!         "/users/*",
//!         Handler::direct(|_req| Ok(HandlerResponse::json(200, json!({ "user": true })))),
//!     )
//!     .post(
//!         "/reports",
//!         Handler::lazy("build_report", || {
//!             // Stands in for resolving a dynamically-loaded module.
//!             Ok(HandlerModule::with_handler("build_report", |_req| {
//!                 Ok(HandlerResponse::json(201, json!({ "report": "queued" })))
//!             }))
//!         }),
//!     );
//!
//! let response = router.handle_request(HandlerRequest::new(http::Method::GET, "/users/42"))?;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Semantics
//!
//! Routing failures are configuration or lookup bugs, surfaced immediately
//! as distinct [`RouterError`] variants and never retried. Errors raised by
//! handlers themselves propagate to the caller unchanged; the router adds
//! no context and produces no error responses of its own — that is the
//! embedding server's job (see [`server::RouterService`]).
//!
//! ## Runtime Considerations
//!
//! Globroute targets the `may` coroutine runtime, not tokio or async-std.
//! Handlers run inline in the serving coroutine; anything blocking should
//! use `may`'s facilities. Coroutine stack size is configurable via the
//! `GLOBROUTE_STACK_SIZE` environment variable (see [`runtime_config`]).

pub mod dispatcher;
pub mod ids;
pub mod metrics;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{
    Handler, HandlerFn, HandlerModule, HandlerRequest, HandlerResponse, HandlerResult, HeaderVec,
    LoaderFn, ModuleExport, ParamVec,
};
pub use metrics::{DispatchMetrics, TimingRecorder, ASYNCHRONOUS_ROUTE, SYNCHRONOUS_ROUTE};
pub use router::{GlobPattern, MethodSpec, RouteEntry, Router, RouterError};
