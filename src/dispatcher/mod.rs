//! # Dispatcher Module
//!
//! Handler representation and invocation for matched routes.
//!
//! ## Overview
//!
//! A route's handler is fixed at registration time as a sum type:
//!
//! - **Direct** — an eagerly-supplied function invoked with the request.
//! - **Lazy** — a single-entry table mapping an export name to a module
//!   loader. On each matched request the loader resolves a
//!   [`HandlerModule`] (a table of named exports), the named export is
//!   looked up, and, if callable, invoked with the request.
//!
//! ## Request Flow
//!
//! 1. Router matches the request against its registry
//! 2. Direct handlers run immediately; lazy handlers resolve their loader
//!    first
//! 3. The optional timing recorder is notified just before the handler
//!    runs (`synchronous-route` / `asynchronous-route`)
//! 4. The handler's result, success or failure, flows back to the caller
//!    unchanged
//!
//! ## Error Handling
//!
//! A lazy export table with zero or multiple entries, and a resolved module
//! whose named export is missing or not callable, are configuration bugs
//! surfaced as distinct [`crate::RouterError`] variants. Handler and loader
//! failures are propagated verbatim; the dispatcher adds no context and
//! retries nothing.
//!
//! ## Concurrency
//!
//! Handlers run inline in the calling coroutine. The dispatcher itself
//! performs no I/O and holds no state; concurrent dispatches share nothing
//! but the read-only route registry.

mod core;

pub use core::{
    Handler, HandlerFn, HandlerModule, HandlerRequest, HandlerResponse, HandlerResult, HeaderVec,
    LoaderFn, ModuleExport, ParamVec, MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};

pub(crate) use core::dispatch;
