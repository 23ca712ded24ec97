//! # Router Module
//!
//! Path matching and route resolution: an ordered registry of
//! (method, glob pattern, handler) entries scanned in registration order,
//! with first-match-wins dispatch.
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Registration**: glob patterns (e.g. `/users/*`) are compiled into
//!    anchored regexes once, and each registration appends one immutable
//!    entry to the registry. The method string is validated here, never at
//!    dispatch time.
//!
//! 2. **Dispatch**: for each request, the path component is extracted from
//!    the target (query string and fragment excluded) and tested against
//!    the registry in insertion order; the first entry whose method and
//!    pattern both match receives the request.
//!
//! ## Example
//!
//! ```
//! use globroute::{Handler, HandlerRequest, HandlerResponse, Router};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), globroute::RouterError> {
//! let mut router = Router::new();
//! router.get(
//!     "/pets/*",
//!     Handler::direct(|req: HandlerRequest| {
//!         Ok(HandlerResponse::json(200, json!({ "target": req.target })))
//!     }),
//! );
//!
//! let req = HandlerRequest::new(http::Method::GET, "/pets/42");
//! let response = router.handle_request(req)?;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Performance
//!
//! Matching is a linear scan over compiled patterns: O(n) in the number of
//! routes, with no allocation on the match path. Registries in the intended
//! use hold at most a few dozen entries.

mod core;
mod error;
mod glob;

pub use core::{MethodSpec, RouteEntry, Router};
pub use error::RouterError;
pub use glob::GlobPattern;

pub(crate) use core::request_path;
