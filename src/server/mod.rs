//! Development HTTP server embedding a [`crate::Router`].
//!
//! [`RouterService`] parses each inbound request, hands it to the router,
//! and maps routing failures onto HTTP statuses. [`HttpServer`] and
//! [`ServerHandle`] wrap server startup, readiness, and shutdown.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_cookies, parse_query_params, parse_request, ParsedRequest};
pub use response::{write_handler_response, write_json_error};
pub use service::{health_endpoint, metrics_endpoint, RouterService};
