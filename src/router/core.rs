//! Router core module - hot path for request routing.

use crate::dispatcher::{dispatch, Handler, HandlerRequest, HandlerResponse};
use crate::metrics::TimingRecorder;
use http::Method;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::error::RouterError;
use super::glob::GlobPattern;

/// The fixed set of registrable methods.
///
/// `All` is a wildcard that accepts any inbound method; the rest accept
/// exactly their own method (case-sensitive, as normalized upstream by the
/// HTTP parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodSpec {
    All,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
}

impl MethodSpec {
    /// Canonical name used in registration strings and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodSpec::All => "ALL",
            MethodSpec::Delete => "DELETE",
            MethodSpec::Get => "GET",
            MethodSpec::Head => "HEAD",
            MethodSpec::Options => "OPTIONS",
            MethodSpec::Patch => "PATCH",
            MethodSpec::Post => "POST",
            MethodSpec::Put => "PUT",
        }
    }

    /// Whether an inbound request method satisfies this spec.
    #[inline]
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            MethodSpec::All => true,
            other => method.as_str() == other.as_str(),
        }
    }
}

impl FromStr for MethodSpec {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(MethodSpec::All),
            "DELETE" => Ok(MethodSpec::Delete),
            "GET" => Ok(MethodSpec::Get),
            "HEAD" => Ok(MethodSpec::Head),
            "OPTIONS" => Ok(MethodSpec::Options),
            "PATCH" => Ok(MethodSpec::Patch),
            "POST" => Ok(MethodSpec::Post),
            "PUT" => Ok(MethodSpec::Put),
            other => Err(RouterError::InvalidMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable registry entry, created at registration time.
#[derive(Clone)]
pub struct RouteEntry {
    /// Method the entry answers to (`All` matches every method)
    pub method: MethodSpec,
    /// Compiled glob tested against the request path
    pub pattern: GlobPattern,
    /// Direct or lazy handler invoked on match
    pub handler: Handler,
}

/// Router that resolves each inbound request to exactly one handler.
///
/// Maintains an append-only, ordered registry of [`RouteEntry`] values;
/// insertion order defines match priority and the first matching entry wins.
/// The registry is populated through chained registration calls before
/// serving begins and is never mutated afterwards (there is no removal API).
///
/// Registration during concurrent dispatch is not synchronized: a request
/// racing a registration may observe either registry state. Complete all
/// registrations before serving traffic.
pub struct Router {
    entries: Vec<RouteEntry>,
    recorder: Option<Arc<dyn TimingRecorder>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("entries", &self.entries.len())
            .field("recorder", &self.recorder.is_some())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            recorder: None,
        }
    }

    /// Attach a timing recorder notified once per dispatched request.
    ///
    /// The recorder observes a named measurement (`synchronous-route` for
    /// direct handlers, `asynchronous-route` for lazy ones) covering the
    /// span from request receipt to handler dispatch. A panicking recorder
    /// is swallowed and never affects the response.
    pub fn set_timing_recorder(&mut self, recorder: Arc<dyn TimingRecorder>) {
        self.recorder = Some(recorder);
    }

    /// Register a route under a method given as a string.
    ///
    /// The method is validated against [`MethodSpec`] before anything is
    /// appended: an unrecognized string fails with
    /// [`RouterError::InvalidMethod`] and leaves the registry unchanged.
    /// On success returns `&mut self` so registrations chain fluently.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidMethod`] if `method` is not one of
    /// `ALL`, `DELETE`, `GET`, `HEAD`, `OPTIONS`, `PATCH`, `POST`, `PUT`.
    pub fn register(
        &mut self,
        pattern: &str,
        handler: Handler,
        method: &str,
    ) -> Result<&mut Self, RouterError> {
        let spec: MethodSpec = method.parse()?;
        Ok(self.push(spec, pattern, handler))
    }

    fn push(&mut self, method: MethodSpec, pattern: &str, handler: Handler) -> &mut Self {
        debug!(
            method = %method,
            pattern = %pattern,
            kind = handler.kind(),
            position = self.entries.len(),
            "Route registered"
        );
        self.entries.push(RouteEntry {
            method,
            pattern: GlobPattern::new(pattern),
            handler,
        });
        self
    }

    /// Register a route answering `GET` requests.
    pub fn get(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::Get, pattern, handler)
    }

    /// Register a route answering `POST` requests.
    pub fn post(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::Post, pattern, handler)
    }

    /// Register a route answering `PUT` requests.
    pub fn put(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::Put, pattern, handler)
    }

    /// Register a route answering `PATCH` requests.
    pub fn patch(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::Patch, pattern, handler)
    }

    /// Register a route answering `DELETE` requests.
    pub fn delete(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::Delete, pattern, handler)
    }

    /// Register a route answering `HEAD` requests.
    pub fn head(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::Head, pattern, handler)
    }

    /// Register a route answering `OPTIONS` requests.
    pub fn options(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::Options, pattern, handler)
    }

    /// Register a wildcard route answering every method.
    pub fn all(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.push(MethodSpec::All, pattern, handler)
    }

    /// Register the same pattern and handler under both `GET` and `HEAD`.
    ///
    /// The handler's inner `Arc` is shared between the two entries, not
    /// re-wrapped.
    pub fn get_or_head(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        let head_handler = handler.clone();
        self.push(MethodSpec::Get, pattern, handler);
        self.push(MethodSpec::Head, pattern, head_handler)
    }

    /// Find the first registry entry matching a method and path, in
    /// insertion order.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .find(|entry| entry.method.accepts(method) && entry.pattern.matches(path))
    }

    /// Resolve a request to a response through the first matching entry.
    ///
    /// The path component of the request target is extracted first (query
    /// string and fragment never participate in matching), then the
    /// registry is scanned in insertion order. Direct handlers are invoked
    /// with the request; lazy handlers resolve their module loader before
    /// invocation. Handler and loader failures propagate unchanged as
    /// [`RouterError::Handler`].
    ///
    /// # Errors
    ///
    /// - [`RouterError::NoRouteMatched`] when the full scan finds no entry
    /// - [`RouterError::InvalidLazyConfiguration`] when a matched lazy
    ///   handler holds zero or multiple exports
    /// - [`RouterError::MisconfiguredLazyHandler`] when the resolved module
    ///   lacks the named export or the export is not callable
    /// - [`RouterError::Handler`] when the handler or loader fails
    pub fn handle_request(&self, request: HandlerRequest) -> Result<HandlerResponse, RouterError> {
        let received = Instant::now();
        let path = request_path(&request.target);

        debug!(
            request_id = %request.request_id,
            method = %request.method,
            path = %path,
            routes = self.entries.len(),
            "Route match attempt"
        );

        match self.route(&request.method, path) {
            Some(entry) => {
                info!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %path,
                    pattern = entry.pattern.source(),
                    kind = entry.handler.kind(),
                    "Route matched"
                );
                dispatch(&entry.handler, request, self.recorder.as_ref(), received)
            }
            None => {
                warn!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %path,
                    "No route matched"
                );
                Err(RouterError::NoRouteMatched {
                    path: path.to_string(),
                    method: request.method,
                })
            }
        }
    }

    /// All registered entries, in match order.
    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Print the registry to stdout, one line per entry.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.entries.len());
        for entry in &self.entries {
            println!(
                "[route] {} {} ({})",
                entry.method,
                entry.pattern.source(),
                entry.handler.kind()
            );
        }
    }
}

/// Extract the path component of a request target.
///
/// Strips the query string and fragment; absolute-form targets
/// (`scheme://host/path`) are reduced to their path.
pub(crate) fn request_path(target: &str) -> &str {
    let after_authority = match target.find("://") {
        Some(idx) => {
            let rest = &target[idx + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "/",
            }
        }
        None => target,
    };
    let end = after_authority
        .find(|c| c == '?' || c == '#')
        .unwrap_or(after_authority.len());
    &after_authority[..end]
}
