//! Dispatcher core module - hot path for handler invocation.

use crate::ids::RequestId;
use crate::metrics::{TimingRecorder, ASYNCHRONOUS_ROUTE, SYNCHRONOUS_ROUTE};
use crate::router::RouterError;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Maximum number of query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers/cookies before heap allocation.
/// Most requests have ≤16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated parameter storage for the hot path.
///
/// Names use `Arc<str>` so repeated keys clone with an atomic increment
/// rather than a string copy; values remain per-request `String`s.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Stack-allocated header/cookie storage for the hot path.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Inbound request data handed to the router and, on a match, to the
/// selected handler.
///
/// The router reads only `method` and the path component of `target`;
/// everything else is carried through for the handler.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Raw request target: origin-form (`/path?query`) or absolute-form URL
    pub target: String,
    /// Parsed query string parameters (stack-allocated for ≤8 params)
    pub query_params: ParamVec,
    /// HTTP headers, lowercase names (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Build a bare request from a method and target, with a fresh
    /// request ID and no headers, parameters, or body.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            target: target.to_string(),
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: None,
        }
    }

    /// Get a query parameter by name.
    ///
    /// Uses "last write wins" semantics: for duplicate names
    /// (e.g. `?limit=10&limit=20`) the last occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response data produced by a handler.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// What a handler returns: a response, or an opaque failure the router
/// propagates unchanged.
pub type HandlerResult = Result<HandlerResponse, anyhow::Error>;

/// A directly-registered handler function.
pub type HandlerFn = Arc<dyn Fn(HandlerRequest) -> HandlerResult + Send + Sync>;

/// A zero-argument module loader resolving a [`HandlerModule`].
pub type LoaderFn = Arc<dyn Fn() -> Result<HandlerModule, anyhow::Error> + Send + Sync>;

/// One export of a lazily-loaded module: callable or plain data.
///
/// A `Value` export models a module member that exists but cannot be
/// invoked; looking one up as a handler fails with
/// [`RouterError::MisconfiguredLazyHandler`].
#[derive(Clone)]
pub enum ModuleExport {
    /// A callable handler function
    Handler(HandlerFn),
    /// A non-callable data export
    Value(Value),
}

impl fmt::Debug for ModuleExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleExport::Handler(_) => f.write_str("Handler(..)"),
            ModuleExport::Value(v) => write!(f, "Value({v})"),
        }
    }
}

/// The module-like object a lazy loader resolves: a table of named exports.
#[derive(Clone, Default)]
pub struct HandlerModule {
    exports: HashMap<String, ModuleExport>,
}

impl HandlerModule {
    /// Create an empty module.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a module holding a single callable export.
    #[must_use]
    pub fn with_handler<F>(name: &str, handler: F) -> Self
    where
        F: Fn(HandlerRequest) -> HandlerResult + Send + Sync + 'static,
    {
        let mut module = Self::new();
        module.insert_handler(name, handler);
        module
    }

    /// Add a callable export.
    pub fn insert_handler<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(HandlerRequest) -> HandlerResult + Send + Sync + 'static,
    {
        self.exports
            .insert(name.to_string(), ModuleExport::Handler(Arc::new(handler)));
    }

    /// Add a non-callable data export.
    pub fn insert_value(&mut self, name: &str, value: Value) {
        self.exports
            .insert(name.to_string(), ModuleExport::Value(value));
    }

    /// Look up an export by name.
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&ModuleExport> {
        self.exports.get(name)
    }

    /// Names of all exports, for diagnostics.
    #[must_use]
    pub fn export_names(&self) -> Vec<&str> {
        self.exports.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for HandlerModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerModule")
            .field("exports", &self.export_names())
            .finish()
    }
}

/// A route's handler, fixed at registration time.
///
/// `Direct` wraps an eagerly-supplied function. `Lazy` defers to a module
/// loader keyed by export name; the loader runs on every matched request
/// and the named export is invoked once resolved.
#[derive(Clone)]
pub enum Handler {
    /// Function invoked directly with the request
    Direct(HandlerFn),
    /// Export-name → loader table; exactly one entry is required
    Lazy(HashMap<String, LoaderFn>),
}

impl Handler {
    /// Wrap a function as a direct handler.
    pub fn direct<F>(handler: F) -> Self
    where
        F: Fn(HandlerRequest) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Direct(Arc::new(handler))
    }

    /// Build a lazy handler from an export name and its module loader.
    pub fn lazy<F>(export: &str, loader: F) -> Self
    where
        F: Fn() -> Result<HandlerModule, anyhow::Error> + Send + Sync + 'static,
    {
        let mut table: HashMap<String, LoaderFn> = HashMap::new();
        table.insert(export.to_string(), Arc::new(loader));
        Handler::Lazy(table)
    }

    /// Build a lazy handler from a pre-assembled export table.
    ///
    /// The exactly-one-entry rule is enforced at dispatch time, so a
    /// malformed table is representable here and rejected on first use.
    #[must_use]
    pub fn lazy_table(table: HashMap<String, LoaderFn>) -> Self {
        Handler::Lazy(table)
    }

    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Direct(_) => "direct",
            Handler::Lazy(_) => "lazy",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Direct(_) => f.write_str("Direct(..)"),
            Handler::Lazy(table) => f
                .debug_tuple("Lazy")
                .field(&table.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Invoke a matched handler with the request.
///
/// Direct handlers run immediately. Lazy handlers first validate the export
/// table, resolve the module through the loader, and look up the named
/// export. The timing recorder, if present, is notified just before the
/// handler runs with the elapsed time since `received`; a panicking
/// recorder is swallowed.
pub(crate) fn dispatch(
    handler: &Handler,
    request: HandlerRequest,
    recorder: Option<&Arc<dyn TimingRecorder>>,
    received: Instant,
) -> Result<HandlerResponse, RouterError> {
    match handler {
        Handler::Direct(handler_fn) => {
            record_dispatch(recorder, SYNCHRONOUS_ROUTE, received);
            info!(
                request_id = %request.request_id,
                method = %request.method,
                target = %request.target,
                "Dispatching direct handler"
            );
            (**handler_fn)(request).map_err(RouterError::Handler)
        }
        Handler::Lazy(table) => {
            let mut entries = table.iter();
            let (export, loader) = match (entries.next(), entries.next()) {
                (Some(entry), None) => entry,
                _ => {
                    error!(
                        exports = table.len(),
                        "Lazy handler table must hold exactly one export"
                    );
                    return Err(RouterError::InvalidLazyConfiguration {
                        exports: table.len(),
                    });
                }
            };

            debug!(
                request_id = %request.request_id,
                export = %export,
                "Resolving lazy handler module"
            );
            let module = (**loader)().map_err(RouterError::Handler)?;

            let handler_fn = match module.export(export) {
                Some(ModuleExport::Handler(handler_fn)) => handler_fn,
                Some(ModuleExport::Value(_)) => {
                    error!(
                        export = %export,
                        "Lazy module export is not callable"
                    );
                    return Err(RouterError::MisconfiguredLazyHandler {
                        export: export.clone(),
                    });
                }
                None => {
                    error!(
                        export = %export,
                        available = ?module.export_names(),
                        "Lazy module is missing the expected export"
                    );
                    return Err(RouterError::MisconfiguredLazyHandler {
                        export: export.clone(),
                    });
                }
            };

            record_dispatch(recorder, ASYNCHRONOUS_ROUTE, received);
            info!(
                request_id = %request.request_id,
                export = %export,
                "Dispatching lazy handler"
            );
            (**handler_fn)(request).map_err(RouterError::Handler)
        }
    }
}

/// Notify the timing recorder, swallowing any panic it raises.
fn record_dispatch(
    recorder: Option<&Arc<dyn TimingRecorder>>,
    name: &'static str,
    received: Instant,
) {
    if let Some(recorder) = recorder {
        let elapsed = received.elapsed();
        if catch_unwind(AssertUnwindSafe(|| recorder.record(name, elapsed))).is_err() {
            warn!(
                measurement = name,
                "Timing recorder panicked; measurement dropped"
            );
        }
    }
}
