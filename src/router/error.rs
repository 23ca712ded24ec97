use http::Method;
use std::fmt;

/// Routing failure surfaced to the caller of `register` or `handle_request`.
///
/// Every variant is a configuration or lookup failure, never a transient
/// condition: nothing here is retried internally. `Handler` carries an error
/// raised by an invoked handler (or a lazy module loader) verbatim, with no
/// added context, so the embedding server decides how to present it.
#[derive(Debug)]
pub enum RouterError {
    /// Registration was attempted with a method string outside the
    /// recognized set.
    InvalidMethod {
        /// The rejected method string
        method: String,
    },
    /// No registry entry matched the request's method and path.
    NoRouteMatched {
        /// The request's HTTP method
        method: Method,
        /// The path component the registry was scanned with
        path: String,
    },
    /// A lazy handler's export table did not hold exactly one entry.
    InvalidLazyConfiguration {
        /// Number of entries found in the export table
        exports: usize,
    },
    /// The lazily-loaded module lacks the named export, or the export is
    /// not callable.
    MisconfiguredLazyHandler {
        /// The export name the route was registered with
        export: String,
    },
    /// The invoked handler (or module loader) failed; propagated unchanged.
    Handler(anyhow::Error),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidMethod { method } => {
                write!(
                    f,
                    "unrecognized HTTP method '{}'. \
                    Expected one of: ALL, DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT",
                    method
                )
            }
            RouterError::NoRouteMatched { method, path } => {
                write!(f, "no registered route matches {} {}", method, path)
            }
            RouterError::InvalidLazyConfiguration { exports } => {
                write!(
                    f,
                    "lazy handler must hold exactly one export, found {}",
                    exports
                )
            }
            RouterError::MisconfiguredLazyHandler { export } => {
                write!(
                    f,
                    "lazy module export '{}' is missing or not callable",
                    export
                )
            }
            RouterError::Handler(err) => write!(f, "handler failed: {}", err),
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
