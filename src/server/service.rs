use super::request::{parse_request, ParsedRequest};
use super::response::{write_handler_response, write_json_error};
use crate::dispatcher::HandlerRequest;
use crate::ids::RequestId;
use crate::metrics::DispatchMetrics;
use crate::router::{request_path, Router, RouterError};
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::error;

/// HTTP service embedding a [`Router`].
///
/// Serves `/health` and `/metrics` directly, hands everything else to the
/// router, and maps the router's error taxonomy onto HTTP statuses:
/// `NoRouteMatched` becomes 404, the lazy-handler misconfigurations and
/// handler failures become 500, each with a distinguishable error body.
pub struct RouterService {
    pub router: Arc<Router>,
    pub metrics: Option<Arc<DispatchMetrics>>,
}

impl Clone for RouterService {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            metrics: self.metrics.clone(),
        }
    }
}

impl RouterService {
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            metrics: None,
        }
    }

    /// Expose dispatch metrics at `GET /metrics`.
    pub fn set_metrics(&mut self, metrics: Arc<DispatchMetrics>) {
        self.metrics = Some(metrics);
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    res.status_code(200, "OK");
    res.header("Content-Type: application/json");
    res.body_vec(json!({ "status": "ok" }).to_string().into_bytes());
    Ok(())
}

/// Metrics endpoint returning Prometheus text format statistics.
pub fn metrics_endpoint(res: &mut Response, metrics: &DispatchMetrics) -> io::Result<()> {
    let body = format!(
        "# HELP globroute_dispatches_total Requests served through the router\n\
         # TYPE globroute_dispatches_total counter\n\
         globroute_dispatches_total{{route=\"synchronous\"}} {}\n\
         globroute_dispatches_total{{route=\"asynchronous\"}} {}\n\
         # HELP globroute_dispatch_latency_seconds Average time from request receipt to handler dispatch\n\
         # TYPE globroute_dispatch_latency_seconds gauge\n\
         globroute_dispatch_latency_seconds {}\n",
        metrics.direct_dispatches(),
        metrics.lazy_dispatches(),
        metrics.average_dispatch_latency().as_secs_f64(),
    );
    res.status_code(200, "OK");
    res.header("Content-Type: text/plain; version=0.0.4");
    res.body_vec(body.into_bytes());
    Ok(())
}

/// Map a routing failure to an HTTP status and JSON body.
fn error_response(err: &RouterError, method: &Method, path: &str) -> (u16, serde_json::Value) {
    match err {
        RouterError::NoRouteMatched { .. } => (
            404,
            json!({
                "error": "Not Found",
                "method": method.as_str(),
                "path": path,
            }),
        ),
        RouterError::InvalidLazyConfiguration { exports } => (
            500,
            json!({
                "error": "Invalid lazy handler configuration",
                "exports": exports,
            }),
        ),
        RouterError::MisconfiguredLazyHandler { export } => (
            500,
            json!({
                "error": "Misconfigured lazy handler",
                "export": export,
            }),
        ),
        RouterError::Handler(e) => (500, json!({ "error": e.to_string() })),
        // Registration-time failure; not reachable while serving.
        RouterError::InvalidMethod { method } => {
            (500, json!({ "error": "Invalid method", "method": method }))
        }
    }
}

impl HttpService for RouterService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            target,
            headers,
            cookies,
            query_params,
            body,
        } = parse_request(req);

        let path = request_path(&target).to_string();

        if method == "GET" && path == "/health" {
            return health_endpoint(res);
        }
        if method == "GET" && path == "/metrics" {
            if let Some(metrics) = &self.metrics {
                return metrics_endpoint(res, metrics);
            }
            write_json_error(res, 404, json!({ "error": "Metrics not configured" }));
            return Ok(());
        }

        let method: Method = match method.parse() {
            Ok(m) => m,
            Err(_) => {
                write_json_error(res, 400, json!({ "error": "Invalid method", "method": method }));
                return Ok(());
            }
        };

        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.as_ref() == "x-request-id")
                .map(|(_, v)| v.as_str()),
        );

        let handler_request = HandlerRequest {
            request_id,
            method: method.clone(),
            target,
            query_params,
            headers,
            cookies,
            body,
        };

        match self.router.handle_request(handler_request) {
            Ok(response) => write_handler_response(res, response),
            Err(err) => {
                error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error = %err,
                    "Request failed"
                );
                let (status, body) = error_response(&err, &method, &path);
                write_json_error(res, status, body);
            }
        }
        Ok(())
    }
}
