//! Integration tests for the dev HTTP server: request parsing, routing,
//! error-to-status mapping, and the health/metrics endpoints.

use globroute::server::{HttpServer, RouterService, ServerHandle};
use globroute::{
    DispatchMetrics, Handler, HandlerModule, HandlerRequest, HandlerResponse, Router,
    TimingRecorder,
};
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use tracing_util::TestTracing;

/// Test fixture with automatic setup and teardown using RAII.
struct DevServerFixture {
    _tracing: TestTracing,
    handle: Option<ServerHandle>,
    addr: SocketAddr,
    metrics: Arc<DispatchMetrics>,
}

impl DevServerFixture {
    fn new() -> Self {
        may::config().set_stack_size(0x8000);
        let tracing = TestTracing::init();

        let metrics = Arc::new(DispatchMetrics::new());
        let mut router = Router::new();
        router.set_timing_recorder(Arc::clone(&metrics) as Arc<dyn TimingRecorder>);
        router.get(
            "/pets/*",
            Handler::direct(|req: HandlerRequest| {
                Ok(HandlerResponse::json(
                    200,
                    json!({ "target": req.target, "limit": req.get_query_param("limit") }),
                ))
            }),
        );
        router.get(
            "/reports/summary",
            Handler::lazy("summary", || {
                Ok(HandlerModule::with_handler("summary", |_req| {
                    Ok(HandlerResponse::json(200, json!({ "report": "summary" })))
                }))
            }),
        );
        router.get(
            "/reports/broken",
            Handler::lazy("expected", || {
                Ok(HandlerModule::with_handler("unexpected", |_req| {
                    Ok(HandlerResponse::json(200, json!({})))
                }))
            }),
        );
        router.get(
            "/boom",
            Handler::direct(|_req| Err(anyhow::anyhow!("backend exploded"))),
        );

        let mut service = RouterService::new(Arc::new(router));
        service.set_metrics(Arc::clone(&metrics));

        // Bind to a random free port, then hand the address to the server.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let handle = HttpServer(service).start(addr).unwrap();
        handle.wait_ready().unwrap();

        Self {
            _tracing: tracing,
            handle: Some(handle),
            addr,
            metrics,
        }
    }
}

impl Drop for DevServerFixture {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {:?}", e),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn parse_response(resp: &str) -> (u16, Value) {
    let mut parts = resp.split("\r\n\r\n");
    let headers = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("");
    let mut status = 0;
    for line in headers.lines() {
        if line.starts_with("HTTP/1.1") {
            status = line
                .split_whitespace()
                .nth(1)
                .unwrap_or("0")
                .parse()
                .unwrap();
        }
    }
    let json: Value = serde_json::from_str(body).unwrap_or_default();
    (status, json)
}

fn get(addr: &SocketAddr, path: &str) -> (u16, Value) {
    let raw = send_request(
        addr,
        &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
    );
    parse_response(&raw)
}

#[test]
fn test_direct_route_round_trip() {
    let server = DevServerFixture::new();
    let (status, body) = get(&server.addr, "/pets/42?limit=10");
    assert_eq!(status, 200);
    assert_eq!(body["target"], "/pets/42?limit=10");
    assert_eq!(body["limit"], "10");
}

#[test]
fn test_lazy_route_round_trip() {
    let server = DevServerFixture::new();
    let (status, body) = get(&server.addr, "/reports/summary");
    assert_eq!(status, 200);
    assert_eq!(body["report"], "summary");
}

#[test]
fn test_unmatched_route_maps_to_404() {
    let server = DevServerFixture::new();
    let (status, body) = get(&server.addr, "/does/not/exist");
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/does/not/exist");
}

#[test]
fn test_misconfigured_lazy_handler_maps_to_500() {
    let server = DevServerFixture::new();
    let (status, body) = get(&server.addr, "/reports/broken");
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Misconfigured lazy handler");
    assert_eq!(body["export"], "expected");
}

#[test]
fn test_handler_failure_maps_to_500() {
    let server = DevServerFixture::new();
    let (status, body) = get(&server.addr, "/boom");
    assert_eq!(status, 500);
    assert_eq!(body["error"], "backend exploded");
}

#[test]
fn test_health_endpoint() {
    let server = DevServerFixture::new();
    let (status, body) = get(&server.addr, "/health");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[test]
fn test_metrics_endpoint_reports_dispatches() {
    let server = DevServerFixture::new();
    let _ = get(&server.addr, "/pets/1");
    let _ = get(&server.addr, "/reports/summary");

    assert_eq!(server.metrics.direct_dispatches(), 1);
    assert_eq!(server.metrics.lazy_dispatches(), 1);

    let raw = send_request(
        &server.addr,
        "GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    );
    assert!(raw.contains("globroute_dispatches_total{route=\"synchronous\"} 1"));
    assert!(raw.contains("globroute_dispatches_total{route=\"asynchronous\"} 1"));
}

#[test]
fn test_post_body_reaches_handler() {
    may::config().set_stack_size(0x8000);
    let _tracing = TestTracing::init();

    let mut router = Router::new();
    router.post(
        "/echo",
        Handler::direct(|req: HandlerRequest| {
            Ok(HandlerResponse::json(200, json!({ "body": req.body })))
        }),
    );
    let service = RouterService::new(Arc::new(router));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handle = HttpServer(service).start(addr).unwrap();
    handle.wait_ready().unwrap();

    let payload = json!({ "name": "sample" }).to_string();
    let raw = send_request(
        &addr,
        &format!(
            "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            payload.len(),
            payload
        ),
    );
    let (status, body) = parse_response(&raw);
    assert_eq!(status, 200);
    assert_eq!(body["body"], json!({ "name": "sample" }));

    handle.stop();
}
