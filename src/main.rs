use clap::Parser;
use globroute::server::{HttpServer, RouterService};
use globroute::{
    DispatchMetrics, Handler, HandlerModule, HandlerResponse, Router, TimingRecorder,
};
use globroute::runtime_config::RuntimeConfig;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "globroute")]
#[command(about = "Glob-pattern dev HTTP server", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0:8080")]
    addr: String,

    /// Print the route table at startup
    #[arg(long, default_value_t = false)]
    dump_routes: bool,
}

/// Demo route table exercising direct, lazy, and wildcard routes.
fn demo_router(metrics: Arc<DispatchMetrics>) -> Router {
    let mut router = Router::new();
    router.set_timing_recorder(metrics as Arc<dyn TimingRecorder>);

    router
        .get(
            "/hello",
            Handler::direct(|req| {
                Ok(HandlerResponse::json(
                    200,
                    json!({ "message": "hello", "request_id": req.request_id.to_string() }),
                ))
            }),
        )
        .post(
            "/echo",
            Handler::direct(|req| {
                Ok(HandlerResponse::json(
                    200,
                    json!({
                        "method": req.method.as_str(),
                        "target": req.target,
                        "body": req.body,
                    }),
                ))
            }),
        )
        .get_or_head(
            "/items/*",
            Handler::direct(|req| {
                Ok(HandlerResponse::json(200, json!({ "target": req.target })))
            }),
        )
        .get(
            "/reports/summary",
            Handler::lazy("summary", || {
                Ok(HandlerModule::with_handler("summary", |_req| {
                    Ok(HandlerResponse::json(200, json!({ "report": "summary" })))
                }))
            }),
        )
        .all(
            "/debug/**",
            Handler::direct(|req| {
                Ok(HandlerResponse::json(
                    200,
                    json!({
                        "method": req.method.as_str(),
                        "target": req.target,
                        "query": req.get_query_param("q"),
                    }),
                ))
            }),
        );

    router
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RuntimeConfig::from_env();
    may::config().set_stack_size(config.stack_size);

    let metrics = Arc::new(DispatchMetrics::new());
    let router = demo_router(Arc::clone(&metrics));
    if cli.dump_routes {
        router.dump_routes();
    }

    let mut service = RouterService::new(Arc::new(router));
    service.set_metrics(metrics);

    let handle = HttpServer(service).start(&cli.addr)?;
    info!(addr = %cli.addr, stack_size = config.stack_size, "Dev server listening");
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server exited abnormally: {e:?}"))?;
    Ok(())
}
