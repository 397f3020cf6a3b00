use std::future::Future;
use std::sync::Arc;

use warp::Filter;

use super::PrometheusReporter;
use crate::application::services::StreamDirectory;

/// Health check response structure
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Serve `/metrics`, `/health` and `/streams` until `shutdown` resolves
pub async fn serve_metrics(
    port: u16,
    directory: Arc<StreamDirectory>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) {
    // CORS configuration for browser access
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "OPTIONS"])
        .allow_headers(vec!["Content-Type"]);

    let metrics_route = warp::path("metrics").map(|| {
        let body = PrometheusReporter::gather_metrics();
        warp::reply::with_header(body, "content-type", "text/plain; version=0.0.4; charset=utf-8")
    });

    let health_route = warp::path("health").map(|| {
        let response = HealthResponse {
            status: "healthy",
            service: "nvi-bridge",
            version: env!("CARGO_PKG_VERSION"),
        };
        warp::reply::json(&response)
    });

    // Latest discovery snapshot, as the host would show it in a selection list
    let streams_route = warp::path("streams").map(move || {
        let snapshot = directory.snapshot();
        warp::reply::json(&*snapshot)
    });

    let routes = metrics_route
        .or(health_route)
        .or(streams_route)
        .with(cors);

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], port), shutdown);

    tracing::info!("Metrics server listening on http://{}", addr);

    server.await;
}
