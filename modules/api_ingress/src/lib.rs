//! HTTP host: wraps the module routers in the shared middleware stack and
//! runs the server until a shutdown signal arrives.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Result;
use axum::{middleware::from_fn, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod shutdown;
mod web;

pub use config::ApiIngressConfig;
pub use shutdown::wait_for_shutdown;

/// Build the served router: `/health`, the module routes, a problem+json
/// fallback and the middleware stack.
pub fn build_router(routes: Router, cfg: &ApiIngressConfig) -> Router {
    tracing::debug!("Building router");
    let mut router = Router::new()
        .route("/health", get(web::health_check))
        .merge(routes)
        .fallback(web::route_not_found);

    // Layers are added innermost first. Resulting order, outermost to innermost:
    // SetRequestId -> PropagateRequestId -> Trace -> expose_request_id -> Timeout -> CORS -> BodyLimit

    // 1. Body limit
    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));

    // 2. CORS (if enabled)
    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    // 3. Handler timeout
    router = router.layer(TimeoutLayer::new(cfg.request_timeout()));

    // 4. Hand the id to handlers
    router = router.layer(from_fn(request_id::expose_request_id));

    // 5. Request span
    router = router.layer(request_id::trace_layer());

    // 6. Echo x-request-id on the response
    router = router.layer(PropagateRequestIdLayer::new(request_id::X_REQUEST_ID));

    // 7. Generate x-request-id when missing
    router = router.layer(SetRequestIdLayer::new(
        request_id::X_REQUEST_ID,
        request_id::NanoIdMaker,
    ));

    router
}

/// Bind `addr` and serve `router` until `shutdown` resolves.
pub async fn serve<F>(router: Router, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
