// rest/mod.rs — Public REST API server.
//
// Axum HTTP server exposing the task store as stateless endpoints:
//   GET    /health
//   GET    /tasks
//   POST   /tasks
//   PUT    /tasks/{id}
//   DELETE /tasks/{id}
//
// CORS is restricted to the single configured frontend origin.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("127.0.0.1:{}", ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("task API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let cors = cors_layer(&ctx.config.frontend_origin);
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(cors)
        .with_state(ctx)
}

/// CORS restricted to one origin, per the deployment model of a single
/// known frontend. An unparseable origin disables cross-origin access
/// rather than falling open.
fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);
    match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!(origin = %frontend_origin, err = %e, "invalid frontend origin — CORS disabled");
            layer
        }
    }
}
