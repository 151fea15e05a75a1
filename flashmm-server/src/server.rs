use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use flashmm_data::SnapshotBuffer;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handler::OrdersHandler;

/// HTTP server for the order snapshot buffer
pub struct HttpServer {
    config: ServerConfig,
    handler: Arc<OrdersHandler>,
}

impl HttpServer {
    /// Create a server over `buffer`
    pub fn new(config: ServerConfig, buffer: Arc<SnapshotBuffer>) -> Self {
        let handler = Arc::new(OrdersHandler::new(
            buffer,
            config.recent_limit,
            config.network_name.clone(),
        ));
        Self { config, handler }
    }

    pub fn router(&self) -> Router {
        build_router(self.handler.clone())
    }

    /// Bind and serve until the process exits
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("FlashMM HTTP server listening on {}", addr);

        axum::serve(listener, self.router())
            .await
            .context("HTTP server stopped")?;
        Ok(())
    }
}

/// Routes for health and order snapshots; every response is uncached
pub fn build_router(handler: Arc<OrdersHandler>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/orders", get(list_orders).post(post_order))
        .layer(middleware::map_response(no_store))
        .with_state(handler)
}

async fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

async fn health(State(handler): State<Arc<OrdersHandler>>) -> impl IntoResponse {
    Json(handler.health())
}

async fn list_orders(State(handler): State<Arc<OrdersHandler>>) -> impl IntoResponse {
    Json(handler.list().await)
}

/// The body is read raw so any parse failure maps to the same 400 response
async fn post_order(
    State(handler): State<Arc<OrdersHandler>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let ack = handler.ingest(&body).await?;
    Ok(Json(ack))
}
