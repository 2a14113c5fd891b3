//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The HTTP request entry layer: an axum service exposing `POST /orders` (the submission
// facade) and `GET /orders/:id` (read-back). This module never touches the order book
// or the processor's queue directly — it only calls `SubmissionFacade::submit` and
// `OrderStore::load_order`, the two operations a request handler is allowed to perform.
//
// | Component | Description                                                           |
// |-----------|------------------------------------------------------------------------|
// | AppState  | Shared state: the submission facade plus a direct store handle for GET |
// | routes    | Handler functions for each endpoint                                    |
// | dto       | Wire-format request/response shapes                                    |
// | error     | ApiError, mapped to HTTP status codes                                  |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

use crate::facade::SubmissionFacade;
use crate::store::OrderStore;

/// Shared application state: the facade request handlers submit through, plus a direct
/// store handle for `GET /orders/:id` (a read never needs to go through the facade, which
/// exists to *enqueue*, not to read).
pub struct AppState<S: OrderStore> {
    pub facade: SubmissionFacade<S>,
    pub store: Arc<S>,
}

impl<S: OrderStore> AppState<S> {
    pub fn new(facade: SubmissionFacade<S>, store: Arc<S>) -> Self {
        Self { facade, store }
    }
}

/// Builds the axum router over a shared `AppState`.
pub fn build_router<S: OrderStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/orders", post(routes::create_order::<S>))
        .route("/orders/:id", get(routes::get_order::<S>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serves the router until a ctrl-c/SIGTERM signal is received.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
