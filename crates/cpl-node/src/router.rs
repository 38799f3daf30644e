use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::server::AppState;

/// Build the axum router with all node endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/proofs/:digest", get(handler::proof_handler))
        .route("/v1/proofs/:digest/watch", get(handler::watch_handler))
        .route("/v1/accounts/:account/nonce", get(handler::nonce_handler))
        .route("/v1/transactions", post(handler::submit_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
