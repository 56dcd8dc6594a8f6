//! Fieldstamp API server library
//!
//! Exposes the router so integration tests can drive the service without
//! binding a socket.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::AppState;

/// Build the application router with middleware applied.
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/pdf/sign", post(handlers::sign_pdf))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
