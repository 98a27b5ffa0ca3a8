//! HTTP surface for clinical de-identification.
//!
//! Routes:
//! - `POST /deidentify`: `{text}` in, `{input_text, deidentified_text, entities}` out
//! - `GET /ping`: warm up the model
//! - `GET /health`: liveness and model state

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/deidentify", post(routes::deidentify))
        .route("/ping", get(routes::ping))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
