//! Shared server state and the router wiring.
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::generation::IconGenerator;
use crate::state::Orchestrator;
use super::handlers;

/// Uploads larger than this are refused before reaching the handler.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub struct AppState<G> {
    pub orchestrator: RwLock<Orchestrator>,
    pub generator: G,
}

impl<G: IconGenerator> AppState<G> {
    pub fn new(generator: G) -> Self {
        AppState { orchestrator: RwLock::new(Orchestrator::new()), generator }
    }
}

pub fn router<G: IconGenerator>(state: Arc<AppState<G>>) -> Router {
    Router::new()
        .route("/", get(handlers::index::<G>))
        .route("/state", get(handlers::state_json::<G>))
        .route("/upload", post(handlers::upload::<G>))
        .route("/reset", post(handlers::reset::<G>))
        .route("/generate", post(handlers::generate::<G>))
        .route("/preview/:id", get(handlers::preview::<G>))
        .route("/download", get(handlers::download::<G>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
