use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{server::AppState, transport::routes::streams};

const API_V1: &str = "/v1";

pub fn router(state: Arc<AppState>) -> Router {
    let v1_routes = Router::new().route("/streams/{id}", get(streams::get_stream));

    Router::new()
        .nest(API_V1, v1_routes)
        .route("/version", get(streams::get_version))
        .layer(TraceLayer::new_for_http())
        // The gateway is called from a browser SPA on another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
