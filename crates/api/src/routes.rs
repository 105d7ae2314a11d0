//! API route definitions

use crate::handlers;
use crate::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

/// Create the main application router
pub fn create_router(state: SharedState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/analyses", post(handlers::create_analysis))
        .route(
            "/analyses/{id}",
            get(handlers::get_analysis).delete(handlers::delete_analysis),
        )
        .route(
            "/services/{service_id}/analyses",
            get(handlers::list_analyses),
        )
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api/v1", api_routes).layer(
        ServiceBuilder::new()
            .layer(cors)
            .layer(CompressionLayer::new()),
    )
}
