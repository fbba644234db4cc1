use crate::models::AppState;
use axum::{http::header, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod appointment_routes;
pub mod dentist_routes;
pub mod health_routes;
pub mod patient_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(patient_routes::router())
        .merge(dentist_routes::router())
        .merge(appointment_routes::router())
        .merge(health_routes::router())
        .with_state(state)
}

/// The served application: routes plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    // Browser frontends are served from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
