use crate::{handlers, AppState};
use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        // Service info
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))

        // Keyword pipeline
        .route("/api/search", post(handlers::search))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/insights", post(handlers::insights))
        .route("/api/sync", post(handlers::sync))

        // Notifications
        .route("/api/notify", post(handlers::notify))
        .route("/api/notify/summary", post(handlers::notify_summary))
        .route("/api/notify/multi", post(handlers::notify_multi))
        .route("/api/notify/validate", post(handlers::validate_chat))

        .with_state(state)

        // The last layer added runs first, so the id is set before tracing
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
