use crate::api::{handlers, ApiDoc};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Form submissions and workflow requests are small.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON routes, mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/search", post(handlers::search::search))
        .route("/url", post(handlers::search::search_url))
        .route("/workflows", get(handlers::workflows::list_workflows))
        .route(
            "/workflows/{workflow_name}",
            post(handlers::workflows::execute_workflow),
        )
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

/// The full application: HTML pages at the root, JSON under `/api`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/search", post(handlers::pages::submit))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
