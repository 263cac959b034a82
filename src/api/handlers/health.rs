use crate::{types::HealthResponse, AppState};
use axum::{extract::State, Json};

/// Service health, including whether the advisor model answers
///
/// Always 200 while the server runs; an unreachable model shows up in
/// `llm_reachable` and `llm_error`.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config_manager.config();
    let model = config.advisor.model.clone();

    let check = match state.llm_factory.create_for_model(&model).await {
        Ok(client) => client.health_check().await,
        Err(e) => Err(e),
    };

    let (llm_reachable, llm_error) = match check {
        Ok(()) => (true, None),
        Err(e) => {
            tracing::warn!(model = %model, error = %e, "health check failed");
            (false, Some(e.user_message().to_string()))
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_model: model,
        llm_reachable,
        llm_error,
    })
}
