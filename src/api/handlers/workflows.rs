//! Workflow execution handlers
//!
//! Runs the sequential pipelines defined in `rentscout.toml`.

use crate::{
    types::{AppError, Result, WorkflowRequest},
    workflows::{list_workflows as configured_workflows, TaskInputs, WorkflowInfo, WorkflowOutput},
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};

/// Execute a workflow by name
///
/// Each task's output is handed to the next task as context; the last
/// task's output becomes `final_output`.
#[utoipa::path(
    post,
    path = "/api/workflows/{workflow_name}",
    request_body = WorkflowRequest,
    responses(
        (status = 200, description = "Workflow executed successfully", body = WorkflowOutput),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Workflow not found"),
        (status = 503, description = "Model provider unreachable")
    ),
    params(
        ("workflow_name" = String, Path, description = "Name of the workflow to execute")
    ),
    tag = "workflows"
)]
pub async fn execute_workflow(
    State(state): State<AppState>,
    Path(workflow_name): Path<String>,
    Json(payload): Json<WorkflowRequest>,
) -> Result<Json<WorkflowOutput>> {
    if payload.request.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Request must not be empty".to_string(),
        ));
    }

    let engine = state.workflow_engine()?;

    let mut inputs = TaskInputs::new(payload.request);
    if let Some(year) = payload.current_year {
        inputs = inputs.with_year(year);
    }

    let output = engine.execute_workflow(&workflow_name, &inputs).await?;

    Ok(Json(output))
}

/// List available workflows
#[utoipa::path(
    get,
    path = "/api/workflows",
    responses(
        (status = 200, description = "List of available workflows", body = Vec<WorkflowInfo>)
    ),
    tag = "workflows"
)]
pub async fn list_workflows(State(state): State<AppState>) -> Json<Vec<WorkflowInfo>> {
    let config = state.config_manager.config();
    Json(configured_workflows(&config))
}
