//! Workflow Engine
//!
//! Runs a configured workflow: its tasks execute one after another, each task
//! handled by the agent it names, each seeing the previous task's output.

use crate::agents::{Agent, AgentRegistry, ToolCallRecord};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{RentScoutConfig, TaskConfig};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

/// Values substituted into task descriptions
#[derive(Debug, Clone)]
pub struct TaskInputs {
    pub request: String,
    pub current_year: i32,
}

impl TaskInputs {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            current_year: Utc::now().year(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Replace `{request}` and `{current_year}` in a task description
    pub fn interpolate(&self, template: &str) -> String {
        template
            .replace("{request}", &self.request)
            .replace("{current_year}", &self.current_year.to_string())
    }
}

/// Output from a workflow execution
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowOutput {
    pub run_id: String,
    pub workflow: String,
    /// The last task's output
    pub final_output: String,
    pub steps: Vec<TaskStep>,
}

/// A single task in the workflow execution
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskStep {
    pub task: String,
    pub agent: String,
    /// The full input handed to the agent
    pub input: String,
    pub output: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Unix timestamp when this step started
    pub timestamp: i64,
    pub duration_ms: u64,
}

/// Summary of a configured workflow, for listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowInfo {
    pub name: String,
    pub description: Option<String>,
    pub tasks: Vec<String>,
}

/// Workflow engine that runs configured task pipelines
pub struct WorkflowEngine {
    config: Arc<RentScoutConfig>,
    agent_registry: AgentRegistry,
}

impl WorkflowEngine {
    pub fn new(config: Arc<RentScoutConfig>, agent_registry: AgentRegistry) -> Self {
        Self {
            config,
            agent_registry,
        }
    }

    /// Configured workflows, sorted by name
    pub fn list_workflows(&self) -> Vec<WorkflowInfo> {
        list_workflows(&self.config)
    }

    /// Input for one task: the interpolated description, the expected output
    /// if any, and the previous task's result as context.
    fn task_input(task: &TaskConfig, inputs: &TaskInputs, previous: Option<&str>) -> String {
        let mut input = inputs.interpolate(task.description.trim());

        if let Some(expected) = task.expected_output.as_deref() {
            input.push_str("\n\nExpected output: ");
            input.push_str(&inputs.interpolate(expected.trim()));
        }

        if let Some(previous) = previous {
            input.push_str("\n\nContext from the previous task:\n");
            input.push_str(previous);
        }

        input
    }

    /// Execute a workflow by name
    ///
    /// Tasks run strictly in order. The first failing task aborts the run.
    pub async fn execute_workflow(
        &self,
        workflow_name: &str,
        inputs: &TaskInputs,
    ) -> Result<WorkflowOutput> {
        let workflow = self.config.get_workflow(workflow_name).ok_or_else(|| {
            AppError::NotFound(format!(
                "Workflow '{}' not found in configuration",
                workflow_name
            ))
        })?;

        let run_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(%run_id, workflow = workflow_name, request = %inputs.request, "starting workflow");

        let mut steps: Vec<TaskStep> = Vec::with_capacity(workflow.tasks.len());

        for task_name in &workflow.tasks {
            let task = self.config.get_task(task_name).ok_or_else(|| {
                AppError::Configuration(format!(
                    "Task '{}' referenced by workflow '{}' does not exist",
                    task_name, workflow_name
                ))
            })?;

            let step_start = Instant::now();
            let timestamp = Utc::now().timestamp();

            let agent = self.agent_registry.create_agent(&task.agent).await?;
            let previous = steps.last().map(|s| s.output.as_str());
            let input = Self::task_input(task, inputs, previous);

            tracing::info!(%run_id, task = %task_name, agent = %task.agent, "running task");
            let output = agent.execute(&input).await.map_err(|e| {
                tracing::error!(%run_id, task = %task_name, error = %e, "task failed");
                e
            })?;

            steps.push(TaskStep {
                task: task_name.clone(),
                agent: agent.name().to_string(),
                input,
                output: output.content,
                tool_calls: output.tool_calls,
                timestamp,
                duration_ms: step_start.elapsed().as_millis() as u64,
            });
        }

        let final_output = steps
            .last()
            .map(|s| s.output.clone())
            .unwrap_or_default();

        tracing::info!(%run_id, steps = steps.len(), "workflow finished");

        Ok(WorkflowOutput {
            run_id,
            workflow: workflow_name.to_string(),
            final_output,
            steps,
        })
    }
}

/// Configured workflows, sorted by name
pub fn list_workflows(config: &RentScoutConfig) -> Vec<WorkflowInfo> {
    let mut workflows: Vec<WorkflowInfo> = config
        .workflows
        .iter()
        .map(|(name, wf)| WorkflowInfo {
            name: name.clone(),
            description: wf.description.clone(),
            tasks: wf.tasks.clone(),
        })
        .collect();
    workflows.sort_by(|a, b| a.name.cmp(&b.name));
    workflows
}
