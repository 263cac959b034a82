pub mod configurable;
pub mod registry;

use crate::types::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use configurable::ConfigurableAgent;
pub use registry::AgentRegistry;

/// One tool invocation made while an agent worked on a task
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: serde_json::Value,
    /// Tool output, or `{"error": ...}` when the call failed
    pub result: serde_json::Value,
    pub success: bool,
    pub duration_ms: u64,
}

/// What an agent produced for one input
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    /// LLM round-trips used
    pub iterations: usize,
    pub finish_reason: String,
}

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Work on the given input until the model gives a final answer
    async fn execute(&self, input: &str) -> Result<AgentOutput>;

    fn system_prompt(&self) -> String;

    fn name(&self) -> &str;
}
