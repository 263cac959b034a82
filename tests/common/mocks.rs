//! Mock implementations for testing.
//!
//! A scripted LLM client and a factory that hands out clones of it, so tests
//! run without any model server.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rentscout::llm::{LLMClient, LLMClientFactoryTrait, LLMResponse};
use rentscout::types::{AppError, Result, ToolCall, ToolDefinition};
use std::collections::VecDeque;
use std::sync::Arc;

/// How a mock client fails
#[derive(Clone, Copy, Debug)]
pub enum Failure {
    /// Health check and calls fail with `AppError::Connection`
    Unreachable,
    /// Calls fail with `AppError::LLM`
    Generation,
}

/// Mock LLM client with a queue of scripted tool-loop replies.
///
/// `generate*` always return `response`. `generate_with_tools` pops the next
/// scripted reply and falls back to `response` once the queue is empty.
/// Clones share the queue and the recorded prompts.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    script: Arc<Mutex<VecDeque<LLMResponse>>>,
    failure: Option<Failure>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            failure: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new("")
        }
    }

    /// Queue a reply that requests one tool call
    pub fn then_call_tool(self, name: &str, arguments: serde_json::Value) -> Self {
        let n = self.script.lock().len();
        self.script.lock().push_back(LLMResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: format!("call_{}", n),
                name: name.to_string(),
                arguments,
            }],
            finish_reason: "tool_calls".to_string(),
        });
        self
    }

    /// Queue a plain text reply
    pub fn then_reply(self, content: &str) -> Self {
        self.script.lock().push_back(LLMResponse::text(content));
        self
    }

    /// Every prompt or last message the client has seen, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn check(&self) -> Result<()> {
        match self.failure {
            Some(Failure::Unreachable) => Err(AppError::Connection(
                "Cannot connect to Ollama at http://localhost:11434. Please make sure it's running with: 'ollama run llama2'"
                    .to_string(),
            )),
            Some(Failure::Generation) => Err(AppError::LLM("model returned garbage".to_string())),
            None => Ok(()),
        }
    }

    fn record(&self, text: &str) {
        self.prompts.lock().push(text.to_string());
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(prompt);
        self.check()?;
        Ok(self.response.clone())
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        let last = messages.last().map(|(_, c)| c.as_str()).unwrap_or_default();
        self.generate(last).await
    }

    async fn generate_with_tools(
        &self,
        messages: &[(String, String)],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let last = messages.last().map(|(_, c)| c.as_str()).unwrap_or_default();
        self.record(last);
        self.check()?;

        let next = self.script.lock().pop_front();
        Ok(next.unwrap_or_else(|| LLMResponse::text(self.response.clone())))
    }

    async fn health_check(&self) -> Result<()> {
        match self.failure {
            Some(Failure::Unreachable) => self.check(),
            _ => Ok(()),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Factory that hands out clones of one mock client and remembers which
/// model names were asked for.
#[derive(Clone)]
pub struct MockLLMFactory {
    client: MockLLMClient,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockLLMFactory {
    pub fn new(client: MockLLMClient) -> Self {
        Self {
            client,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requested_models(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl LLMClientFactoryTrait for MockLLMFactory {
    async fn create_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>> {
        self.requested.lock().push(model_name.to_string());
        Ok(Box::new(self.client.clone()))
    }
}

/// Configuration used across integration tests: the two-agent rental crew
/// on a single Ollama model.
pub const TEST_CONFIG: &str = r#"
[advisor]
model = "default"

[providers.local]
type = "ollama"
base_url = "http://127.0.0.1:9"
default_model = "llama2"

[models.default]
provider = "local"
model = "llama2"

[tools.kayak_search]
enabled = true

[tools.fetch_page]
enabled = false

[agents.cars]
model = "default"
role = "Car Rentals Expert"
goal = "Search and analyze car rental options"
backstory = "I am an expert at finding the best car rental deals and analyzing options."
tools = ["kayak_search"]
max_tool_iterations = 3

[agents.summary]
model = "default"
role = "Summary Expert"
goal = "Provide clear and concise summaries of car rental options"

[tasks.search]
agent = "cars"
description = "Search car rentals according to criteria {request}. Current year: {current_year}"

[tasks.summarize]
agent = "summary"
description = "Create a clear summary of the rental options, highlighting the best deals"

[workflows.rental]
description = "Search, then summarize"
tasks = ["search", "summarize"]
"#;
