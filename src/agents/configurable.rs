//! Configurable Agent implementation
//!
//! An agent is a persona (role, goal, backstory) bound to a model and a set
//! of tools, all read from `[agents.*]` in `rentscout.toml`.

use crate::agents::{Agent, AgentOutput, ToolCallRecord};
use crate::llm::LLMClient;
use crate::tools::registry::ToolRegistry;
use crate::types::{Result, ToolCall, ToolDefinition};
use crate::utils::toml_config::AgentConfig;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

/// Sent when the tool budget is spent and the model still wants more calls
const FINAL_ANSWER_NUDGE: &str =
    "You have used all available tool calls. Give your final answer now using what you already have.";

/// A configurable agent that derives its behavior from TOML configuration
pub struct ConfigurableAgent {
    name: String,
    role: String,
    llm: Box<dyn LLMClient>,
    system_prompt: String,
    tool_registry: Option<Arc<ToolRegistry>>,
    allowed_tools: Vec<String>,
    max_tool_iterations: usize,
    verbose: bool,
}

impl ConfigurableAgent {
    /// Create a new configurable agent from TOML config
    ///
    /// # Arguments
    ///
    /// * `name` - The agent's key under `[agents]`
    /// * `config` - The agent configuration
    /// * `llm` - The LLM client (already created from the model config)
    /// * `tool_registry` - Optional tool registry for tool calling
    pub fn new(
        name: &str,
        config: &AgentConfig,
        llm: Box<dyn LLMClient>,
        tool_registry: Option<Arc<ToolRegistry>>,
    ) -> Self {
        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| Self::persona_prompt(config));

        Self {
            name: name.to_string(),
            role: config.role.clone(),
            llm,
            system_prompt,
            tool_registry,
            allowed_tools: config.tools.clone(),
            max_tool_iterations: config.max_tool_iterations,
            verbose: config.verbose,
        }
    }

    /// System prompt assembled from role, goal and backstory
    fn persona_prompt(config: &AgentConfig) -> String {
        let mut prompt = format!("You are a {}.\nYour goal: {}", config.role, config.goal);
        if let Some(backstory) = config.backstory.as_deref().filter(|b| !b.trim().is_empty()) {
            prompt.push_str("\nBackground: ");
            prompt.push_str(backstory.trim());
        }
        if !config.tools.is_empty() {
            prompt.push_str(
                "\nUse the tools you are given when they help; never invent tool results.",
            );
        }
        prompt
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }

    /// Check if this agent has tools configured
    pub fn has_tools(&self) -> bool {
        !self.allowed_tools.is_empty() && self.tool_registry.is_some()
    }

    pub fn allowed_tools(&self) -> &[String] {
        &self.allowed_tools
    }

    /// Tool definitions for this agent's allowed, enabled tools
    pub fn get_filtered_tool_definitions(&self) -> Vec<ToolDefinition> {
        match &self.tool_registry {
            Some(registry) => {
                let allowed: Vec<&str> = self.allowed_tools.iter().map(|s| s.as_str()).collect();
                registry.get_tool_definitions_for(&allowed)
            }
            None => Vec::new(),
        }
    }

    /// Check if a specific tool is allowed for this agent
    pub fn can_use_tool(&self, tool_name: &str) -> bool {
        self.allowed_tools.iter().any(|t| t == tool_name)
            && self
                .tool_registry
                .as_ref()
                .map(|r| r.is_enabled(tool_name))
                .unwrap_or(false)
    }

    fn log_step(&self, message: &str) {
        if self.verbose {
            tracing::info!(agent = %self.name, "{}", message);
        } else {
            tracing::debug!(agent = %self.name, "{}", message);
        }
    }

    /// Run one tool call. Failures are returned to the model as `{"error": ...}`.
    async fn run_tool(&self, call: &ToolCall) -> ToolCallRecord {
        let start = Instant::now();

        let outcome = match &self.tool_registry {
            Some(registry) if self.can_use_tool(&call.name) => registry
                .execute(&call.name, call.arguments.clone())
                .await
                .map_err(|e| e.user_message().to_string()),
            _ => Err(format!(
                "Tool '{}' is not available to this agent. Available tools: {}",
                call.name,
                self.allowed_tools.join(", ")
            )),
        };

        let (result, success) = match outcome {
            Ok(value) => (value, true),
            Err(message) => {
                tracing::warn!(agent = %self.name, tool = %call.name, error = %message, "tool call failed");
                (json!({ "error": message }), false)
            }
        };

        ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
            success,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn describe_calls(calls: &[ToolCall]) -> String {
        calls
            .iter()
            .map(|c| format!("Calling tool {} with {}", c.name, c.arguments))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Agent for ConfigurableAgent {
    async fn execute(&self, input: &str) -> Result<AgentOutput> {
        let mut messages = vec![
            ("system".to_string(), self.system_prompt.clone()),
            ("user".to_string(), input.to_string()),
        ];

        let tools = self.get_filtered_tool_definitions();
        if tools.is_empty() {
            self.log_step("generating without tools");
            let content = self.llm.generate_with_history(&messages).await?;
            return Ok(AgentOutput {
                content,
                tool_calls: Vec::new(),
                iterations: 1,
                finish_reason: "stop".to_string(),
            });
        }

        let mut records = Vec::new();

        for iteration in 0..self.max_tool_iterations {
            let response = self.llm.generate_with_tools(&messages, &tools).await?;

            if response.tool_calls.is_empty() {
                self.log_step(&format!("finished after {} iteration(s)", iteration + 1));
                return Ok(AgentOutput {
                    content: response.content,
                    tool_calls: records,
                    iterations: iteration + 1,
                    finish_reason: response.finish_reason,
                });
            }

            let assistant_text = if response.content.trim().is_empty() {
                Self::describe_calls(&response.tool_calls)
            } else {
                format!(
                    "{}\n{}",
                    response.content,
                    Self::describe_calls(&response.tool_calls)
                )
            };
            messages.push(("assistant".to_string(), assistant_text));

            for call in &response.tool_calls {
                self.log_step(&format!("calling tool {} with {}", call.name, call.arguments));
                let record = self.run_tool(call).await;
                messages.push((
                    "tool".to_string(),
                    format!("Result of {}: {}", record.name, record.result),
                ));
                records.push(record);
            }
        }

        self.log_step("tool budget exhausted, asking for a final answer");
        messages.push(("user".to_string(), FINAL_ANSWER_NUDGE.to_string()));
        let content = self.llm.generate_with_history(&messages).await?;

        Ok(AgentOutput {
            content,
            tool_calls: records,
            iterations: self.max_tool_iterations + 1,
            finish_reason: "max_iterations".to_string(),
        })
    }

    fn system_prompt(&self) -> String {
        self.system_prompt.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMResponse;
    use crate::search::SearchUrlBuilder;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays canned responses and records every transcript it was given
    struct ScriptedLLM {
        responses: Mutex<VecDeque<LLMResponse>>,
        transcripts: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    }

    impl ScriptedLLM {
        fn new(responses: Vec<LLMResponse>) -> (Self, Arc<Mutex<Vec<Vec<(String, String)>>>>) {
            let transcripts = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    responses: Mutex::new(responses.into()),
                    transcripts: Arc::clone(&transcripts),
                },
                transcripts,
            )
        }

        fn next(&self, messages: &[(String, String)]) -> LLMResponse {
            self.transcripts.lock().push(messages.to_vec());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| LLMResponse::text("out of script"))
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedLLM {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(self.next(&[("user".to_string(), prompt.to_string())]).content)
        }
        async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            Ok(self
                .next(&[
                    ("system".to_string(), system.to_string()),
                    ("user".to_string(), prompt.to_string()),
                ])
                .content)
        }
        async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
            Ok(self.next(messages).content)
        }
        async fn generate_with_tools(
            &self,
            messages: &[(String, String)],
            _tools: &[ToolDefinition],
        ) -> Result<LLMResponse> {
            Ok(self.next(messages))
        }
        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn config(tools: &[&str]) -> AgentConfig {
        AgentConfig {
            model: "default".to_string(),
            role: "Car Rentals Expert".to_string(),
            goal: "Search and analyze car rental options".to_string(),
            backstory: Some(
                "I am an expert at finding the best car rental deals and analyzing options."
                    .to_string(),
            ),
            system_prompt: None,
            tools: tools.iter().map(|t| t.to_string()).collect(),
            max_tool_iterations: 2,
            verbose: false,
        }
    }

    fn tool_call(name: &str, arguments: serde_json::Value) -> LLMResponse {
        LLMResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call-1".to_string(),
                name: name.to_string(),
                arguments,
            }],
            finish_reason: "tool_calls".to_string(),
        }
    }

    fn registry() -> Option<Arc<ToolRegistry>> {
        Some(Arc::new(
            ToolRegistry::with_default_tools(SearchUrlBuilder::default()).unwrap(),
        ))
    }

    #[test]
    fn test_persona_prompt() {
        let prompt = ConfigurableAgent::persona_prompt(&config(&[]));
        assert!(prompt.starts_with("You are a Car Rentals Expert.\nYour goal: Search and analyze"));
        assert!(prompt.contains("Background: I am an expert"));
        assert!(!prompt.contains("tools"));
    }

    #[test]
    fn test_explicit_system_prompt_wins() {
        let mut cfg = config(&[]);
        cfg.system_prompt = Some("Only answer in haiku.".to_string());
        let (llm, _) = ScriptedLLM::new(vec![]);
        let agent = ConfigurableAgent::new("cars", &cfg, Box::new(llm), None);
        assert_eq!(agent.system_prompt(), "Only answer in haiku.");
    }

    #[test]
    fn test_has_tools_requires_both_config_and_registry() {
        let (llm, _) = ScriptedLLM::new(vec![]);
        let agent = ConfigurableAgent::new("cars", &config(&["kayak_search"]), Box::new(llm), None);
        assert!(!agent.has_tools());
        assert!(!agent.can_use_tool("kayak_search"));

        let (llm, _) = ScriptedLLM::new(vec![]);
        let agent = ConfigurableAgent::new("summary", &config(&[]), Box::new(llm), registry());
        assert!(!agent.has_tools());
        assert!(!agent.can_use_tool("kayak_search"));
    }

    #[tokio::test]
    async fn test_plain_generation_without_tools() {
        let (llm, transcripts) = ScriptedLLM::new(vec![LLMResponse::text("A clear summary")]);
        let agent = ConfigurableAgent::new("summary", &config(&[]), Box::new(llm), None);

        let output = agent.execute("Summarize the options").await.unwrap();
        assert_eq!(output.content, "A clear summary");
        assert!(output.tool_calls.is_empty());

        let transcripts = transcripts.lock();
        assert_eq!(transcripts[0][0].0, "system");
        assert_eq!(transcripts[0][1], ("user".to_string(), "Summarize the options".to_string()));
    }

    #[tokio::test]
    async fn test_tool_loop_feeds_results_back() {
        let (llm, transcripts) = ScriptedLLM::new(vec![
            tool_call(
                "kayak_search",
                json!({ "loc": "Miami", "pickup": "2024-06-01", "dropoff": "2024-06-05" }),
            ),
            LLMResponse::text("Top 5 options in Miami"),
        ]);
        let agent =
            ConfigurableAgent::new("cars", &config(&["kayak_search"]), Box::new(llm), registry());

        let output = agent.execute("car rental in Miami").await.unwrap();

        assert_eq!(output.content, "Top 5 options in Miami");
        assert_eq!(output.iterations, 2);
        assert_eq!(output.tool_calls.len(), 1);
        assert!(output.tool_calls[0].success);
        assert_eq!(
            output.tool_calls[0].result["url"],
            "https://www.kayak.com/cars/miami/2024-06-01/2024-06-05?sort=price_a"
        );

        let transcripts = transcripts.lock();
        let second = &transcripts[1];
        assert_eq!(second[2].0, "assistant");
        assert_eq!(second[3].0, "tool");
        assert!(second[3].1.contains("miami/2024-06-01/2024-06-05"));
    }

    #[tokio::test]
    async fn test_disallowed_tool_is_reported_not_fatal() {
        let (llm, transcripts) = ScriptedLLM::new(vec![
            tool_call("fetch_page", json!({ "url": "https://www.kayak.com" })),
            LLMResponse::text("Answer without fetching"),
        ]);
        let agent =
            ConfigurableAgent::new("cars", &config(&["kayak_search"]), Box::new(llm), registry());

        let output = agent.execute("car rental in Miami").await.unwrap();

        assert_eq!(output.content, "Answer without fetching");
        assert!(!output.tool_calls[0].success);
        assert!(transcripts.lock()[1][3].1.contains("not available to this agent"));
    }

    #[tokio::test]
    async fn test_tool_budget_exhaustion_forces_answer() {
        let call = || tool_call("kayak_search", json!({ "loc": "Miami" }));
        let (llm, transcripts) = ScriptedLLM::new(vec![
            call(),
            call(),
            LLMResponse::text("Best effort answer"),
        ]);
        let agent =
            ConfigurableAgent::new("cars", &config(&["kayak_search"]), Box::new(llm), registry());

        let output = agent.execute("car rental in Miami").await.unwrap();

        assert_eq!(output.content, "Best effort answer");
        assert_eq!(output.finish_reason, "max_iterations");
        assert_eq!(output.tool_calls.len(), 2);

        let transcripts = transcripts.lock();
        let last = transcripts.last().unwrap();
        assert_eq!(last.last().unwrap().1, FINAL_ANSWER_NUDGE);
    }
}
