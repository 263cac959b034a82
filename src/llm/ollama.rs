use crate::llm::client::{LLMClient, LLMResponse, ModelParams};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Client for a local Ollama server (`/api/chat`, non-streaming).
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    params: ModelParams,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_http_client(
            reqwest::Client::new(),
            base_url.into(),
            model.into(),
            ModelParams::default(),
        )
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: String,
        model: String,
        params: ModelParams,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            params,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn connection_hint(&self) -> String {
        format!(
            "Cannot connect to Ollama at {}. Please make sure it's running with: 'ollama run {}'",
            self.base_url, self.model
        )
    }

    fn map_send_error(&self, err: reqwest::Error) -> AppError {
        if err.is_connect() {
            AppError::Connection(self.connection_hint())
        } else if err.is_timeout() {
            AppError::Connection(format!("Ollama at {} timed out: {}", self.base_url, err))
        } else {
            AppError::LLM(format!("Ollama request failed: {}", err))
        }
    }

    fn to_chat_messages(messages: &[(String, String)]) -> Vec<Value> {
        messages
            .iter()
            .map(|(role, content)| {
                let role = match role.as_str() {
                    "system" | "user" | "assistant" | "tool" => role.as_str(),
                    _ => "user",
                };
                json!({ "role": role, "content": content })
            })
            .collect()
    }

    fn to_ollama_tools(tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters
                    }
                })
            })
            .collect()
    }

    async fn chat(&self, messages: Vec<Value>, tools: Vec<Value>) -> Result<LLMResponse> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": self.params.temperature,
                "num_predict": self.params.max_tokens
            }
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools);
        }

        tracing::debug!(model = %self.model, "sending Ollama chat request");

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Ollama request failed ({}): {}",
                status, text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse Ollama response: {}", e)))?;

        parse_chat_response(&response_json)
    }
}

/// Parse a non-streaming `/api/chat` response body
pub(crate) fn parse_chat_response(json: &Value) -> Result<LLMResponse> {
    let message = json
        .get("message")
        .ok_or_else(|| AppError::LLM("No message in Ollama response".into()))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut tool_calls = Vec::new();
    let mut finish_reason = "stop".to_string();

    if let Some(tc_array) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for tc in tc_array {
            if let Some(func) = tc.get("function") {
                let name = func
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let arguments = func.get("arguments").cloned().unwrap_or(json!({}));

                tool_calls.push(ToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name,
                    arguments,
                });
            }
        }
        if !tool_calls.is_empty() {
            finish_reason = "tool_calls".to_string();
        }
    }

    if tool_calls.is_empty() {
        if let Some(reason) = json.get("done_reason").and_then(|v| v.as_str()) {
            finish_reason = reason.to_string();
        }
    }

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = vec![json!({ "role": "user", "content": prompt })];
        Ok(self.chat(messages, vec![]).await?.content)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let messages = vec![
            json!({ "role": "system", "content": system }),
            json!({ "role": "user", "content": prompt }),
        ];
        Ok(self.chat(messages, vec![]).await?.content)
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        Ok(self
            .chat(Self::to_chat_messages(messages), vec![])
            .await?
            .content)
    }

    async fn generate_with_tools(
        &self,
        messages: &[(String, String)],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        // Tool calling needs model support (e.g. llama3.1+); older models just answer in text
        self.chat(Self::to_chat_messages(messages), Self::to_ollama_tools(tools))
            .await
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/api/version", self.base_url))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, base_url = %self.base_url, "Ollama health check failed");
                AppError::Connection(self.connection_hint())
            })?;

        if !response.status().is_success() {
            return Err(AppError::Connection(format!(
                "Ollama at {} answered {} to a version probe",
                self.base_url,
                response.status()
            )));
        }

        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
