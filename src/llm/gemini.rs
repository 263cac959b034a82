//! Google Gemini client
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`).
//! The API key is sent in the `x-goog-api-key` header.

use crate::llm::client::{LLMClient, LLMResponse, ModelParams};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    params: ModelParams,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_http_client(
            reqwest::Client::new(),
            api_key.into(),
            api_base.into(),
            model.into(),
            ModelParams::default(),
        )
    }

    pub fn with_http_client(
        http: reqwest::Client,
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    ) -> Self {
        Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            params,
        }
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.api_base, self.model)
    }

    /// Split (role, content) pairs into a system instruction and Gemini `contents`.
    ///
    /// Gemini only knows `user` and `model`; tool results are sent back as
    /// user turns and consecutive turns of the same role are merged.
    fn build_contents(messages: &[(String, String)]) -> (Option<String>, Vec<Value>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut turns: Vec<(&'static str, String)> = Vec::new();

        for (role, content) in messages {
            let gemini_role = match role.as_str() {
                "system" => {
                    system_parts.push(content);
                    continue;
                }
                "assistant" | "model" => "model",
                _ => "user",
            };

            match turns.last_mut() {
                Some((last_role, text)) if *last_role == gemini_role => {
                    text.push_str("\n\n");
                    text.push_str(content);
                }
                _ => turns.push((gemini_role, content.clone())),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        let contents = turns
            .into_iter()
            .map(|(role, text)| json!({ "role": role, "parts": [{ "text": text }] }))
            .collect();

        (system, contents)
    }

    fn build_request(&self, messages: &[(String, String)], tools: &[ToolDefinition]) -> Value {
        let (system, contents) = Self::build_contents(messages);

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.params.temperature,
                "maxOutputTokens": self.params.max_tokens
            }
        });

        if let Some(system) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        body
    }

    async fn generate_content(
        &self,
        messages: &[(String, String)],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let body = self.build_request(messages, tools);

        tracing::debug!(model = %self.model, "sending Gemini generateContent request");

        let response = self
            .http
            .post(format!("{}:generateContent", self.model_url()))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AppError::Connection(format!("Cannot reach Gemini API: {}", e))
                } else {
                    AppError::LLM(format!("Gemini request failed: {}", e))
                }
            })?;

        let status = response.status();
        let response_json: Value = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse Gemini response: {}", e)))?;

        if !status.is_success() {
            let message = response_json
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(AppError::LLM(format!(
                "Gemini request failed ({}): {}",
                status, message
            )));
        }

        parse_generate_response(&response_json)
    }
}

/// Parse a `generateContent` response body
pub(crate) fn parse_generate_response(json: &Value) -> Result<LLMResponse> {
    let candidate = json
        .pointer("/candidates/0")
        .ok_or_else(|| AppError::LLM("Gemini returned no candidates".into()))?;

    let mut content = String::new();
    let mut tool_calls = Vec::new();

    if let Some(parts) = candidate.pointer("/content/parts").and_then(|v| v.as_array()) {
        for part in parts {
            if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                content.push_str(text);
            }
            if let Some(call) = part.get("functionCall") {
                tool_calls.push(ToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: call
                        .get("name")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                    arguments: call.get("args").cloned().unwrap_or(json!({})),
                });
            }
        }
    }

    let finish_reason = if !tool_calls.is_empty() {
        "tool_calls".to_string()
    } else {
        candidate
            .get("finishReason")
            .and_then(|v| v.as_str())
            .map(|r| r.to_lowercase())
            .unwrap_or_else(|| "stop".to_string())
    };

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = [("user".to_string(), prompt.to_string())];
        Ok(self.generate_content(&messages, &[]).await?.content)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let messages = [
            ("system".to_string(), system.to_string()),
            ("user".to_string(), prompt.to_string()),
        ];
        Ok(self.generate_content(&messages, &[]).await?.content)
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        Ok(self.generate_content(messages, &[]).await?.content)
    }

    async fn generate_with_tools(
        &self,
        messages: &[(String, String)],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.generate_content(messages, tools).await
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .http
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("Cannot reach Gemini API: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Connection(format!(
                "Gemini model '{}' is not available ({})",
                self.model,
                response.status()
            )));
        }

        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new("key", "https://generativelanguage.googleapis.com/", "gemini-pro")
    }

    #[test]
    fn test_model_url() {
        assert_eq!(
            client().model_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro"
        );
    }

    #[test]
    fn test_system_messages_become_instruction() {
        let (system, contents) = GeminiClient::build_contents(&[
            ("system".to_string(), "You are a Car Rentals Expert.".to_string()),
            ("user".to_string(), "Find cars in Miami".to_string()),
            ("assistant".to_string(), "Calling kayak_search".to_string()),
            ("tool".to_string(), "https://www.kayak.com/cars/miami".to_string()),
            ("user".to_string(), "Continue".to_string()),
        ]);

        assert_eq!(system.as_deref(), Some("You are a Car Rentals Expert."));
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"][0]["text"],
            "https://www.kayak.com/cars/miami\n\nContinue"
        );
    }

    #[test]
    fn test_request_includes_tools_and_generation_config() {
        let tools = vec![ToolDefinition {
            name: "kayak_search".to_string(),
            description: "Build a search link".to_string(),
            parameters: json!({ "type": "object" }),
        }];
        let body = client().build_request(&[("user".to_string(), "hi".to_string())], &tools);

        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "kayak_search"
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_text_and_function_call() {
        let json = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Looking that up." },
                        { "functionCall": { "name": "kayak_search", "args": { "loc": "Miami" } } }
                    ]
                },
                "finishReason": "STOP"
            }]
        });

        let response = parse_generate_response(&json).unwrap();
        assert_eq!(response.content, "Looking that up.");
        assert_eq!(response.tool_calls[0].name, "kayak_search");
        assert_eq!(response.finish_reason, "tool_calls");
    }

    #[test]
    fn test_parse_finish_reason_lowercased() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "done" }] },
                "finishReason": "MAX_TOKENS"
            }]
        });
        assert_eq!(parse_generate_response(&json).unwrap().finish_reason, "max_tokens");
    }

    #[test]
    fn test_parse_no_candidates() {
        assert!(parse_generate_response(&json!({ "candidates": [] })).is_err());
    }
}
