//! LLM Client abstractions and provider management
//!
//! This module provides a unified "prompt in, text out" interface over:
//! - **Ollama**: local inference through the Ollama HTTP API
//! - **Gemini**: hosted inference through the Generative Language API (API key)

use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use crate::utils::toml_config::{ModelConfig, ProviderConfig};
use async_trait::async_trait;
use std::time::Duration;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate with conversation history
    async fn generate_with_history(
        &self,
        messages: &[(String, String)], // (role, content) pairs
    ) -> Result<String>;

    /// Generate with tool calling support
    async fn generate_with_tools(
        &self,
        messages: &[(String, String)],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;

    /// Check that the backend is reachable before doing real work
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from an LLM generation request
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

impl LLMResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }
    }
}

/// Sampling parameters forwarded to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl From<&ModelConfig> for ModelParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama2".to_string(),
    ///     params: ModelParams::default(),
    /// };
    /// ```
    Ollama {
        base_url: String,
        model: String,
        params: ModelParams,
    },

    /// Google Gemini through the Generative Language API
    Gemini {
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    },
}

impl Provider {
    /// Resolve a provider from a model entry and the provider it references.
    ///
    /// Gemini API keys are looked up in the environment here, so a missing
    /// key only affects models that use Gemini.
    pub fn from_model_config(model: &ModelConfig, provider: &ProviderConfig) -> Result<Self> {
        let params = ModelParams::from(model);

        match provider {
            ProviderConfig::Ollama { base_url, .. } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.model.clone(),
                params,
            }),
            ProviderConfig::Gemini {
                api_key_env,
                api_base,
                ..
            } => {
                let api_key = std::env::var(api_key_env)
                    .ok()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        AppError::Configuration(format!(
                            "Environment variable '{}' is not set; it is required for Gemini model '{}'",
                            api_key_env, model.model
                        ))
                    })?;

                Ok(Provider::Gemini {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.model.clone(),
                    params,
                })
            }
        }
    }

    /// Create a client instance for this provider
    pub fn create_client(&self, timeout: Duration) -> Result<Box<dyn LLMClient>> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        match self {
            Provider::Ollama {
                base_url,
                model,
                params,
            } => Ok(Box::new(super::ollama::OllamaClient::with_http_client(
                http,
                base_url.clone(),
                model.clone(),
                params.clone(),
            ))),

            Provider::Gemini {
                api_key,
                api_base,
                model,
                params,
            } => Ok(Box::new(super::gemini::GeminiClient::with_http_client(
                http,
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                params.clone(),
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "Ollama",
            Provider::Gemini { .. } => "Gemini",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Ollama { model, .. } | Provider::Gemini { model, .. } => model,
        }
    }
}

/// Creates clients for named models from `[models]`.
///
/// The application holds this behind an `Arc<dyn ...>` so tests can swap in
/// a factory that hands out scripted clients.
#[async_trait]
pub trait LLMClientFactoryTrait: Send + Sync {
    async fn create_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>>;
}
