//! Provider Registry for managing multiple LLM providers
//!
//! Resolves the `[models]` -> `[providers]` chain from `rentscout.toml` and
//! hands out ready-to-use clients.

use crate::llm::client::{LLMClient, LLMClientFactoryTrait, Provider};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ConfigManager, ModelConfig, ProviderConfig, RentScoutConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Registry for managing multiple named LLM providers
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderConfig>,
    models: HashMap<String, ModelConfig>,
    timeout: Duration,
}

impl ProviderRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: HashMap::new(),
            models: HashMap::new(),
            timeout,
        }
    }

    /// Create a provider registry from TOML configuration
    pub fn from_config(config: &RentScoutConfig) -> Self {
        Self {
            providers: config.providers.clone(),
            models: config.models.clone(),
            timeout: Duration::from_secs(config.server.request_timeout_secs),
        }
    }

    pub fn register_provider(&mut self, name: &str, config: ProviderConfig) {
        self.providers.insert(name.to_string(), config);
    }

    pub fn register_model(&mut self, name: &str, config: ModelConfig) {
        self.models.insert(name.to_string(), config);
    }

    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Model names, sorted
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Resolve a model name to its provider without creating a client
    pub fn resolve(&self, model_name: &str) -> Result<Provider> {
        let model_config = self.get_model(model_name).ok_or_else(|| {
            AppError::Configuration(format!("Model '{}' not found in configuration", model_name))
        })?;

        let provider_config = self.get_provider(&model_config.provider).ok_or_else(|| {
            AppError::Configuration(format!(
                "Provider '{}' referenced by model '{}' not found",
                model_config.provider, model_name
            ))
        })?;

        Provider::from_model_config(model_config, provider_config)
    }

    /// Create an LLM client for a specific model by name
    pub fn create_client_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>> {
        let provider = self.resolve(model_name)?;
        tracing::debug!(
            model = model_name,
            provider = provider.name(),
            "creating LLM client"
        );
        provider.create_client(self.timeout)
    }
}

#[async_trait]
impl LLMClientFactoryTrait for ProviderRegistry {
    async fn create_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>> {
        self.create_client_for_model(model_name)
    }
}

/// Factory that resolves models against the live, hot-reloaded configuration
pub struct ConfigBasedLLMFactory {
    config_manager: Arc<ConfigManager>,
}

impl ConfigBasedLLMFactory {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }
}

#[async_trait]
impl LLMClientFactoryTrait for ConfigBasedLLMFactory {
    async fn create_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>> {
        let config = self.config_manager.config();
        ProviderRegistry::from_config(&config).create_client_for_model(model_name)
    }
}
