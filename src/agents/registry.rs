//! Agent Registry for managing configurable agents
//!
//! Turns `[agents.*]` entries into ready-to-run [`ConfigurableAgent`]s.

use crate::agents::configurable::ConfigurableAgent;
use crate::llm::LLMClientFactoryTrait;
use crate::tools::registry::ToolRegistry;
use crate::types::{AppError, Result};
use crate::utils::toml_config::{AgentConfig, RentScoutConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for managing agent configurations and creating agent instances
pub struct AgentRegistry {
    configs: HashMap<String, AgentConfig>,
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
    tool_registry: Arc<ToolRegistry>,
}

impl AgentRegistry {
    pub fn new(llm_factory: Arc<dyn LLMClientFactoryTrait>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            configs: HashMap::new(),
            llm_factory,
            tool_registry,
        }
    }

    /// Create an agent registry from TOML configuration
    pub fn from_config(
        config: &RentScoutConfig,
        llm_factory: Arc<dyn LLMClientFactoryTrait>,
        tool_registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            configs: config.agents.clone(),
            llm_factory,
            tool_registry,
        }
    }

    pub fn register(&mut self, name: &str, config: AgentConfig) {
        self.configs.insert(name.to_string(), config);
    }

    pub fn get_config(&self, name: &str) -> Option<&AgentConfig> {
        self.configs.get(name)
    }

    /// Agent names, sorted
    pub fn agent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.configs.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// Create an agent instance by name
    pub async fn create_agent(&self, name: &str) -> Result<ConfigurableAgent> {
        let config = self.get_config(name).ok_or_else(|| {
            AppError::Configuration(format!("Agent '{}' not found in configuration", name))
        })?;

        self.create_agent_from_config(name, config).await
    }

    /// Create an agent instance from an explicit configuration
    pub async fn create_agent_from_config(
        &self,
        name: &str,
        config: &AgentConfig,
    ) -> Result<ConfigurableAgent> {
        let llm = self.llm_factory.create_for_model(&config.model).await?;

        let agent_tool_registry = if config.tools.is_empty() {
            None
        } else {
            Some(Arc::clone(&self.tool_registry))
        };

        Ok(ConfigurableAgent::new(name, config, llm, agent_tool_registry))
    }
}
