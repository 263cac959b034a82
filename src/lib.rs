//! # rentscout
//!
//! Builds car-rental search links for a route and date range, asks a language
//! model to narrate plausible offers for that search, and serves both through
//! a small web form. A second entry point runs a configurable sequential
//! agent pipeline ("search" then "summarize") over the same tools.
//!
//! The link builder is the only deterministic part. Everything the model
//! writes is illustrative text with no factual guarantee; no rental API is
//! ever called.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust
//! use rentscout::search::kayak_search;
//!
//! let url = kayak_search("Miami", "2024-06-01", "2024-06-05");
//! assert_eq!(url, "https://www.kayak.com/cars/miami/2024-06-01/2024-06-05?sort=price_a");
//! ```
//!
//! ### Configuration-Driven Setup
//!
//! ```rust,ignore
//! use rentscout::{AppState, ConfigManager};
//!
//! let config_manager = ConfigManager::new("rentscout.toml")?;
//! let state = AppState::new(config_manager);
//! let app = rentscout::api::routes::create_router(state.clone());
//! ```
//!
//! ## Modules
//!
//! - [`search`] - Link builder and search query validation
//! - [`advisor`] - Prompt, model call and report for one search
//! - [`llm`] - Ollama and Gemini clients
//! - [`tools`] - Tools available to pipeline agents
//! - [`agents`] - Config-driven agents with a tool loop
//! - [`workflows`] - Sequential task pipelines
//! - [`api`] - HTML form and JSON endpoints
//! - [`cli`] - Command-line interface
//! - [`types`] - Shared request/response types and errors
//! - [`utils`] - `rentscout.toml` loading and hot reload

/// Rental advisor (prompt, model call, report).
pub mod advisor;
/// Config-driven agents.
pub mod agents;
/// HTTP handlers, views and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Search link construction.
pub mod search;
/// Built-in agent tools.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Sequential workflow engine.
pub mod workflows;

pub use advisor::RentalAdvisor;
pub use agents::{AgentRegistry, ConfigurableAgent};
pub use llm::{
    ConfigBasedLLMFactory, LLMClient, LLMClientFactoryTrait, LLMResponse, Provider,
    ProviderRegistry,
};
pub use search::{kayak_search, SearchQuery, SearchUrlBuilder};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, RentScoutConfig};
pub use workflows::{TaskInputs, WorkflowEngine, WorkflowOutput};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// `rentscout.toml` with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Creates LLM clients for named models
    pub llm_factory: Arc<dyn LLMClientFactoryTrait>,
}

impl AppState {
    /// State whose LLM clients follow the live configuration
    pub fn new(config_manager: ConfigManager) -> Self {
        let config_manager = Arc::new(config_manager);
        let llm_factory = Arc::new(ConfigBasedLLMFactory::new(Arc::clone(&config_manager)));

        Self {
            config_manager,
            llm_factory,
        }
    }

    /// State with a custom client factory (used by tests)
    pub fn with_llm_factory(
        config_manager: ConfigManager,
        llm_factory: Arc<dyn LLMClientFactoryTrait>,
    ) -> Self {
        Self {
            config_manager: Arc::new(config_manager),
            llm_factory,
        }
    }

    pub fn advisor(&self) -> RentalAdvisor {
        RentalAdvisor::new(Arc::clone(&self.llm_factory))
    }

    /// Workflow engine over a snapshot of the current configuration
    pub fn workflow_engine(&self) -> Result<WorkflowEngine> {
        let config = self.config_manager.config();
        let tool_registry = Arc::new(ToolRegistry::from_config(&config)?);
        let agent_registry =
            AgentRegistry::from_config(&config, Arc::clone(&self.llm_factory), tool_registry);

        Ok(WorkflowEngine::new(config, agent_registry))
    }
}
