//! LLM Provider Clients and Abstractions
//!
//! Everything that talks to a language model goes through [`LLMClient`].
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`LLMClientFactoryTrait`] - Creates clients for named models
//! - [`ProviderRegistry`] - Config-backed factory over `[providers]` and `[models]`
//! - [`ConfigBasedLLMFactory`] - Same, but always reads the hot-reloaded config
//!
//! # Supported Providers
//!
//! - `ollama` - Local Ollama server
//! - `gemini` - Google Generative Language API
//!
//! # Example
//!
//! ```ignore
//! use rentscout::llm::ProviderRegistry;
//!
//! let registry = ProviderRegistry::from_config(&config);
//! let client = registry.create_client_for_model("default")?;
//! client.health_check().await?;
//! let text = client.generate("Find car rentals in Miami").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Google Gemini client.
pub mod gemini;
/// Ollama client.
pub mod ollama;
/// Registry for managing multiple LLM provider instances.
pub mod provider_registry;

pub use client::{LLMClient, LLMClientFactoryTrait, LLMResponse, ModelParams, Provider};
pub use provider_registry::{ConfigBasedLLMFactory, ProviderRegistry};
