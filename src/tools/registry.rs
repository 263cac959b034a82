use crate::search::url::SearchUrlBuilder;
use crate::types::{AppError, Result, ToolDefinition};
use crate::utils::toml_config::{RentScoutConfig, ToolConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<Value>;
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    configs: HashMap<String, ToolConfig>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            configs: HashMap::new(),
        }
    }

    /// Registry with the built-in tools (search link, page fetch)
    pub fn with_default_tools(builder: SearchUrlBuilder) -> Result<Self> {
        let mut registry = Self::new();

        registry.register(Arc::new(crate::tools::kayak::KayakSearchTool::new(builder)));
        registry.register(Arc::new(crate::tools::fetch::FetchPageTool::new(
            Duration::from_secs(30),
            crate::tools::fetch::DEFAULT_MAX_CHARS,
        )?));

        Ok(registry)
    }

    /// Built-in tools configured from `[search]` and `[tools]`
    pub fn from_config(config: &RentScoutConfig) -> Result<Self> {
        let mut registry = Self::new();

        registry.register(Arc::new(crate::tools::kayak::KayakSearchTool::new(
            SearchUrlBuilder::from_config(&config.search),
        )));

        let fetch_config = config.tools.get("fetch_page").cloned().unwrap_or_default();
        let max_chars = fetch_config
            .extra
            .get("max_chars")
            .and_then(|v| v.as_integer())
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(crate::tools::fetch::DEFAULT_MAX_CHARS);
        registry.register(Arc::new(crate::tools::fetch::FetchPageTool::new(
            Duration::from_secs(fetch_config.timeout_secs),
            max_chars,
        )?));

        Ok(registry.with_config(config.tools.clone()))
    }

    /// Apply per-tool settings (enabled flag, description override, timeout)
    pub fn with_config(mut self, configs: HashMap<String, ToolConfig>) -> Self {
        self.configs = configs;
        self
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Registered and not switched off in config
    pub fn is_enabled(&self, name: &str) -> bool {
        self.tools.contains_key(name)
            && self.configs.get(name).map(|c| c.enabled).unwrap_or(true)
    }

    fn definition(&self, tool: &Arc<dyn Tool>) -> ToolDefinition {
        let description = self
            .configs
            .get(tool.name())
            .and_then(|c| c.description.clone())
            .unwrap_or_else(|| tool.description().to_string());

        ToolDefinition {
            name: tool.name().to_string(),
            description,
            parameters: tool.parameters_schema(),
        }
    }

    /// Definitions for every enabled tool, sorted by name
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .filter(|tool| self.is_enabled(tool.name()))
            .map(|tool| self.definition(tool))
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Definitions for the named tools that are registered and enabled
    pub fn get_tool_definitions_for(&self, names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter(|name| self.is_enabled(name))
            .filter_map(|name| self.tools.get(*name))
            .map(|tool| self.definition(tool))
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AppError::NotFound(format!("Tool not found: {}", name)))?;

        if !self.is_enabled(name) {
            return Err(AppError::Tool(format!("Tool '{}' is disabled", name)));
        }

        let timeout = Duration::from_secs(
            self.configs
                .get(name)
                .map(|c| c.timeout_secs)
                .unwrap_or(30),
        );

        match tokio::time::timeout(timeout, tool.execute(args)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Tool(format!(
                "Tool '{}' timed out after {}s",
                name,
                timeout.as_secs()
            ))),
        }
    }

    /// Registered tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "Never finishes in time"
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn execute(&self, _args: Value) -> Result<Value> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(json!({}))
        }
    }

    fn disabled(description: Option<&str>) -> ToolConfig {
        ToolConfig {
            enabled: false,
            description: description.map(String::from),
            ..ToolConfig::default()
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = ToolRegistry::new();
        assert!(registry.tool_names().is_empty());
    }

    #[test]
    fn test_registry_with_default_tools() {
        let registry = ToolRegistry::with_default_tools(SearchUrlBuilder::default()).unwrap();
        assert_eq!(registry.tool_names(), vec!["fetch_page", "kayak_search"]);
        assert!(registry.is_enabled("kayak_search"));
        assert!(!registry.is_enabled("calculator"));
    }

    #[test]
    fn test_get_tool_definitions() {
        let registry = ToolRegistry::with_default_tools(SearchUrlBuilder::default()).unwrap();
        let definitions = registry.get_tool_definitions();

        assert_eq!(definitions.len(), 2);
        for def in &definitions {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert!(def.parameters.is_object());
        }
    }

    #[test]
    fn test_disabled_tools_are_hidden() {
        let mut configs = HashMap::new();
        configs.insert("fetch_page".to_string(), disabled(None));
        let registry = ToolRegistry::with_default_tools(SearchUrlBuilder::default())
            .unwrap()
            .with_config(configs);

        let names: Vec<String> = registry
            .get_tool_definitions_for(&["kayak_search", "fetch_page", "unknown"])
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["kayak_search"]);
    }

    #[test]
    fn test_description_override() {
        let mut configs = HashMap::new();
        configs.insert(
            "kayak_search".to_string(),
            ToolConfig {
                description: Some("Build the Kayak link".to_string()),
                ..ToolConfig::default()
            },
        );
        let registry = ToolRegistry::with_default_tools(SearchUrlBuilder::default())
            .unwrap()
            .with_config(configs);

        let defs = registry.get_tool_definitions_for(&["kayak_search"]);
        assert_eq!(defs[0].description, "Build the Kayak link");
    }

    #[tokio::test]
    async fn test_execute_kayak_search() {
        let registry = ToolRegistry::with_default_tools(SearchUrlBuilder::default()).unwrap();
        let value = registry
            .execute(
                "kayak_search",
                json!({ "loc": "Miami", "pickup": "2024-06-01", "dropoff": "2024-06-05" }),
            )
            .await
            .unwrap();
        assert_eq!(
            value["url"],
            "https://www.kayak.com/cars/miami/2024-06-01/2024-06-05?sort=price_a"
        );
    }

    #[tokio::test]
    async fn test_nonexistent_tool() {
        let registry = ToolRegistry::with_default_tools(SearchUrlBuilder::default()).unwrap();
        let result = registry.execute("nonexistent_tool", json!({})).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_disabled_tool_refuses_execution() {
        let mut configs = HashMap::new();
        configs.insert("kayak_search".to_string(), disabled(None));
        let registry = ToolRegistry::with_default_tools(SearchUrlBuilder::default())
            .unwrap()
            .with_config(configs);

        let result = registry.execute("kayak_search", json!({})).await;
        assert!(matches!(result, Err(AppError::Tool(_))));
    }

    #[tokio::test]
    async fn test_execute_times_out() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SlowTool));
        let mut configs = HashMap::new();
        configs.insert(
            "slow".to_string(),
            ToolConfig {
                timeout_secs: 1,
                ..ToolConfig::default()
            },
        );
        let registry = registry.with_config(configs);

        let err = registry.execute("slow", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
