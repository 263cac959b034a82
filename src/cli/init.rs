//! Init command implementation
//!
//! Scaffolds `rentscout.toml` and `.env.example` in a project directory.

use super::output::Output;
use std::fs;
use std::path::Path;

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (rentscout.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: std::path::PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider for the default model (ollama, gemini, or both)
    pub provider: String,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing rentscout project");

    if !matches!(config.provider.as_str(), "ollama" | "gemini" | "both") {
        let msg = format!(
            "Unknown provider '{}' (expected ollama, gemini, or both)",
            config.provider
        );
        output.error(&msg);
        return InitResult::Error(msg);
    }

    let base_path = &config.path;
    let config_path = base_path.join("rentscout.toml");
    if config_path.exists() && !config.force {
        output.warning("rentscout.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    output.subheader("Creating configuration files");

    let toml_content = generate_rentscout_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create rentscout.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "rentscout.toml");

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("env", ".env.example");
    }

    output.complete("rentscout project initialized successfully!");

    output.header("Next Steps");
    output.newline();
    let mut step = 1;
    if config.provider != "ollama" {
        output.info(&format!("{}. Set your Gemini API key:", step));
        output.command("cp .env.example .env");
        output.command("# Edit .env and set GEMINI_API_KEY");
        output.newline();
        step += 1;
    }

    if config.provider != "gemini" {
        output.info(&format!("{}. Start Ollama (if not running):", step));
        output.command("ollama run llama2");
        output.newline();
        step += 1;
    }

    output.info(&format!("{}. Start the server:", step));
    output.command("rentscout-server");
    output.newline();

    output.hint(&format!(
        "Form available at http://{}:{}/",
        config.host, config.port
    ));
    output.hint("OpenAPI document at /api/openapi.json");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

const OLLAMA_PROVIDER: &str = r#"# Ollama - local inference (no API key required)
[providers.ollama-local]
type = "ollama"
base_url = "http://localhost:11434"
default_model = "llama2"
"#;

const GEMINI_PROVIDER: &str = r#"# Google Gemini (set GEMINI_API_KEY in .env)
[providers.gemini]
type = "gemini"
api_key_env = "GEMINI_API_KEY"
default_model = "gemini-pro"
"#;

fn generate_rentscout_toml(config: &InitConfig) -> String {
    // With both providers the form narrates locally and the crew uses Gemini.
    let (providers, models, agent_model) = match config.provider.as_str() {
        "gemini" => (
            GEMINI_PROVIDER.to_string(),
            r#"[models.default]
provider = "gemini"
model = "gemini-pro"
temperature = 0.7
max_tokens = 2048
"#
            .to_string(),
            "default",
        ),
        "both" => (
            format!("{}\n{}", OLLAMA_PROVIDER, GEMINI_PROVIDER),
            r#"[models.default]
provider = "ollama-local"
model = "llama2"
temperature = 0.7
max_tokens = 1024

[models.crew]
provider = "gemini"
model = "gemini-pro"
temperature = 0.7
max_tokens = 2048
"#
            .to_string(),
            "crew",
        ),
        _ => (
            OLLAMA_PROVIDER.to_string(),
            r#"[models.default]
provider = "ollama-local"
model = "llama2"
temperature = 0.7
max_tokens = 1024
"#
            .to_string(),
            "default",
        ),
    };

    format!(
        r#"# rentscout configuration
# Generated by: rentscout-server init
#
# Changes to this file are picked up without restarting the server.

[server]
host = "{host}"
port = {port}
log_level = "info"
request_timeout_secs = 120

# Search link defaults and the values pre-filled in the form
[search]
vendor_base_url = "https://www.kayak.com"
sort = "price_a"
percent_encode_route = false
default_origin = "Boston"
default_destination = "New Hampshire"
pickup_offset_days = 1
return_offset_days = 3

# Model used by the form and /api/search
[advisor]
model = "default"
health_check = true

# =============================================================================
# LLM Providers
# =============================================================================
{providers}
# =============================================================================
# Models
# =============================================================================
{models}
# =============================================================================
# Tools
# =============================================================================
[tools.kayak_search]
enabled = true
timeout_secs = 5

[tools.fetch_page]
enabled = true
timeout_secs = 30
max_chars = 4000

# =============================================================================
# Agents
# =============================================================================
[agents.cars]
model = "{agent_model}"
role = "Car Rentals Expert"
goal = "Search and analyze car rental options"
backstory = "I am an expert at finding the best car rental deals and analyzing options."
tools = ["kayak_search", "fetch_page"]
max_tool_iterations = 5
verbose = true

[agents.summary]
model = "{agent_model}"
role = "Summary Expert"
goal = "Provide clear and concise summaries of car rental options"
backstory = "I specialize in analyzing and summarizing complex information into clear recommendations."
verbose = true

# =============================================================================
# Tasks and Workflows
# =============================================================================
[tasks.search]
agent = "cars"
description = """
Search car rentals according to criteria {{request}}. Current year: {{current_year}}
Provide a detailed analysis of the top 5 options.
"""

[tasks.summarize]
agent = "summary"
description = "Create a clear summary of the rental options, highlighting the best deals"

[workflows.rental]
description = "Search car rentals, then summarize the best deals"
tasks = ["search", "summarize"]
"#,
        host = config.host,
        port = config.port,
        providers = providers,
        models = models,
        agent_model = agent_model,
    )
}

fn generate_env_example() -> &'static str {
    r#"# rentscout environment variables
# Copy this file to .env and fill in the values.

# Required for the gemini provider
GEMINI_API_KEY=your-api-key-here

# Optional: logging filter (overrides server.log_level)
RUST_LOG=info,rentscout=debug
"#
}
