//! rentscout-server entry point
//!
//! - `rentscout-server` / `rentscout-server serve` - web form and JSON API
//! - `rentscout-server search` - one advisor run in the terminal
//! - `rentscout-server url` - print a search link
//! - `rentscout-server crew` - run a multi-agent workflow
//! - `rentscout-server init` - scaffold `rentscout.toml`
//! - `rentscout-server config` - show or validate the configuration

use anyhow::{bail, Context};
use chrono::Local;
use owo_colors::OwoColorize;
use rentscout::{
    api::routes::create_router,
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        Cli, Commands, QueryArgs,
    },
    llm::ProviderRegistry,
    utils::toml_config::ConfigError,
    AgentRegistry, AppState, ConfigManager, RentScoutConfig, RentalAdvisor, SearchQuery,
    SearchUrlBuilder, TaskInputs, ToolRegistry, WorkflowEngine,
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        None => serve(&cli.config, None, None, false, cli.verbose, cli.json_logs, &output).await,
        Some(Commands::Serve {
            ref host,
            port,
            no_watch,
        }) => {
            serve(
                &cli.config,
                host.clone(),
                port,
                no_watch,
                cli.verbose,
                cli.json_logs,
                &output,
            )
            .await
        }
        Some(Commands::Search { ref query, json }) => {
            let config = RentScoutConfig::load(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            init_tracing("warn", cli.verbose, cli.json_logs);
            search(&config, query, json, &output).await
        }
        Some(Commands::Url { ref query }) => url(&cli.config, query),
        Some(Commands::Crew {
            ref request,
            ref workflow,
            year,
            json,
        }) => {
            let config = RentScoutConfig::load(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            init_tracing(&config.server.log_level, cli.verbose, cli.json_logs);
            crew(config, request, workflow, year, json, &output).await
        }
        Some(Commands::Init {
            ref path,
            force,
            ref provider,
            ref host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path: path.clone(),
                    force,
                    provider: provider.clone(),
                    host: host.clone(),
                    port,
                },
                &output,
            );
            match result {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(msg) => bail!(msg),
            }
        }
        Some(Commands::Config { full, validate }) => show_config(&cli.config, full, validate, &output),
    }
}

/// `RUST_LOG` wins; otherwise `default_level`, raised to debug by `--verbose`.
fn init_tracing(default_level: &str, verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn serve(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    no_watch: bool,
    verbose: bool,
    json_logs: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let mut config_manager = match ConfigManager::new(config_path) {
        Ok(manager) => manager,
        Err(ConfigError::FileNotFound(path)) => {
            output.error(&format!("{} not found", path.display()));
            output.hint("Create one with: rentscout-server init");
            bail!("missing configuration file");
        }
        Err(e) => return Err(e).context("loading configuration"),
    };

    let config = config_manager.config();
    init_tracing(&config.server.log_level, verbose, json_logs);

    for warning in config.validate_with_warnings()? {
        tracing::warn!("{}", warning);
    }

    if !no_watch {
        config_manager
            .start_watching()
            .context("starting configuration watcher")?;
    }

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let state = AppState::new(config_manager);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    output.banner();
    output.success(&format!("Listening on http://{}", addr));
    output.kv("Advisor model", &config.advisor.model);
    output.kv("Config", &config_path.display().to_string());
    tracing::info!(%addr, "server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn query_from_args(config: &RentScoutConfig, args: &QueryArgs) -> SearchQuery {
    args.to_query(&config.search, Local::now().date_naive())
}

/// `url` works without a config file; the built-in defaults apply then.
fn url(config_path: &Path, args: &QueryArgs) -> anyhow::Result<()> {
    let config = match RentScoutConfig::load(config_path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) => RentScoutConfig::default(),
        Err(e) => return Err(e).context("loading configuration"),
    };

    let query = query_from_args(&config, args);
    let link = query.search_url(&SearchUrlBuilder::from_config(&config.search))?;
    println!("{}", link);
    Ok(())
}

async fn search(
    config: &RentScoutConfig,
    args: &QueryArgs,
    json: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let query = query_from_args(config, args);
    let advisor = RentalAdvisor::new(Arc::new(ProviderRegistry::from_config(config)));
    let report = advisor.advise(config, &query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output.link("Generated URL", &report.search_url);
    output.header("Analysis");
    output.text_block(&report.analysis);

    output.header("Top Rental Options");
    output.table_header(&["Tier", "Company", "Price"]);
    for card in &report.highlights {
        output.table_row(&[card.tier.as_str(), card.company.as_str(), card.daily_price.as_str()]);
    }

    output.subheader("Current Deals");
    for deal in &report.deals {
        output.list_item(deal);
    }

    output.subheader("Route Details");
    output.kv("Route", &format!("{} -> {}", report.route.origin, report.route.destination));
    output.kv("Distance", &report.route.distance);
    output.kv("Drive time", &report.route.drive_time);
    output.kv("Main route", &report.route.main_route);

    output.subheader("Quick Tips");
    for tip in &report.tips {
        output.list_item(tip);
    }

    output.newline();
    output.link("Compare All Options on Kayak", &report.search_url);
    Ok(())
}

async fn crew(
    config: RentScoutConfig,
    request: &str,
    workflow: &str,
    year: Option<i32>,
    json: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let tool_registry = Arc::new(ToolRegistry::from_config(&config)?);
    let llm_factory = Arc::new(ProviderRegistry::from_config(&config));
    let agent_registry = AgentRegistry::from_config(&config, llm_factory, tool_registry);
    let engine = WorkflowEngine::new(Arc::new(config), agent_registry);

    let mut inputs = TaskInputs::new(request);
    if let Some(year) = year {
        inputs = inputs.with_year(year);
    }

    if !json {
        output.header(&format!("Running workflow '{}'", workflow));
        output.kv("Request", request);
    }

    let result = engine.execute_workflow(workflow, &inputs).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let total = result.steps.len() as u32;
    for (i, step) in result.steps.iter().enumerate() {
        output.step(
            i as u32 + 1,
            total,
            &format!("{} ({}, {} ms)", step.task, step.agent, step.duration_ms),
        );
        for call in &step.tool_calls {
            let status = if call.success { "ok" } else { "failed" };
            output.list_item(&format!("{} [{}]", call.name, status));
        }
    }

    output.header("Result");
    output.text_block(&result.final_output);
    Ok(())
}

fn show_config(config_path: &Path, full: bool, validate: bool, output: &Output) -> anyhow::Result<()> {
    let config = RentScoutConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if validate {
        let warnings = config.validate_with_warnings()?;
        output.success(&format!("{} is valid", config_path.display()));
        for warning in &warnings {
            output.warning(&warning.message);
        }
        return Ok(());
    }

    if full {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    output.header("Server");
    output.kv("Address", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("Log level", &config.server.log_level);
    output.kv("Advisor model", &config.advisor.model);

    output.header("Models");
    output.table_header(&["Name", "Provider", "Model"]);
    let mut models: Vec<_> = config.models.iter().collect();
    models.sort_by(|a, b| a.0.cmp(b.0));
    for (name, model) in models {
        output.table_row(&[name.as_str(), model.provider.as_str(), model.model.as_str()]);
    }

    output.header("Agents");
    let mut agents: Vec<_> = config.agents.iter().collect();
    agents.sort_by(|a, b| a.0.cmp(b.0));
    for (name, agent) in agents {
        output.list_item(&format!("{} - {} ({})", name, agent.role, agent.model));
    }

    output.header("Workflows");
    for info in rentscout::workflows::list_workflows(&config) {
        output.list_item(&format!("{}: {}", info.name, info.tasks.join(" -> ")));
    }

    Ok(())
}
