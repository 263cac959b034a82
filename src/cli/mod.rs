//! CLI module for rentscout
//!
//! Command-line parsing for the `rentscout-server` binary. Uses clap for
//! argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::search::SearchQuery;
use crate::utils::toml_config::SearchConfig;
use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rentscout - car rental search links with narrated offers
#[derive(Parser, Debug)]
#[command(
    name = "rentscout-server",
    version,
    about = "rentscout - car rental search links with narrated offers",
    long_about = "Builds Kayak car-rental search links, asks a language model to narrate\n\
                  likely offers, and serves both through a small web form.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  rentscout-server init                         # Scaffold rentscout.toml\n    \
                  rentscout-server                              # Start the server\n    \
                  rentscout-server url Boston \"New Hampshire\"   # Print a search link\n    \
                  rentscout-server crew \"car rental in Miami from June 1st to June 5th\""
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "rentscout.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default when no subcommand is given)
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,

        /// Override server.port
        #[arg(long)]
        port: Option<u16>,

        /// Do not hot-reload the configuration file
        #[arg(long)]
        no_watch: bool,
    },

    /// Build a search link and ask the advisor model to narrate offers
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the search link only, without calling a model
    Url {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Run a multi-agent workflow
    Crew {
        /// Free-text rental request
        #[arg(default_value = "car rental in Miami from June 1st to June 5th")]
        request: String,

        /// Workflow to run
        #[arg(short, long, default_value = "rental")]
        workflow: String,

        /// Value for the {current_year} placeholder
        #[arg(long)]
        year: Option<i32>,

        /// Print the full workflow output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new rentscout project with configuration files
    ///
    /// Creates rentscout.toml and .env.example.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// LLM provider for the default model (ollama, gemini, or both)
        #[arg(long, default_value = "ollama")]
        provider: String,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Search input shared by `search` and `url`. Missing values fall back to
/// the form defaults from `[search]`.
#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    /// Pickup location
    pub from: Option<String>,

    /// Drop-off location
    pub to: Option<String>,

    /// Pickup date (YYYY-MM-DD)
    #[arg(long)]
    pub pickup: Option<NaiveDate>,

    /// Return date (YYYY-MM-DD)
    #[arg(long = "return")]
    pub return_date: Option<NaiveDate>,
}

impl QueryArgs {
    /// Fill missing values from the `[search]` defaults. A pickup date given
    /// without a return date keeps the default rental length.
    pub fn to_query(&self, search: &SearchConfig, today: NaiveDate) -> SearchQuery {
        let defaults =
            SearchQuery::defaults(today, search.pickup_offset_days, search.return_offset_days);

        let pickup_date = self.pickup.unwrap_or(defaults.pickup_date);
        let return_date = match (self.pickup, self.return_date) {
            (_, Some(date)) => date,
            (Some(pickup), None) => {
                let days = search
                    .return_offset_days
                    .saturating_sub(search.pickup_offset_days)
                    .max(1);
                pickup.checked_add_days(Days::new(days)).unwrap_or(pickup)
            }
            (None, None) => defaults.return_date,
        };

        SearchQuery::new(
            self.from.clone().unwrap_or_else(|| search.default_origin.clone()),
            self.to.clone().unwrap_or_else(|| search.default_destination.clone()),
            pickup_date,
            return_date,
        )
    }
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
