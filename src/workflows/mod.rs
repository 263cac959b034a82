//! Workflow Engine Module
//!
//! Sequential task pipelines defined in `rentscout.toml`.
//!
//! # Configuration
//!
//! ```toml
//! [tasks.search]
//! agent = "cars"
//! description = "Search car rentals according to criteria {request}. Current year: {current_year}"
//!
//! [tasks.summarize]
//! agent = "summary"
//! description = "Create a clear summary of the rental options, highlighting the best deals"
//!
//! [workflows.rental]
//! tasks = ["search", "summarize"]
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = WorkflowEngine::new(config, agent_registry);
//! let output = engine
//!     .execute_workflow("rental", &TaskInputs::new("car rental in Miami from June 1st to June 5th"))
//!     .await?;
//! println!("{}", output.final_output);
//! ```

pub mod engine;

pub use engine::{list_workflows, TaskInputs, TaskStep, WorkflowEngine, WorkflowInfo, WorkflowOutput};
