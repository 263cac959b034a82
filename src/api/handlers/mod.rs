//! API request handlers.

/// Service health.
pub mod health;
/// HTML form pages.
pub mod pages;
/// JSON search and link endpoints.
pub mod search;
/// Workflow listing and execution.
pub mod workflows;
