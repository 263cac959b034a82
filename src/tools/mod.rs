//! Built-in Tools for Agent Capabilities
//!
//! Tools let pipeline agents do more than generate text.
//!
//! # Module Structure
//!
//! - [`kayak`](crate::tools::kayak) - Car-rental search link generation
//! - [`fetch`](crate::tools::fetch) - Page download and text extraction
//! - [`registry`](crate::tools::registry) - Tool registration and discovery
//!
//! # Tool Registry
//!
//! ```ignore
//! let registry = ToolRegistry::from_config(&config)?;
//! let tools = registry.get_tool_definitions();
//! let result = registry
//!     .execute("kayak_search", json!({"loc": "Miami", "pickup": "2024-06-01", "dropoff": "2024-06-05"}))
//!     .await?;
//! ```

/// Page fetching tool.
pub mod fetch;
/// Search-link tool.
pub mod kayak;
/// Tool registry for managing available tools.
pub mod registry;

pub use registry::{Tool, ToolRegistry};
