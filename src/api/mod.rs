//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//! - [`api::views`](crate::api::views) - HTML rendering for the form pages
//!
//! # Endpoints
//!
//! ## Pages
//! - `GET /` - Search form with default values
//! - `POST /search` - Submit the form, render link and narrated offers
//!
//! ## Search (`/api`)
//! - `POST /api/search` - Link plus narrated offers as JSON
//! - `POST /api/url` - Link only, no model call
//!
//! ## Workflows (`/api/workflows`)
//! - `GET /api/workflows` - List configured workflows
//! - `POST /api/workflows/{name}` - Run a workflow
//!
//! ## Health (`/api/health`)
//! - `GET /api/health` - Service and model reachability
//!
//! The OpenAPI document is served at `/api/openapi.json`.

use utoipa::OpenApi;

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
/// Server-rendered HTML.
pub mod views;

#[derive(OpenApi)]
#[openapi(
    info(title = "rentscout", description = "Car rental search links and narrated offers"),
    paths(
        handlers::health::health,
        handlers::search::search,
        handlers::search::search_url,
        handlers::workflows::list_workflows,
        handlers::workflows::execute_workflow,
    ),
    components(schemas(
        crate::types::SearchRequest,
        crate::types::SearchUrlResponse,
        crate::types::RentalReport,
        crate::types::OfferCard,
        crate::types::RouteInfo,
        crate::types::HealthResponse,
        crate::types::WorkflowRequest,
        crate::workflows::WorkflowOutput,
        crate::workflows::WorkflowInfo,
        crate::workflows::TaskStep,
        crate::agents::ToolCallRecord,
    )),
    tags(
        (name = "search", description = "Search link and offer narration"),
        (name = "workflows", description = "Multi-agent pipelines"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
