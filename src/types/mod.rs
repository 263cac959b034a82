use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Search form payload shared by the HTML form and the JSON API.
///
/// Dates arrive as `YYYY-MM-DD`, which is what `<input type="date">` submits.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub from_location: String,
    pub to_location: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchUrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkflowRequest {
    /// Free-text rental request, e.g. "car rental in Miami from June 1st to June 5th"
    pub request: String,
    /// Overrides the `{current_year}` placeholder (defaults to the current year)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub llm_model: String,
    pub llm_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_error: Option<String>,
}

// ============= Report Types =============

/// A hard-coded highlight card shown next to the model's narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OfferCard {
    pub tier: String,
    pub company: String,
    pub daily_price: String,
    pub badge: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteInfo {
    pub origin: String,
    pub destination: String,
    pub distance: String,
    pub drive_time: String,
    pub main_route: String,
}

/// Everything rendered for one search action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RentalReport {
    pub id: String,
    pub query: SearchRequest,
    pub search_url: String,
    /// Free-text narration from the language model. Not factual.
    pub analysis: String,
    pub model: String,
    pub highlights: Vec<OfferCard>,
    pub deals: Vec<String>,
    pub route: RouteInfo,
    pub tips: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The message shown to the person using the form, without the category prefix.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Connection(msg)
            | AppError::LLM(msg)
            | AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Configuration(msg)
            | AppError::Tool(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::LLM(_)
            | AppError::Configuration(_)
            | AppError::Tool(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AppError::Connection(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.user_message()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
