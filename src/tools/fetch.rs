//! Page fetching tool
//!
//! Downloads a page and reduces it to its title and visible text so an agent
//! can read it without wading through markup.

use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::time::Duration;

/// Default cap on returned text, in characters
pub const DEFAULT_MAX_CHARS: usize = 4000;

pub struct FetchPageTool {
    http: reqwest::Client,
    max_chars: usize,
}

impl FetchPageTool {
    pub fn new(timeout: Duration, max_chars: usize) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rentscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, max_chars })
    }
}

/// Page title and whitespace-collapsed body text.
pub(crate) fn extract_text(html: &str, max_chars: usize) -> Result<(Option<String>, String, bool)> {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title")
        .map_err(|e| AppError::Internal(format!("Invalid selector: {}", e)))?;
    let body_selector = Selector::parse("body")
        .map_err(|e| AppError::Internal(format!("Invalid selector: {}", e)))?;
    let skip_selector = Selector::parse("script, style, noscript")
        .map_err(|e| AppError::Internal(format!("Invalid selector: {}", e)))?;

    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let skipped: Vec<_> = document.select(&skip_selector).map(|el| el.id()).collect();

    let mut words: Vec<&str> = Vec::new();
    if let Some(body) = document.select(&body_selector).next() {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            if node.ancestors().any(|a| skipped.contains(&a.id())) {
                continue;
            }
            words.extend(text.split_whitespace());
        }
    }

    let full = words.join(" ");
    let truncated = full.chars().count() > max_chars;
    let text = if truncated {
        full.chars().take(max_chars).collect()
    } else {
        full
    };

    Ok((title, text, truncated))
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return its title and visible text"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The http(s) URL of the page to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = args
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Missing 'url' parameter".to_string()))?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::InvalidInput(format!(
                "Only http(s) URLs can be fetched, got '{}'",
                url
            )));
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Tool(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Tool(format!("Fetching {} returned {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Tool(format!("Failed to read {}: {}", url, e)))?;

        let (title, content, truncated) = extract_text(&body, self.max_chars)?;

        Ok(json!({
            "url": url,
            "title": title,
            "content": content,
            "truncated": truncated
        }))
    }
}
