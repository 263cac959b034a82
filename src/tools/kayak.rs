//! Search-link tool exposed to agents

use crate::search::{validate_location, SearchUrlBuilder};
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Builds a car-rental search link from a location and two dates.
pub struct KayakSearchTool {
    builder: SearchUrlBuilder,
}

impl KayakSearchTool {
    pub fn new(builder: SearchUrlBuilder) -> Self {
        Self { builder }
    }
}

impl Default for KayakSearchTool {
    fn default() -> Self {
        Self::new(SearchUrlBuilder::default())
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing '{}' parameter", key)))
}

fn parse_date(value: &str, key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!(
            "'{}' must be a date in YYYY-MM-DD format, got '{}'",
            key, value
        ))
    })
}

#[async_trait]
impl Tool for KayakSearchTool {
    fn name(&self) -> &str {
        "kayak_search"
    }

    fn description(&self) -> &str {
        "Generate a Kayak car rental search URL for a location and date range. \
         Use a city name for `loc`, or `<origin>-to-<destination>` for a one-way rental."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "loc": {
                    "type": "string",
                    "description": "Pick-up location, e.g. 'Miami' or 'Boston-to-New Hampshire'"
                },
                "pickup": {
                    "type": "string",
                    "description": "Pick-up date in YYYY-MM-DD format"
                },
                "dropoff": {
                    "type": "string",
                    "description": "Return date in YYYY-MM-DD format"
                }
            },
            "required": ["loc", "pickup", "dropoff"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let loc = required_str(&args, "loc")?;
        let pickup = required_str(&args, "pickup")?;
        let dropoff = required_str(&args, "dropoff")?;
        validate_location(loc)?;

        if parse_date(pickup, "pickup")? >= parse_date(dropoff, "dropoff")? {
            return Err(AppError::InvalidInput(
                "Return date must be after pickup date".to_string(),
            ));
        }

        let url = self.builder.build(loc, pickup, dropoff);
        tracing::debug!(%url, "kayak_search built link");

        Ok(json!({ "url": url }))
    }
}
