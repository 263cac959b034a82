//! Rental advisor
//!
//! Runs one search the way the form does: check the input, make sure the
//! model is reachable, build the link, ask the model to narrate offers and
//! wrap everything into a [`RentalReport`].

pub mod prompt;
pub mod report;

use crate::llm::LLMClientFactoryTrait;
use crate::search::{SearchQuery, SearchUrlBuilder};
use crate::types::{AppError, RentalReport, Result};
use crate::utils::toml_config::RentScoutConfig;
use std::sync::Arc;

pub use prompt::analysis_prompt;
pub use report::{build_report, current_deals, featured_highlights, quick_tips, route_info};

pub struct RentalAdvisor {
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
}

impl RentalAdvisor {
    pub fn new(llm_factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        Self { llm_factory }
    }

    /// Run one search against the current configuration.
    pub async fn advise(&self, config: &RentScoutConfig, query: &SearchQuery) -> Result<RentalReport> {
        query.validate()?;

        let client = self.llm_factory.create_for_model(&config.advisor.model).await?;

        if config.advisor.health_check {
            client.health_check().await?;
        }

        let builder = SearchUrlBuilder::from_config(&config.search);
        let search_url = query.search_url(&builder)?;
        tracing::info!(%search_url, model = client.model_name(), "generated search link");

        let prompt = analysis_prompt(query, &search_url);
        let analysis = client.generate(&prompt).await.map_err(|e| match e {
            AppError::Connection(_) => e,
            other => AppError::LLM(format!(
                "Failed to get recommendations: {}",
                other.user_message()
            )),
        })?;

        Ok(build_report(query, search_url, analysis, client.model_name()))
    }
}
