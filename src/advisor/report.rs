//! Fixed display content shown next to the model's narration.
//!
//! None of this is derived from live data; it is the same for every search
//! apart from the route endpoints.

use crate::search::query::SearchQuery;
use crate::types::{OfferCard, RentalReport, RouteInfo, SearchRequest};
use chrono::Utc;

fn card(tier: &str, company: &str, daily_price: &str, badge: &str) -> OfferCard {
    OfferCard {
        tier: tier.to_string(),
        company: company.to_string(),
        daily_price: daily_price.to_string(),
        badge: badge.to_string(),
    }
}

/// The three highlight cards (economy, mid-range, premium).
pub fn featured_highlights() -> Vec<OfferCard> {
    vec![
        card("Economy Choice", "Enterprise", "$40/day", "Best Value ⭐"),
        card("Mid-Range Choice", "National", "$45/day", "Most Popular 👥"),
        card("Premium Choice", "Thrifty", "$50/day", "All Inclusive 🛡️"),
    ]
}

pub fn current_deals() -> Vec<String> {
    [
        "Enterprise: 15% off weekly rentals",
        "National: Free GPS rental",
        "Thrifty: No drop-off fees",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn route_info(query: &SearchQuery) -> RouteInfo {
    RouteInfo {
        origin: query.origin.trim().to_string(),
        destination: query.destination.trim().to_string(),
        distance: "200 miles".to_string(),
        drive_time: "~4 hours".to_string(),
        main_route: "I-95 North".to_string(),
    }
}

pub fn quick_tips() -> Vec<String> {
    [
        "Book 2+ weeks ahead for best rates",
        "Check insurance coverage",
        "Fill gas before return",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Assemble the report for one search.
pub fn build_report(
    query: &SearchQuery,
    search_url: String,
    analysis: String,
    model: &str,
) -> RentalReport {
    RentalReport {
        id: uuid::Uuid::new_v4().to_string(),
        query: SearchRequest::from(query),
        search_url,
        analysis,
        model: model.to_string(),
        highlights: featured_highlights(),
        deals: current_deals(),
        route: route_info(query),
        tips: quick_tips(),
        generated_at: Utc::now(),
    }
}
