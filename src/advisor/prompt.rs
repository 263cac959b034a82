use crate::search::query::{display_date, SearchQuery};

/// The analysis request sent to the model for one search.
pub fn analysis_prompt(query: &SearchQuery, search_url: &str) -> String {
    format!(
        r#"Analyze car rentals from {origin} to {destination} for {pickup} to {dropoff}.
URL: {url}

Provide a clear, structured analysis using this format:

### 🚗 Top 3 Rental Options
1. [Car Make/Model] from [Company]
   - Price: $XXX
   - Key Features: [List 2-3 key features]

### 💰 Best Available Deals
- List current promotions and discounts
- Show savings amounts where applicable

### 📍 Route Information
- Distance: X miles
- Estimated drive time: X hours
- Major highways: [List main routes]

### 💡 Quick Tips
- List 3-4 essential booking tips in bullet points

Keep the response concise and easy to read. Use emojis sparingly for better readability.
Format prices as exact numbers (e.g., "$45.99" instead of "40-50").
"#,
        origin = query.origin.trim(),
        destination = query.destination.trim(),
        pickup = display_date(query.pickup_date),
        dropoff = display_date(query.return_date),
        url = search_url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query() -> SearchQuery {
        SearchQuery::new(
            " Boston ",
            "New Hampshire",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
        )
    }

    #[test]
    fn test_prompt_header() {
        let prompt = analysis_prompt(&query(), "https://example.test/link");
        assert!(prompt.starts_with(
            "Analyze car rentals from Boston to New Hampshire for June 01, 2024 to June 05, 2024.\nURL: https://example.test/link\n"
        ));
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let prompt = analysis_prompt(&query(), "u");
        let positions: Vec<usize> = [
            "### 🚗 Top 3 Rental Options",
            "### 💰 Best Available Deals",
            "### 📍 Route Information",
            "### 💡 Quick Tips",
        ]
        .iter()
        .map(|heading| prompt.find(heading).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("Format prices as exact numbers"));
    }
}
