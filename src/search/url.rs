//! Vendor deep-link construction
//!
//! Builds car-rental search links of the form
//! `https://www.kayak.com/cars/<route>/<pickup>/<return>?sort=price_a`.
//!
//! The route segment is lowercased and every space becomes a hyphen. Nothing
//! else is touched unless percent-encoding is switched on explicitly.

use crate::utils::toml_config::SearchConfig;

/// Default vendor host.
pub const KAYAK_BASE_URL: &str = "https://www.kayak.com";

/// Default result ordering (cheapest first).
pub const DEFAULT_SORT: &str = "price_a";

/// Lowercase the route and replace every literal space with a hyphen.
pub fn normalize_route(route: &str) -> String {
    route.to_lowercase().replace(' ', "-")
}

/// Join origin and destination with the `-to-` convention the vendor expects.
pub fn route_for(origin: &str, destination: &str) -> String {
    format!("{}-to-{}", origin.trim(), destination.trim())
}

/// Build a Kayak car search link with the default host and sort order.
///
/// `pickup` and `dropoff` are inserted verbatim and are expected to be
/// `YYYY-MM-DD`. No validation happens here; see
/// [`SearchQuery::validate`](crate::search::SearchQuery::validate).
pub fn kayak_search(route: &str, pickup: &str, dropoff: &str) -> String {
    SearchUrlBuilder::default().build(route, pickup, dropoff)
}

/// Configurable link builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUrlBuilder {
    base_url: String,
    sort: String,
    percent_encode: bool,
}

impl Default for SearchUrlBuilder {
    fn default() -> Self {
        Self {
            base_url: KAYAK_BASE_URL.to_string(),
            sort: DEFAULT_SORT.to_string(),
            percent_encode: false,
        }
    }
}

impl SearchUrlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            base_url: config.vendor_base_url.clone(),
            sort: config.sort.clone(),
            percent_encode: config.percent_encode_route,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Percent-encode the normalized route segment (slashes, `?`, non-ASCII, ...).
    pub fn percent_encode(mut self, enabled: bool) -> Self {
        self.percent_encode = enabled;
        self
    }

    pub fn build(&self, route: &str, pickup: &str, dropoff: &str) -> String {
        let normalized = normalize_route(route);
        let segment = if self.percent_encode {
            urlencoding::encode(&normalized).into_owned()
        } else {
            normalized
        };

        format!(
            "{}/cars/{}/{}/{}?sort={}",
            self.base_url.trim_end_matches('/'),
            segment,
            pickup,
            dropoff,
            self.sort
        )
    }
}
