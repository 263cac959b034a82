use crate::search::url::{route_for, SearchUrlBuilder};
use crate::types::{AppError, Result, SearchRequest};
use chrono::{Days, NaiveDate};

/// Characters that would restructure the link if left in a location name.
const RESERVED_LOCATION_CHARS: &[char] = &['/', '?', '#'];

pub const DEFAULT_ORIGIN: &str = "Boston";
pub const DEFAULT_DESTINATION: &str = "New Hampshire";

/// One search as entered in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
}

/// Reject locations containing characters that would restructure the link.
pub fn validate_location(location: &str) -> Result<()> {
    match location.chars().find(|c| RESERVED_LOCATION_CHARS.contains(c)) {
        Some(c) => Err(AppError::InvalidInput(format!(
            "Location '{}' contains the reserved character '{}'",
            location.trim(),
            c
        ))),
        None => Ok(()),
    }
}

impl SearchQuery {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            pickup_date,
            return_date,
        }
    }

    /// Form defaults: Boston to New Hampshire, picking up `pickup_offset` days
    /// after `today` and returning `return_offset` days after `today`.
    pub fn defaults(today: NaiveDate, pickup_offset: u64, return_offset: u64) -> Self {
        let pickup_date = today.checked_add_days(Days::new(pickup_offset)).unwrap_or(today);
        let return_date = today
            .checked_add_days(Days::new(return_offset))
            .unwrap_or(pickup_date);

        Self::new(DEFAULT_ORIGIN, DEFAULT_DESTINATION, pickup_date, return_date)
    }

    /// Reject what the form would reject before any link is built.
    pub fn validate(&self) -> Result<()> {
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter both locations".to_string(),
            ));
        }

        if self.pickup_date >= self.return_date {
            return Err(AppError::InvalidInput(
                "Return date must be after pickup date".to_string(),
            ));
        }

        validate_location(&self.origin)?;
        validate_location(&self.destination)
    }

    /// The caller-side route string, `"<origin>-to-<destination>"`.
    pub fn route(&self) -> String {
        route_for(&self.origin, &self.destination)
    }

    pub fn pickup_str(&self) -> String {
        iso_date(self.pickup_date)
    }

    pub fn return_str(&self) -> String {
        iso_date(self.return_date)
    }

    /// Number of rental days.
    pub fn rental_days(&self) -> i64 {
        (self.return_date - self.pickup_date).num_days()
    }

    /// Validate, then build the vendor link.
    pub fn search_url(&self, builder: &SearchUrlBuilder) -> Result<String> {
        self.validate()?;
        Ok(builder.build(&self.route(), &self.pickup_str(), &self.return_str()))
    }
}

impl From<SearchRequest> for SearchQuery {
    fn from(req: SearchRequest) -> Self {
        Self::new(
            req.from_location,
            req.to_location,
            req.pickup_date,
            req.return_date,
        )
    }
}

impl From<&SearchQuery> for SearchRequest {
    fn from(query: &SearchQuery) -> Self {
        Self {
            from_location: query.origin.clone(),
            to_location: query.destination.clone(),
            pickup_date: query.pickup_date,
            return_date: query.return_date,
        }
    }
}

/// `YYYY-MM-DD`
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Long form used in prompts, e.g. `June 01, 2024`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}
