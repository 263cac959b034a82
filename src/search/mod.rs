//! Car Rental Search Links
//!
//! The one deterministic piece of the application: turning a route and two
//! dates into a vendor search-results link.
//!
//! # Example
//!
//! ```
//! use rentscout::search::kayak_search;
//!
//! let url = kayak_search("Boston-to-New Hampshire", "2024-06-01", "2024-06-05");
//! assert_eq!(
//!     url,
//!     "https://www.kayak.com/cars/boston-to-new-hampshire/2024-06-01/2024-06-05?sort=price_a"
//! );
//! ```
//!
//! [`SearchQuery`] carries the form input and the validation the UI applies
//! before a link is built (both locations present, return strictly after
//! pickup).

pub mod query;
pub mod url;

pub use query::{display_date, iso_date, validate_location, SearchQuery};
pub use url::{kayak_search, normalize_route, route_for, SearchUrlBuilder};
