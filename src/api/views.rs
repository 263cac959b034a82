//! Server-rendered HTML for the search form and the result page.
//!
//! Pages are minijinja templates under `api/templates/`. Every template name
//! ends in `.html`, so values are HTML-escaped on output.

use crate::search::query::iso_date;
use crate::search::SearchQuery;
use crate::types::{AppError, RentalReport, Result};
use minijinja::{context, AutoEscape, Environment};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Raw form fields as submitted. Kept as text so a bad date can be shown
/// back to the user instead of being rejected by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub from_location: String,
    #[serde(default)]
    pub to_location: String,
    #[serde(default)]
    pub pickup_date: String,
    #[serde(default)]
    pub return_date: String,
}

impl From<&SearchQuery> for SearchForm {
    fn from(query: &SearchQuery) -> Self {
        Self {
            from_location: query.origin.clone(),
            to_location: query.destination.clone(),
            pickup_date: iso_date(query.pickup_date),
            return_date: iso_date(query.return_date),
        }
    }
}

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    for (name, source) in [
        ("layout.html", include_str!("templates/layout.html")),
        ("form.html", include_str!("templates/form.html")),
        ("search.html", include_str!("templates/search.html")),
        ("report.html", include_str!("templates/report.html")),
    ] {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!(template = name, error = %e, "invalid page template");
        }
    }
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    TEMPLATES
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|e| AppError::Internal(format!("Failed to render {}: {}", name, e)))
}

/// The form, optionally with an error message under it.
pub fn search_page(form: &SearchForm, error: Option<&str>) -> Result<String> {
    render("search.html", context! { form, error })
}

/// The form followed by the model's analysis and the fixed highlight content.
pub fn report_page(report: &RentalReport) -> Result<String> {
    let form = SearchForm {
        from_location: report.query.from_location.clone(),
        to_location: report.query.to_location.clone(),
        pickup_date: iso_date(report.query.pickup_date),
        return_date: iso_date(report.query.return_date),
    };
    render("report.html", context! { form, report })
}
