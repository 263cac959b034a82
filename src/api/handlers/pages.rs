//! HTML form handlers

use crate::{
    api::views::{report_page, search_page, SearchForm},
    search::SearchQuery,
    types::{AppError, Result},
    AppState,
};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
};
use chrono::{Local, NaiveDate};

/// The empty search form with today's defaults
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let config = state.config_manager.config();
    let search = &config.search;

    let mut defaults = SearchQuery::defaults(
        Local::now().date_naive(),
        search.pickup_offset_days,
        search.return_offset_days,
    );
    defaults.origin = search.default_origin.clone();
    defaults.destination = search.default_destination.clone();

    Ok(Html(search_page(&SearchForm::from(&defaults), None)?))
}

/// Submit the form; errors re-render the form with the message under it
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<(StatusCode, Html<String>)> {
    match run_search(&state, &form).await {
        Ok(html) => Ok((StatusCode::OK, Html(html))),
        Err(e) => {
            tracing::warn!(error = %e, "search failed");
            let page = search_page(&form, Some(e.user_message()))?;
            Ok((e.status_code(), Html(page)))
        }
    }
}

async fn run_search(state: &AppState, form: &SearchForm) -> Result<String> {
    let query = SearchQuery::new(
        form.from_location.clone(),
        form.to_location.clone(),
        parse_form_date("Pickup date", &form.pickup_date)?,
        parse_form_date("Return date", &form.return_date)?,
    );

    let config = state.config_manager.config();
    let report = state.advisor().advise(&config, &query).await?;

    report_page(&report)
}

fn parse_form_date(label: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!("{} must be a date in YYYY-MM-DD format", label))
    })
}
