//! Scrape trigger

use axum::extract::State;

use crate::AppState;
use newsnotes_common::errors::Result;

/// Scrape the configured homepage and store what it yields.
///
/// Answers with a plain-text acknowledgement once every insert has finished.
pub async fn scrape(State(state): State<AppState>) -> Result<String> {
    let summary = state.scraper.run().await?;

    Ok(format!(
        "Scrape complete: {} found, {} stored, {} failed",
        summary.found, summary.stored, summary.failed
    ))
}
