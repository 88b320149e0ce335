//! Homepage scraper
//!
//! Three pieces, kept apart so each can be tested on its own:
//!
//! 1. **Fetching** ([`fetch`]): one GET of the configured homepage
//! 2. **Extraction** ([`extract`]): a pure walk over the parsed document
//! 3. **Storing** ([`service`]): one insert per extracted record
//!
//! Extraction follows a fixed structural path, so a site redesign degrades
//! the records (empty fields, logged as warnings) instead of failing.

pub mod extract;
pub mod fetch;
pub mod service;

pub use extract::{extract, extract_articles, ExtractedArticle};
pub use fetch::{HttpFetcher, PageFetcher};
pub use service::{ScrapeService, ScrapeSummary};
