//! NewsNotes Common Library
//!
//! Shared code for the NewsNotes services including:
//! - Configuration management
//! - Error types and HTTP mapping
//! - Database entities, schema bootstrap and the repository
//! - Homepage scraper (fetch, extract, store)
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod scraper;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::db::{ArticleWithNoteIds, ArticleWithNotes, DbPool, NewArticle, Repository};
pub use crate::errors::{AppError, Result};
pub use crate::scraper::{HttpFetcher, PageFetcher, ScrapeService, ScrapeSummary};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Homepage scraped when no target is configured
pub const DEFAULT_SCRAPE_URL: &str = "https://www.theonion.com/";
