//! Scrape-and-store flow behind `GET /scrape`

use crate::config::ScraperConfig;
use crate::db::{NewArticle, Repository};
use crate::errors::Result;
use crate::metrics;
use crate::scraper::extract::extract;
use crate::scraper::fetch::PageFetcher;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Outcome of one scrape run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// `<article>` nodes found on the page
    pub found: usize,
    /// Records inserted
    pub stored: usize,
    /// Records whose insert failed
    pub failed: usize,
}

/// Fetches the configured homepage and stores every extracted article
pub struct ScrapeService {
    fetcher: Arc<dyn PageFetcher>,
    repo: Repository,
    target_url: Url,
    store_concurrency: usize,
}

impl ScrapeService {
    /// Create the service; fails if the configured target is not a URL
    pub fn new(fetcher: Arc<dyn PageFetcher>, repo: Repository, config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            repo,
            target_url: Url::parse(&config.target_url)?,
            store_concurrency: config.store_concurrency.max(1),
        })
    }

    /// The homepage this service scrapes
    pub fn target_url(&self) -> &Url {
        &self.target_url
    }

    /// Fetch, extract and store.
    ///
    /// A fetch failure aborts before anything is stored. Individual insert
    /// failures are logged and counted but do not stop the remaining inserts,
    /// which run concurrently and complete in no particular order.
    #[instrument(level = "info", skip(self), fields(url = %self.target_url))]
    pub async fn run(&self) -> Result<ScrapeSummary> {
        let start = Instant::now();

        let html = self.fetcher.fetch(self.target_url.as_str()).await?;
        let records = self.extract_records(&html);
        let found = records.len();

        let outcomes: Vec<bool> = stream::iter(records)
            .map(|record| self.store(record))
            .buffer_unordered(self.store_concurrency)
            .collect()
            .await;

        let stored = outcomes.iter().filter(|ok| **ok).count();
        let summary = ScrapeSummary {
            found,
            stored,
            failed: found - stored,
        };

        metrics::record_scrape(start.elapsed().as_secs_f64(), &summary);
        info!(
            found = summary.found,
            stored = summary.stored,
            failed = summary.failed,
            "Scrape complete"
        );

        Ok(summary)
    }

    fn extract_records(&self, html: &str) -> Vec<NewArticle> {
        let document = Html::parse_document(html);

        extract(&document)
            .enumerate()
            .map(|(index, extracted)| {
                let missing = extracted.missing_fields();
                if !missing.is_empty() {
                    warn!(index, ?missing, "Article node is missing expected fields");
                }
                extracted.into_new_article(&self.target_url)
            })
            .collect()
    }

    async fn store(&self, record: NewArticle) -> bool {
        match self.repo.create_article(record).await {
            Ok(article) => {
                debug!(id = %article.id, title = %article.title, "Stored scraped article");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to store scraped article");
                false
            }
        }
    }
}
