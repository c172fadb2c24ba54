use std::sync::Arc;
use std::time::Duration;

use ai_client::TextGenerator;
use anyhow::Result as AnyResult;
use tracing::{info, warn};
use url::Url;

use crate::config::ScannerConfig;
use crate::enrichment::Enricher;
use crate::error::{Result, ScanError};
use crate::fetcher::{FetchedPage, HttpFetcher, PageFetcher};
use crate::metadata::extract_metadata;
use crate::normalize::normalize_url;
use crate::types::ScanResult;

/// Website scanner pipeline: validate, fetch, extract, enrich, assemble.
///
/// Holds no per-scan state, so one instance can serve concurrent scans.
#[derive(Clone)]
pub struct WebsiteScanner {
    fetcher: Arc<dyn PageFetcher>,
    enricher: Enricher,
    fetch_timeout: Duration,
}

impl WebsiteScanner {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        generator: Arc<dyn TextGenerator>,
        config: &ScannerConfig,
    ) -> Self {
        Self {
            fetcher,
            enricher: Enricher::new(generator, config.ai_timeout),
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Wire the reqwest fetcher and the configured AI provider.
    pub fn from_config(config: &ScannerConfig) -> AnyResult<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout, &config.user_agent)?;
        Ok(Self::new(
            Arc::new(fetcher),
            config.text_generator(),
            config,
        ))
    }

    /// Scan a user-supplied website address. Never fails: every problem is
    /// reported through `ScanResult::warning`.
    pub async fn scan_website(&self, input: &str) -> ScanResult {
        info!(url = input, "Scanning website");

        let result = match self.run(input).await {
            Ok(result) => result,
            Err(e) => {
                warn!(url = input, outcome = e.kind(), error = %e, "Website scan failed");
                ScanResult::empty_with_warning(e.warning())
            }
        };

        info!(
            url = input,
            degraded = result.warning.is_some(),
            business_name = result.business_name.as_deref().unwrap_or(""),
            "Website scan finished"
        );
        result
    }

    async fn run(&self, input: &str) -> Result<ScanResult> {
        let url = normalize_url(input)?;
        let page = self.fetch(&url).await?;
        let raw = extract_metadata(&page.body, &page.url);

        match self.enricher.enrich(&page.url, &raw).await {
            Ok(enrichment) => Ok(enrichment.merge(&raw)),
            Err(e) => {
                warn!(url = %page.url, outcome = e.kind(), error = %e, "Falling back to page metadata");
                Ok(ScanResult::from_metadata(&raw).with_warning(e.warning()))
            }
        }
    }

    /// Transport errors, timeouts and non-2xx statuses all surface as `Unreachable`.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let unreachable = |reason: String| ScanError::Unreachable {
            url: url.to_string(),
            reason,
        };

        let page = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| {
                unreachable(format!(
                    "no response within {}s",
                    self.fetch_timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| unreachable(format!("{e:#}")))?;

        if !page.is_success() {
            return Err(unreachable(format!("HTTP status {}", page.status)));
        }
        Ok(page)
    }
}
