use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use crate::analyzer::{AnalyzedPage, MAX_TEXT_CHARS, PageAnalyzer};
use crate::config::Config;
use crate::data_models::{CrawlReport, Document, IndexCache};
use crate::error::SkipReason;

/// Pages whose normalized text is this short or shorter are not indexed.
pub const MIN_TEXT_CHARS: usize = 200;

/// Source of raw HTML for the crawler.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, SkipReason>;
}

/// Fetches pages over HTTP with a per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build crawl HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, SkipReason> {
        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_reqwest_error)?;
        let status = res.status();
        if !status.is_success() {
            return Err(SkipReason::Status(status.as_u16()));
        }
        res.text().await.map_err(classify_reqwest_error)
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> SkipReason {
    if e.is_timeout() {
        SkipReason::Timeout
    } else {
        SkipReason::Fetch(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub root: String,
    pub allowed_hosts: Vec<String>,
    pub max_pages: usize,
    pub min_text_chars: usize,
    pub max_text_chars: usize,
}

impl CrawlSettings {
    pub fn new(root: impl Into<String>, allowed_hosts: Vec<String>, max_pages: usize) -> Self {
        Self {
            root: root.into(),
            allowed_hosts,
            max_pages,
            min_text_chars: MIN_TEXT_CHARS,
            max_text_chars: MAX_TEXT_CHARS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.kb_root.clone(),
            config.kb_allowed_hosts.clone(),
            config.kb_max_pages,
        )
    }
}

/// Breadth-first crawler over a single allow-listed knowledge-base site.
///
/// One URL is fetched at a time. Every per-page failure is a [`SkipReason`] that gets recorded
/// in the crawl report; none of them stop the crawl.
pub struct Crawler {
    settings: CrawlSettings,
    root: Option<Url>,
    fetcher: Arc<dyn PageFetcher>,
    analyzer: PageAnalyzer,
}

impl Crawler {
    pub fn new(settings: CrawlSettings, fetcher: Arc<dyn PageFetcher>) -> Crawler {
        let analyzer = PageAnalyzer::with_max_chars(settings.max_text_chars);
        let root = match Url::parse(&settings.root) {
            Ok(root) => Some(root),
            Err(e) => {
                log::error!("invalid kb root {:?}: {e}", settings.root);
                None
            }
        };
        Crawler {
            settings,
            root,
            fetcher,
            analyzer,
        }
    }

    /// Runs a full crawl. Never fails: an unusable root yields an empty cache.
    pub async fn build(&self) -> IndexCache {
        log::info!("building kb index from {}", self.settings.root);
        let cache = self.crawl().await;
        log::info!(
            "kb index built: {} documents, {} pages visited, {} skipped",
            cache.documents.len(),
            cache.report.visited,
            cache.report.skipped.len()
        );
        cache
    }

    async fn crawl(&self) -> IndexCache {
        let mut documents: Vec<Document> = Vec::new();
        let mut report = CrawlReport::default();

        let Some(root) = self.root.clone() else {
            report.skip(self.settings.root.as_str(), SkipReason::InvalidUrl);
            return IndexCache::new(documents, report);
        };

        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<Url> = VecDeque::from([root]);

        while documents.len() < self.settings.max_pages {
            let Some(url) = frontier.pop_front() else {
                break;
            };
            if !visited.insert(url.to_string()) {
                continue;
            }
            report.visited += 1;

            let page = match self.visit(&url).await {
                Ok(page) => page,
                Err(reason) => {
                    log::debug!("skipping {url}: {reason}");
                    report.skip(url.as_str(), reason);
                    continue;
                }
            };

            for link in &page.links {
                if self.in_scope(link) && !visited.contains(link.as_str()) {
                    frontier.push_back(link.clone());
                }
            }

            match self.to_document(&url, page) {
                Ok(doc) => {
                    log::info!("indexed {url}");
                    documents.push(doc);
                }
                Err(reason) => {
                    log::debug!("skipping {url}: {reason}");
                    report.skip(url.as_str(), reason);
                }
            }
        }

        for (url, reason) in &report.skipped {
            log::warn!("kb crawl skipped {url}: {reason}");
        }

        IndexCache::new(documents, report)
    }

    async fn visit(&self, url: &Url) -> Result<AnalyzedPage, SkipReason> {
        if !self.is_allowed(url) {
            return Err(SkipReason::DisallowedHost);
        }
        let html = self.fetcher.fetch(url).await?;
        self.analyzer
            .analyze(&html, url)
            .map_err(|e| SkipReason::Parse(e.to_string()))
    }

    fn to_document(&self, url: &Url, page: AnalyzedPage) -> Result<Document, SkipReason> {
        let chars = page.text.chars().count();
        if chars <= self.settings.min_text_chars {
            return Err(SkipReason::TooShort(chars));
        }
        Ok(Document::new(url.to_string(), page.title, page.text))
    }

    /// The host must exactly match one of the allowed hostnames.
    pub fn is_allowed(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => self
                .settings
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host)),
            None => false,
        }
    }

    /// Allowed and located under the root URL, compared in normalized form.
    pub fn in_scope(&self, url: &Url) -> bool {
        match &self.root {
            Some(root) => self.is_allowed(url) && url.as_str().starts_with(root.as_str()),
            None => false,
        }
    }
}
