use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::crawler::Crawler;
use crate::data_models::IndexCache;

/// Returns `cache` untouched while it is younger than `ttl`, otherwise crawls again and returns the
/// fresh build. A missing cache always triggers a crawl.
pub async fn refresh_if_stale(
    cache: Option<Arc<IndexCache>>,
    ttl: Duration,
    crawler: &Crawler,
) -> Arc<IndexCache> {
    match cache {
        Some(cache) if !cache.is_stale(ttl, Utc::now()) => cache,
        Some(cache) => {
            log::info!(
                "kb index built at {} is older than {}s, rebuilding",
                cache.built_at,
                ttl.num_seconds()
            );
            Arc::new(crawler.build().await)
        }
        None => Arc::new(crawler.build().await),
    }
}

/// Handle to the knowledge-base index shared by all requests.
///
/// Readers get an immutable snapshot. The lock is never held while crawling, so two requests that
/// both see a stale index may both rebuild it; whichever finishes last is kept.
pub struct KnowledgeBase {
    crawler: Crawler,
    ttl: Duration,
    cache: RwLock<Option<Arc<IndexCache>>>,
}

impl KnowledgeBase {
    pub fn new(crawler: Crawler, ttl: Duration) -> Self {
        Self {
            crawler,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Starts from an already built index, e.g. one loaded during startup.
    pub fn with_cache(crawler: Crawler, ttl: Duration, cache: IndexCache) -> Self {
        Self {
            crawler,
            ttl,
            cache: RwLock::new(Some(Arc::new(cache))),
        }
    }

    /// The current index without triggering a crawl.
    pub async fn cached(&self) -> Option<Arc<IndexCache>> {
        self.cache.read().await.clone()
    }

    /// The current index, rebuilt first when absent or stale.
    pub async fn snapshot(&self) -> Arc<IndexCache> {
        let current = self.cached().await;
        let fresh = refresh_if_stale(current.clone(), self.ttl, &self.crawler).await;

        let unchanged = matches!(&current, Some(c) if Arc::ptr_eq(c, &fresh));
        if !unchanged {
            *self.cache.write().await = Some(fresh.clone());
        }
        fresh
    }
}
