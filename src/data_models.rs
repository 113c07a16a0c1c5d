use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::SkipReason;

/// A crawled knowledge-base page.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub text: String,
}

impl Document {
    pub fn new(url: String, title: String, text: String) -> Document {
        Document { url, title, text }
    }
}

/// What happened during one crawl pass, besides the documents it produced.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub visited: usize,
    pub skipped: Vec<(String, SkipReason)>,
}

impl CrawlReport {
    pub fn skip(&mut self, url: impl Into<String>, reason: SkipReason) {
        self.skipped.push((url.into(), reason));
    }
}

/// One complete crawl of the knowledge base. Never mutated after the build.
#[derive(Debug, Clone)]
pub struct IndexCache {
    pub documents: Vec<Document>,
    pub built_at: DateTime<Utc>,
    pub report: CrawlReport,
}

impl IndexCache {
    pub fn new(documents: Vec<Document>, report: CrawlReport) -> IndexCache {
        IndexCache {
            documents,
            built_at: Utc::now(),
            report,
        }
    }

    pub fn empty() -> IndexCache {
        IndexCache::new(vec![], CrawlReport::default())
    }

    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.built_at > ttl
    }
}

/// A scored document cut down to what goes into a prompt.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Snippet {
    pub url: String,
    pub title: String,
    pub excerpt: String,
}

#[test]
fn test_is_stale() {
    let mut cache = IndexCache::empty();
    let now = Utc::now();
    cache.built_at = now - Duration::hours(13);
    assert!(cache.is_stale(Duration::hours(12), now));
    assert!(!cache.is_stale(Duration::hours(14), now));

    cache.built_at = now;
    assert!(!cache.is_stale(Duration::hours(12), now));
}

#[test]
fn test_snippet_serializes_to_json() {
    let snippet = Snippet {
        url: "https://kb.example.com/kb/printer".to_string(),
        title: "Printer".to_string(),
        excerpt: "Power cycle".to_string(),
    };
    let value = serde_json::to_value(&snippet).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "url": "https://kb.example.com/kb/printer",
            "title": "Printer",
            "excerpt": "Power cycle"
        })
    );

    let doc = Document::new("u".into(), "t".into(), "body".into());
    assert_eq!(serde_json::to_value(&doc).unwrap()["text"], "body");
}
