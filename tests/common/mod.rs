#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use kbassist::crawler::{CrawlSettings, PageFetcher};
use kbassist::data_models::Document;
use kbassist::error::{AssistError, SkipReason};
use kbassist::llm::ChatModel;

pub const HOST: &str = "kb.example.com";
pub const ROOT: &str = "https://kb.example.com/kb";

/// In-memory website. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, Result<String, SkipReason>>,
    fetched: Mutex<Vec<String>>,
    fetches: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), Ok(html));
        self
    }

    pub fn failing(mut self, url: &str, reason: SkipReason) -> Self {
        self.pages.insert(url.to_string(), Err(reason));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> Result<String, SkipReason> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .unwrap_or(Err(SkipReason::Status(404)))
    }
}

/// `n` words of filler, long enough to pass the minimum text length for n >= 40.
pub fn filler(n: usize) -> String {
    (0..n)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn html_page(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!(
        "<html><head><title>{title}</title></head><body><p>{body}</p>{anchors}</body></html>"
    )
}

pub fn settings(max_pages: usize) -> CrawlSettings {
    CrawlSettings::new(ROOT, vec![HOST.to_string()], max_pages)
}

pub fn doc(url: &str, title: &str, text: &str) -> Document {
    Document::new(url.to_string(), title.to_string(), text.to_string())
}

pub enum Reply {
    Answer(String),
    MissingKey,
    Upstream(u16, String),
}

/// Chat model double that records every prompt it receives.
pub struct FakeModel {
    reply: Reply,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeModel {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        match &self.reply {
            Reply::Answer(a) => Ok(a.clone()),
            Reply::MissingKey => Err(AssistError::MissingCredential("LLM_API_KEY")),
            Reply::Upstream(status, body) => Err(AssistError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
