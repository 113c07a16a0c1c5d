use anyhow::Result;
use axum::{Router, routing::post};
use chrono::Duration;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::crawler::{CrawlSettings, Crawler, HttpFetcher};
use crate::indexer::KnowledgeBase;
use crate::llm::{ChatCompletionsClient, ChatModel};
use crate::query_engine::QueryEngine;

pub mod handlers;
pub mod models;

pub use models::AssistSettings;

/// Everything a request handler needs, shared behind an `Arc`.
pub struct AppState {
    pub knowledge_base: Arc<KnowledgeBase>,
    pub query_engine: QueryEngine,
    pub model: Arc<dyn ChatModel>,
    pub settings: AssistSettings,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.kb_user_agent, config.kb_fetch_timeout)?;
        let crawler = Crawler::new(CrawlSettings::from_config(config), Arc::new(fetcher));
        Ok(Self {
            knowledge_base: Arc::new(KnowledgeBase::new(crawler, index_ttl(config.kb_ttl))),
            query_engine: QueryEngine::default(),
            model: Arc::new(ChatCompletionsClient::from_config(config)?),
            settings: AssistSettings {
                max_snippets: config.kb_max_snippets,
                default_brand: config.default_brand.clone(),
                support_url: config.support_url.clone(),
                local_fallback: config.local_fallback,
            },
        })
    }
}

/// Out-of-range TTLs are clamped so the index is never considered stale.
fn index_ttl(ttl: std::time::Duration) -> Duration {
    Duration::from_std(ttl).unwrap_or_else(|_| {
        log::warn!("KB_TTL_SECS {} is out of range, never refreshing", ttl.as_secs());
        Duration::MAX
    })
}

pub fn create_router(state: Arc<AppState>, static_dir: &str) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes; other methods get 405 with an Allow header
        .route("/api/assist", post(handlers::assist_handler))
        .with_state(state)
        // Static file serving for the chat UI
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
