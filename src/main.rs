use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kbassist::api::{AppState, create_router};
use kbassist::config::CONFIG;
use kbassist::crawler::{CrawlSettings, Crawler, HttpFetcher};
use kbassist::query_engine::QueryEngine;

#[derive(Parser)]
#[command(name = "kbassist", about = "Support assistant backed by a crawled knowledge base")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the chat UI and /api/assist
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Crawl the knowledge base once and list what was indexed
    Crawl {
        /// Print the indexed documents as JSON
        #[arg(long)]
        json: bool,
    },
    /// Crawl once and show the snippets selected for a question
    Search {
        question: String,
        #[arg(short, default_value_t = CONFIG.kb_max_snippets)]
        k: usize,
        /// Print the snippets as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also picks up records from the log crate
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(bind).await,
        Command::Crawl { json } => {
            let index = crawler()?.build().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&index.documents)?);
                return Ok(());
            }
            for doc in &index.documents {
                println!("{}\t{}\t{} chars", doc.url, doc.title, doc.text.chars().count());
            }
            for (url, reason) in &index.report.skipped {
                println!("skipped\t{url}\t{reason}");
            }
            Ok(())
        }
        Command::Search { question, k, json } => {
            let index = crawler()?.build().await;
            let snippets = QueryEngine::default().select_top_k(&question, &index.documents, k);
            if json {
                println!("{}", serde_json::to_string_pretty(&snippets)?);
                return Ok(());
            }
            if snippets.is_empty() {
                println!("no matching documents among {}", index.documents.len());
            }
            for (i, s) in snippets.iter().enumerate() {
                println!("{}. [{}] {}\n   {}\n", i + 1, s.title, s.url, s.excerpt);
            }
            Ok(())
        }
    }
}

fn crawler() -> anyhow::Result<Crawler> {
    let fetcher = HttpFetcher::new(&CONFIG.kb_user_agent, CONFIG.kb_fetch_timeout)?;
    Ok(Crawler::new(CrawlSettings::from_config(&CONFIG), Arc::new(fetcher)))
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    if CONFIG.llm_api_key.is_none() {
        tracing::warn!("LLM_API_KEY is not set; /api/assist will not reach the model");
    }
    let state = Arc::new(AppState::from_config(&CONFIG)?);
    let app = create_router(state, &CONFIG.static_dir);

    let addr = bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("listening on {addr}");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
