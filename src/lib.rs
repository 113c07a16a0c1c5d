pub mod analyzer;
pub mod api;
pub mod config;
pub mod crawler;
pub mod data_models;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod prompt;
pub mod query_engine;
