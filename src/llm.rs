//! OpenAI-compatible chat completions client (Groq by default).

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::AssistError;

/// Returned when the model answers with nothing usable.
pub const NO_ANSWER: &str = "No answer";

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends one system instruction and one user message; returns the trimmed answer text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistError>;
}

pub struct ChatCompletionsClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build model HTTP client")?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
            client,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.llm_api_key.clone(),
            &config.llm_base_url,
            &config.llm_model,
            config.llm_temperature,
            config.llm_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for ChatCompletionsClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AssistError::MissingCredential("LLM_API_KEY"));
        };

        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        log::debug!("calling {} with model {}", self.endpoint(), self.model);
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("model request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AssistError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: Value = resp
            .json()
            .await
            .context("model response was not valid JSON")?;
        Ok(answer_text(&data))
    }
}

/// `choices[0].message.content`, trimmed, or [`NO_ANSWER`].
pub fn answer_text(data: &Value) -> String {
    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_ANSWER)
        .to_string()
}
