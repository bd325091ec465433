use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::agent::ChatBackend;
use crate::config::CliConfig;

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Build from configuration. Fails when the openai backend is
    /// selected without a usable API key, so a misconfigured run stops
    /// before any file is read.
    pub fn from_config(config: &CliConfig) -> Result<Self> {
        let api_key = config.effective_openai_key().ok_or_else(|| {
            anyhow!(
                "backend \"openai\" selected but no API key configured \
                 (set openai.api_key or the OPENAI_API_KEY environment variable)"
            )
        })?;
        Ok(Self::new(
            config.openai.base_url.clone(),
            api_key,
            config.model.name.clone(),
            config.model.temperature,
            config.model.max_tokens,
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = self.endpoint();
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        debug!("POST {} (model: {})", endpoint, self.model);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("HTTP {} from {}: {}", status, endpoint, body.trim()));
        }

        let reply: ChatCompletionReply = response
            .json()
            .await
            .with_context(|| format!("malformed chat completion response from {}", endpoint))?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion response contained no choices"))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
