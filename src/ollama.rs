use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::agent::ChatBackend;
use crate::config::CliConfig;

/// Client for a local Ollama daemon, speaking its native chat API.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(
            config.ollama.base_url.clone(),
            config.model.name.clone(),
            config.model.temperature,
            config.model.max_tokens,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = self.endpoint();
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            },
        });
        debug!("POST {} (model: {})", endpoint, self.model);

        let response = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    anyhow!(
                        "cannot connect to Ollama at {} (is `ollama serve` running?)",
                        self.base_url
                    )
                } else {
                    anyhow!(err).context(format!("request to {} failed", endpoint))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("HTTP {} from {}: {}", status, endpoint, body.trim()));
        }

        let reply: OllamaChatReply = response
            .json()
            .await
            .with_context(|| format!("malformed chat response from {}", endpoint))?;
        Ok(reply.message.content)
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatReply {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}
