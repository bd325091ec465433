use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::{BackendKind, CliConfig};
use crate::extract;
use crate::ollama::OllamaClient;
use crate::openai::OpenAiClient;
use crate::prompts;

/// A chat-completion backend: one prompt in, one reply text out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Review-oriented front end over a [`ChatBackend`]. Queries never fail
/// at the call site; transport and parse problems come back as
/// structured error records so one bad reply cannot abort a review.
pub struct ReviewAgent {
    backend: Box<dyn ChatBackend>,
    model: String,
}

impl ReviewAgent {
    pub fn new(backend: Box<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(config: &CliConfig) -> Result<Self> {
        let backend: Box<dyn ChatBackend> = match config.backend {
            BackendKind::OpenAi => Box::new(OpenAiClient::from_config(config)?),
            BackendKind::Ollama => Box::new(OllamaClient::from_config(config)),
        };
        Ok(Self::new(backend, config.model.name.clone()))
    }

    /// Model name used for queries, recorded in reports.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Send one prompt and shape the reply.
    ///
    /// With `parse_json` the reply goes through fence extraction and
    /// JSON parsing; a reply that will not parse becomes
    /// `{"error": "json_parse_error", "raw_response": <prefix>}`. Without
    /// it the reply text is wrapped as `{"response": <text>}`. Transport
    /// failures become `{"error": <message>}` in both modes.
    pub async fn query(&self, prompt: &str, parse_json: bool) -> Value {
        let content = match self.backend.complete(prompt).await {
            Ok(content) => content,
            Err(err) => {
                warn!("query to {} backend failed: {:#}", self.backend.name(), err);
                return json!({ "error": format!("{:#}", err) });
            }
        };

        if !parse_json {
            return json!({ "response": content });
        }

        match extract::extract_and_parse(&content) {
            Ok(value) => value,
            Err(err) => {
                warn!("{} reply was not valid JSON", self.backend.name());
                err.into_value()
            }
        }
    }

    pub async fn detect_bugs(&self, code: &str, language: &str) -> Value {
        self.query(&prompts::bug_detection(code, language), true).await
    }

    pub async fn suggest_optimizations(&self, code: &str, language: &str) -> Value {
        self.query(&prompts::optimization(code, language), true).await
    }

    /// Plain-text summary of the finding counts. Falls back to a stock
    /// sentence when the backend fails.
    pub async fn generate_summary(&self, bug_count: usize, opt_count: usize) -> String {
        let reply = self.query(&prompts::summary(bug_count, opt_count), false).await;
        reply
            .get("response")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "No summary generated".to_string())
    }
}
