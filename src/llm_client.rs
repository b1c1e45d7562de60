//! LLM Client for trait analysis
//!
//! Talks to the Anthropic Messages API. One call per analysis, no retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider base URL, without the `/v1/messages` suffix
    pub api_base: String,
    /// Checked on every request, so a missing key fails the request and not startup
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: ANTHROPIC_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base.trim_end_matches('/'))
    }

    /// The configured key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Something that turns a prompt into model output text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Anthropic Messages API client
pub struct AnthropicClient {
    client: Client,
    config: LlmConfig,
}

impl AnthropicClient {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            "LLM client: model={}, max_tokens={}",
            config.model, config.max_tokens
        );
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.config.api_key().ok_or(AnalysisError::MissingApiKey)?;

        debug!("Calling LLM: {} ({} prompt bytes)", self.config.model, prompt.len());

        let resp = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&MessagesRequest {
                model: &self.config.model,
                max_tokens: self.config.max_tokens,
                messages: vec![Message {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!("API error response ({}): {}", status, body);
            return Err(AnalysisError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await?;
        let data: MessagesResponse = serde_json::from_str(&raw)
            .map_err(|e| AnalysisError::MalformedEnvelope(e.to_string()))?;

        if let Some(usage) = &data.usage {
            info!(
                "LLM response: model={}, {} input / {} output tokens",
                data.model.as_deref().unwrap_or(&self.config.model),
                usage.input_tokens,
                usage.output_tokens
            );
        }

        data.content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or(AnalysisError::EmptyContent)
    }
}
