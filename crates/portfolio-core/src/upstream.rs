//! Upstream completion API: OpenAI-compatible chat completions (OpenRouter by default).
//!
//! `CompletionClient` is the seam the chat gateway calls through; `OpenRouterClient`
//! is the reqwest implementation. Status, timeout, and parse failures are mapped onto
//! `ChatError` here so callers never see transport types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ChatConfig, DEFAULT_APP_TITLE, DEFAULT_HTTP_REFERER};
use crate::conversation::{ConversationTurn, Role};
use crate::error::ChatError;

/// Wire message: `{role, content}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

impl From<ConversationTurn> for ChatMessage {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the full message list (system first) and return the assistant reply.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ChatError>;
}

pub struct OpenRouterClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    http_referer: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Unknown(format!("HTTP client init: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into().trim().to_string(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 500,
            http_referer: DEFAULT_HTTP_REFERER.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
        })
    }

    pub fn from_config(cfg: &ChatConfig) -> Result<Self, ChatError> {
        Ok(Self::new(
            cfg.openrouter_url.as_str(),
            cfg.openrouter_api_key.as_str(),
            cfg.model.as_str(),
            cfg.request_timeout(),
        )?
        .with_sampling(cfg.temperature, cfg.max_tokens)
        .with_attribution(&cfg.http_referer, &cfg.app_title))
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// OpenRouter app attribution headers (`HTTP-Referer`, `X-Title`).
    pub fn with_attribution(mut self, referer: &str, title: &str) -> Self {
        self.http_referer = referer.to_string();
        self.app_title = title.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn transport_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::Unknown(format!("upstream request: {}", e))
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ChatError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.http_referer)
            .header("X-Title", &self.app_title)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %detail.chars().take(200).collect::<String>(),
                "upstream returned non-success status"
            );
            return Err(ChatError::Upstream {
                status: status.as_u16(),
            });
        }

        let text = res.text().await.map_err(transport_error)?;
        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ChatError::Unknown(format!("upstream response parse: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| {
                ChatError::Unknown("upstream response had no choices[0].message.content".into())
            })
    }
}
