//! OpenRouter connector — stateless, keyed by a static API key.
//!
//! Talks to the OpenAI-compatible `/chat/completions` endpoint and sends the
//! `HTTP-Referer` header OpenRouter asks applications to identify with.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use relaybot_core::config::schema::OpenRouterConfig;

use crate::error::ProviderError;
use crate::traits::{diagnostic, ChatProvider};

/// Production API base.
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ─────────────────────────────────────────────
// OpenRouterProvider
// ─────────────────────────────────────────────

/// Connector for the OpenRouter chat-completions API.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    config: OpenRouterConfig,
    api_base: String,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterConfig) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| OPENROUTER_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            api_base,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    async fn try_respond(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        debug!(model = %self.config.model, "calling OpenRouter");

        let request = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.http_referer)
            .json(&body)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = request => result?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::MalformedResponse(
                "choices[0].message.content",
            ))
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    async fn respond(&self, prompt: &str, cancel: &CancellationToken) -> String {
        match self.try_respond(prompt, cancel).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(provider = self.name(), error = %e, "backend call failed");
                diagnostic(self.name(), &e)
            }
        }
    }

    fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
