//! ChatGPT Plus connector — email/password login yielding a short-lived
//! session token, refreshed lazily through [`TokenCache`].

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use relaybot_core::config::schema::ChatGptPlusConfig;

use crate::conversation::{conversation_body, extract_reply, BROWSER_USER_AGENT};
use crate::error::ProviderError;
use crate::token::{TokenCache, TokenState};
use crate::traits::{diagnostic, ChatProvider};

/// Production API base.
pub const CHATGPT_API_BASE: &str = "https://chat.openai.com";

/// Connector for ChatGPT Plus via session login.
pub struct ChatGptPlusProvider {
    client: reqwest::Client,
    config: ChatGptPlusConfig,
    api_base: String,
    session: TokenCache,
}

impl ChatGptPlusProvider {
    pub fn new(config: ChatGptPlusConfig) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| CHATGPT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            api_base,
            session: TokenCache::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    /// Return a usable session token, logging in first when the cached one is
    /// missing or past its safety window.
    async fn session_token(&self, cancel: &CancellationToken) -> Result<String, ProviderError> {
        match self.session.state(Utc::now()) {
            TokenState::Valid(token) => Ok(token),
            TokenState::Missing | TokenState::Expired => self.refresh_session(cancel).await,
        }
    }

    /// One login round trip. On failure the cached token is left untouched,
    /// so the next call retries.
    async fn refresh_session(&self, cancel: &CancellationToken) -> Result<String, ProviderError> {
        debug!("refreshing ChatGPT Plus session token");

        let body = json!({
            "email": self.config.email,
            "password": self.config.password,
        });

        let request = self
            .client
            .post(self.url("/api/auth/session"))
            .json(&body)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = request => {
                result.map_err(|e| ProviderError::SessionRefresh(e.to_string()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::SessionRefresh(format!(
                "login returned HTTP {status}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::SessionRefresh(e.to_string()))?;

        let token = payload
            .get("accessToken")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::SessionRefresh("login response carried no accessToken".to_string())
            })?;

        // The login response reports no TTL; the conservative default applies.
        self.session.store(token, None, Utc::now());
        info!("ChatGPT Plus session token refreshed");
        Ok(token.to_string())
    }

    async fn try_respond(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let token = self.session_token(cancel).await?;

        let request = self
            .client
            .post(self.url("/backend-api/conversation"))
            .bearer_auth(&token)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .json(&conversation_body(prompt))
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = request => result?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let payload: Value = response.json().await?;
        extract_reply(&payload).ok_or(ProviderError::MalformedResponse("message.content.parts"))
    }
}

#[async_trait]
impl ChatProvider for ChatGptPlusProvider {
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
        !self.config.email.is_empty() && !self.config.password.is_empty()
    }

    fn name(&self) -> &str {
        "ChatGPTPlus"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
