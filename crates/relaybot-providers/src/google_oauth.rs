//! Google OAuth connector — a long-lived refresh token is traded for
//! short-lived access tokens, which then authenticate the ChatGPT session.
//!
//! Also hosts the one-time bootstrap helpers (`authorization_url`,
//! `exchange_code`) used by `relaybot auth` to obtain the refresh token in
//! the first place.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use relaybot_core::config::schema::GoogleOAuthConfig;

use crate::conversation::{conversation_body, extract_reply, BROWSER_USER_AGENT};
use crate::error::ProviderError;
use crate::token::{TokenCache, TokenState};
use crate::traits::{diagnostic, ChatProvider};

/// Production token endpoint base.
pub const GOOGLE_AUTH_BASE: &str = "https://oauth2.googleapis.com";

/// Consent page URL for the one-time authorization flow.
pub const GOOGLE_CONSENT_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Chat API base (shared with the session-login connector).
pub const CHAT_API_BASE: &str = "https://chat.openai.com";

/// Scopes requested during the one-time authorization flow.
const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/userinfo.email \
    https://www.googleapis.com/auth/userinfo.profile openid";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Token bundle returned by the one-time code exchange.
#[derive(Debug, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

// ─────────────────────────────────────────────
// GoogleOAuthProvider
// ─────────────────────────────────────────────

/// Connector for ChatGPT Plus authenticated through Google OAuth.
pub struct GoogleOAuthProvider {
    client: reqwest::Client,
    config: GoogleOAuthConfig,
    auth_base: String,
    api_base: String,
    token: TokenCache,
}

impl GoogleOAuthProvider {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        let auth_base = config
            .auth_base
            .clone()
            .unwrap_or_else(|| GOOGLE_AUTH_BASE.to_string());
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| CHAT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            auth_base,
            api_base,
            token: TokenCache::new(),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.auth_base.trim_end_matches('/'))
    }

    fn chat_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    /// Return a usable access token, refreshing first when the cached one is
    /// missing or past its safety window.
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, ProviderError> {
        match self.token.state(Utc::now()) {
            TokenState::Valid(token) => Ok(token),
            TokenState::Missing | TokenState::Expired => self.refresh_access_token(cancel).await,
        }
    }

    /// One refresh-token grant round trip. On failure the cached token is
    /// left untouched, so the next call retries.
    async fn refresh_access_token(
        &self,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        debug!("refreshing Google OAuth access token");

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", self.config.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let request = self.client.post(self.token_url()).form(&params).send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = request => {
                result.map_err(|e| ProviderError::TokenRefresh(e.to_string()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::TokenRefresh(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        let payload: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::TokenRefresh(e.to_string()))?;

        self.token
            .store(&payload.access_token, payload.expires_in, Utc::now());
        info!("Google OAuth access token refreshed");
        Ok(payload.access_token)
    }

    async fn try_respond(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let token = self.access_token(cancel).await?;

        // Establish the ChatGPT session for this access token first.
        let session = self
            .client
            .post(self.chat_url("/api/auth/session"))
            .bearer_auth(&token)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send();

        let session_response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = session => result?,
        };

        let session_status = session_response.status();
        if !session_status.is_success() {
            return Err(ProviderError::Status(session_status));
        }

        let request = self
            .client
            .post(self.chat_url("/backend-api/conversation"))
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
impl ChatProvider for GoogleOAuthProvider {
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
        !self.config.client_id.is_empty()
            && !self.config.client_secret.is_empty()
            && !self.config.refresh_token.is_empty()
    }

    fn name(&self) -> &str {
        "GoogleOAuth"
    }
}

// ─────────────────────────────────────────────
// One-time authorization helpers
// ─────────────────────────────────────────────

/// Build the Google consent URL the operator opens in a browser.
///
/// `state` is an opaque CSRF token echoed back on the redirect; callers
/// generate a fresh one per flow.
pub fn authorization_url(client_id: &str, redirect_uri: &str, state: &str) -> String {
    let mut url = Url::parse(GOOGLE_CONSENT_URL).expect("consent URL constant is valid");
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", OAUTH_SCOPES)
        .append_pair("response_type", "code")
        .append_pair("state", state)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    url.to_string()
}

/// Exchange an authorization code for the token bundle (one-time flow).
pub async fn exchange_code(
    config: &GoogleOAuthConfig,
    code: &str,
) -> Result<GoogleTokens, ProviderError> {
    let auth_base = config
        .auth_base
        .clone()
        .unwrap_or_else(|| GOOGLE_AUTH_BASE.to_string());

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .expect("Failed to build HTTP client");

    let response = client
        .post(format!("{}/token", auth_base.trim_end_matches('/')))
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::TokenRefresh(format!(
            "code exchange returned HTTP {status}"
        )));
    }

    Ok(response.json::<GoogleTokens>().await?)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(auth_base: &str, api_base: &str) -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "cid".into(),
            client_secret: "csec".into(),
            refresh_token: "rtok".into(),
            redirect_uri: "http://localhost:8080/callback".into(),
            auth_base: Some(auth_base.to_string()),
            api_base: Some(api_base.to_string()),
        }
    }

    fn conversation_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "message": { "content": { "parts": [ { "text": text } ] } }
        })
    }

    async fn mount_chat_endpoints(server: &MockServer, text: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/auth/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(expected_calls)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/backend-api/conversation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(conversation_reply(text)))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_name_matches_registry_key() {
        let provider = GoogleOAuthProvider::new(make_config("http://a", "http://b"));
        assert_eq!(provider.name(), "GoogleOAuth");
    }

    #[test]
    fn test_availability_needs_full_triple() {
        assert!(GoogleOAuthProvider::new(make_config("http://a", "http://b")).is_available());

        let mut missing = make_config("http://a", "http://b");
        missing.refresh_token = String::new();
        assert!(!GoogleOAuthProvider::new(missing).is_available());

        assert!(!GoogleOAuthProvider::new(GoogleOAuthConfig::default()).is_available());
    }

    #[test]
    fn test_authorization_url_shape() {
        let url = authorization_url("my-client", "http://localhost:8080/cb", "state-1");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcb"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=state-1"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("userinfo.email"));
        assert!(url.contains("openid"));
    }

    #[tokio::test]
    async fn test_first_call_refreshes_then_chats() {
        let auth_server = MockServer::start().await;
        let chat_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rtok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-123",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&auth_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/auth/session"))
            .and(header("Authorization", "Bearer at-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&chat_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/backend-api/conversation"))
            .and(header("Authorization", "Bearer at-123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(conversation_reply("Bonjour")),
            )
            .expect(1)
            .mount(&chat_server)
            .await;

        let provider =
            GoogleOAuthProvider::new(make_config(&auth_server.uri(), &chat_server.uri()));
        let reply = provider.respond("salut", &CancellationToken::new()).await;

        assert_eq!(reply, "Bonjour");
    }

    #[tokio::test]
    async fn test_access_token_reused_within_ttl() {
        let auth_server = MockServer::start().await;
        let chat_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-once",
                "expires_in": 3600
            })))
            .expect(1) // one refresh across both calls
            .mount(&auth_server)
            .await;

        mount_chat_endpoints(&chat_server, "ok", 2).await;

        let provider =
            GoogleOAuthProvider::new(make_config(&auth_server.uri(), &chat_server.uri()));
        let cancel = CancellationToken::new();

        assert_eq!(provider.respond("a", &cancel).await, "ok");
        assert_eq!(provider.respond("b", &cancel).await, "ok");
    }

    #[tokio::test]
    async fn test_refresh_failure_is_in_band_and_skips_chat() {
        let auth_server = MockServer::start().await;
        let chat_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant"
            })))
            .mount(&auth_server)
            .await;

        mount_chat_endpoints(&chat_server, "never", 0).await;

        let provider =
            GoogleOAuthProvider::new(make_config(&auth_server.uri(), &chat_server.uri()));
        let reply = provider.respond("hi", &CancellationToken::new()).await;

        assert!(reply.starts_with("Error"));
        assert!(reply.contains("access token"));
    }

    #[tokio::test]
    async fn test_session_failure_is_in_band() {
        let auth_server = MockServer::start().await;
        let chat_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-1"
            })))
            .mount(&auth_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/auth/session"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&chat_server)
            .await;

        let provider =
            GoogleOAuthProvider::new(make_config(&auth_server.uri(), &chat_server.uri()));
        let reply = provider.respond("hi", &CancellationToken::new()).await;

        assert!(reply.starts_with("Error"));
        assert!(reply.contains("403"));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let auth_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-x",
                "refresh_token": "rt-x",
                "expires_in": 3599,
                "scope": "openid"
            })))
            .mount(&auth_server)
            .await;

        let config = make_config(&auth_server.uri(), "http://unused");
        let tokens = exchange_code(&config, "the-code").await.unwrap();

        assert_eq!(tokens.access_token, "at-x");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt-x"));
        assert_eq!(tokens.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn test_exchange_code_error() {
        let auth_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&auth_server)
            .await;

        let config = make_config(&auth_server.uri(), "http://unused");
        let err = exchange_code(&config, "bad-code").await.unwrap_err();
        assert!(err.to_string().contains("400"));
    }
}
