//! Configuration schema — one typed record per backend plus bot settings.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.
//!
//! Provider sections are `Option`al: a section that is absent from the JSON
//! means that backend is simply not registered at startup. A section that is
//! present but missing its credentials is registered and reports unavailable.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.relaybot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    pub telegram: TelegramConfig,
    pub providers: ProvidersConfig,
    pub chat: ChatSelectionConfig,
}

// ─────────────────────────────────────────────
// Telegram
// ─────────────────────────────────────────────

/// Telegram bot settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather. Required to serve traffic.
    #[serde(default)]
    pub token: String,
    /// Allow-list of user IDs / usernames. Empty = allow everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Per-backend credential bundles. Absent section = backend not registered.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_router: Option<OpenRouterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chatgpt_plus: Option<ChatGptPlusConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_oauth: Option<GoogleOAuthConfig>,
}

/// OpenRouter — static API key over the chat-completions API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenRouterConfig {
    #[serde(default)]
    pub api_key: String,
    /// Model identifier passed through to OpenRouter.
    #[serde(default = "default_open_router_model")]
    pub model: String,
    /// Sent as the `HTTP-Referer` header, as OpenRouter asks.
    #[serde(default = "default_http_referer")]
    pub http_referer: String,
    /// Custom API base URL (overrides the production endpoint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

fn default_open_router_model() -> String {
    "mistralai/mistral-7b-instruct".to_string()
}

fn default_http_referer() -> String {
    "https://yourapp.com".to_string()
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_open_router_model(),
            http_referer: default_http_referer(),
            api_base: None,
        }
    }
}

/// ChatGPT Plus — email/password login yielding a short-lived session token.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatGptPlusConfig {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Custom API base URL (overrides the production endpoint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// Google OAuth — long-lived refresh token traded for short-lived access tokens.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleOAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Redirect URI registered with the OAuth client (used by `relaybot auth`).
    #[serde(default)]
    pub redirect_uri: String,
    /// Custom token-endpoint base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_base: Option<String>,
    /// Custom chat API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

// ─────────────────────────────────────────────
// Provider selection
// ─────────────────────────────────────────────

/// Process-wide backend selection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatSelectionConfig {
    /// Name of the backend selected at startup.
    #[serde(default = "default_provider_name")]
    pub default_provider: String,
    /// Whether `/switch` is honored at runtime.
    #[serde(default = "default_true")]
    pub enable_switching: bool,
}

fn default_provider_name() -> String {
    "OpenRouter".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ChatSelectionConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider_name(),
            enable_switching: true,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.chat.default_provider, "OpenRouter");
        assert!(config.chat.enable_switching);
        assert!(config.telegram.token.is_empty());
        assert!(config.providers.open_router.is_none());
        assert!(config.providers.chatgpt_plus.is_none());
        assert!(config.providers.google_oauth.is_none());
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "telegram": {
                "token": "bot123:ABC",
                "allowedUsers": ["42", "somebody"]
            },
            "providers": {
                "openRouter": {
                    "apiKey": "sk-or-123",
                    "model": "meta-llama/llama-3",
                    "httpReferer": "https://example.com"
                }
            },
            "chat": {
                "defaultProvider": "OpenRouter",
                "enableSwitching": false
            }
        });

        let config: RelayConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.telegram.token, "bot123:ABC");
        assert_eq!(config.telegram.allowed_users, vec!["42", "somebody"]);

        let or = config.providers.open_router.unwrap();
        assert_eq!(or.api_key, "sk-or-123");
        assert_eq!(or.model, "meta-llama/llama-3");
        assert_eq!(or.http_referer, "https://example.com");

        assert!(!config.chat.enable_switching);
    }

    #[test]
    fn test_absent_provider_sections_are_none() {
        let json = serde_json::json!({
            "providers": {
                "chatgptPlus": { "email": "a@b.c", "password": "hunter2" }
            }
        });

        let config: RelayConfig = serde_json::from_value(json).unwrap();
        assert!(config.providers.open_router.is_none());
        assert!(config.providers.google_oauth.is_none());

        let plus = config.providers.chatgpt_plus.unwrap();
        assert_eq!(plus.email, "a@b.c");
        assert_eq!(plus.password, "hunter2");
    }

    #[test]
    fn test_present_but_empty_section_keeps_defaults() {
        let json = serde_json::json!({
            "providers": { "openRouter": {} }
        });

        let config: RelayConfig = serde_json::from_value(json).unwrap();
        let or = config.providers.open_router.unwrap();
        assert!(or.api_key.is_empty());
        assert_eq!(or.model, "mistralai/mistral-7b-instruct");
        assert_eq!(or.http_referer, "https://yourapp.com");
    }

    #[test]
    fn test_google_oauth_section() {
        let json = serde_json::json!({
            "providers": {
                "googleOauth": {
                    "clientId": "cid",
                    "clientSecret": "csec",
                    "refreshToken": "rtok",
                    "redirectUri": "http://localhost:8080/callback"
                }
            }
        });

        let config: RelayConfig = serde_json::from_value(json).unwrap();
        let go = config.providers.google_oauth.unwrap();
        assert_eq!(go.client_id, "cid");
        assert_eq!(go.client_secret, "csec");
        assert_eq!(go.refresh_token, "rtok");
        assert_eq!(go.redirect_uri, "http://localhost:8080/callback");
        assert!(go.auth_base.is_none());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let mut config = RelayConfig::default();
        config.telegram.token = "tok".into();
        config.providers.open_router = Some(OpenRouterConfig {
            api_key: "sk-or-9".into(),
            ..Default::default()
        });

        let json_str = serde_json::to_string_pretty(&config).unwrap();
        let reloaded: RelayConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(reloaded.telegram.token, "tok");
        assert_eq!(reloaded.providers.open_router.unwrap().api_key, "sk-or-9");
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let mut config = RelayConfig::default();
        config.providers.open_router = Some(OpenRouterConfig::default());

        let json = serde_json::to_value(&config).unwrap();
        assert!(json["chat"].get("defaultProvider").is_some());
        assert!(json["chat"].get("enableSwitching").is_some());
        assert!(json["providers"].get("openRouter").is_some());
        assert!(json["providers"]["openRouter"].get("httpReferer").is_some());
        // Should NOT have snake_case keys
        assert!(json["chat"].get("default_provider").is_none());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: RelayConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.chat.default_provider, "OpenRouter");
        assert!(config.chat.enable_switching);
    }
}
