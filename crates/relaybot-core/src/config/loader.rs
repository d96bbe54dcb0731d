//! Config loader — reads `~/.relaybot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `RelayConfig::default()`)
//! 2. JSON file at `~/.relaybot/config.json`
//! 3. Environment variables `RELAYBOT_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{
    ChatGptPlusConfig, GoogleOAuthConfig, OpenRouterConfig, RelayConfig,
};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `RelayConfig::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config(path: Option<&Path>) -> RelayConfig {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> RelayConfig {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(RelayConfig::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(RelayConfig::default());
        }
    };

    let config: RelayConfig = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(RelayConfig::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &RelayConfig, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `RELAYBOT_<SECTION>__<FIELD>` (double underscore as
/// delimiter). Setting a provider credential via env var materializes that
/// provider's section if the JSON didn't carry one.
///
/// Supported overrides:
/// - `RELAYBOT_TELEGRAM__TOKEN` → `telegram.token`
/// - `RELAYBOT_PROVIDERS__OPENROUTER__API_KEY` / `__MODEL` / `__HTTP_REFERER`
/// - `RELAYBOT_PROVIDERS__CHATGPTPLUS__EMAIL` / `__PASSWORD`
/// - `RELAYBOT_PROVIDERS__GOOGLEOAUTH__CLIENT_ID` / `__CLIENT_SECRET` /
///   `__REFRESH_TOKEN` / `__REDIRECT_URI`
/// - `RELAYBOT_CHAT__DEFAULT_PROVIDER` → `chat.default_provider`
/// - `RELAYBOT_CHAT__ENABLE_SWITCHING` → `chat.enable_switching`
fn apply_env_overrides(mut config: RelayConfig) -> RelayConfig {
    if let Ok(val) = std::env::var("RELAYBOT_TELEGRAM__TOKEN") {
        config.telegram.token = val;
    }

    // OpenRouter
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__OPENROUTER__API_KEY") {
        config
            .providers
            .open_router
            .get_or_insert_with(OpenRouterConfig::default)
            .api_key = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__OPENROUTER__MODEL") {
        config
            .providers
            .open_router
            .get_or_insert_with(OpenRouterConfig::default)
            .model = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__OPENROUTER__HTTP_REFERER") {
        config
            .providers
            .open_router
            .get_or_insert_with(OpenRouterConfig::default)
            .http_referer = val;
    }

    // ChatGPT Plus
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__CHATGPTPLUS__EMAIL") {
        config
            .providers
            .chatgpt_plus
            .get_or_insert_with(ChatGptPlusConfig::default)
            .email = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__CHATGPTPLUS__PASSWORD") {
        config
            .providers
            .chatgpt_plus
            .get_or_insert_with(ChatGptPlusConfig::default)
            .password = val;
    }

    // Google OAuth
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__GOOGLEOAUTH__CLIENT_ID") {
        config
            .providers
            .google_oauth
            .get_or_insert_with(GoogleOAuthConfig::default)
            .client_id = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__GOOGLEOAUTH__CLIENT_SECRET") {
        config
            .providers
            .google_oauth
            .get_or_insert_with(GoogleOAuthConfig::default)
            .client_secret = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__GOOGLEOAUTH__REFRESH_TOKEN") {
        config
            .providers
            .google_oauth
            .get_or_insert_with(GoogleOAuthConfig::default)
            .refresh_token = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_PROVIDERS__GOOGLEOAUTH__REDIRECT_URI") {
        config
            .providers
            .google_oauth
            .get_or_insert_with(GoogleOAuthConfig::default)
            .redirect_uri = val;
    }

    // Selection
    if let Ok(val) = std::env::var("RELAYBOT_CHAT__DEFAULT_PROVIDER") {
        config.chat.default_provider = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_CHAT__ENABLE_SWITCHING") {
        config.chat.enable_switching = val == "true" || val == "1";
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
