//! Provider registry — owns every configured backend connector and the
//! process-wide active-provider selection.
//!
//! The set of registered providers is fixed at construction; only the
//! selection changes at runtime. Selection reads and writes go through a
//! lock so concurrent relay workers never observe a torn name.

use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use relaybot_core::config::RelayConfig;

use crate::chatgpt_plus::ChatGptPlusProvider;
use crate::google_oauth::GoogleOAuthProvider;
use crate::openrouter::OpenRouterProvider;
use crate::traits::ChatProvider;

/// Registry construction failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Nothing useful this process can do — abort before serving traffic.
    #[error("no chat provider is available — configure at least one backend")]
    NoAvailableProviders,
}

struct RegistryEntry {
    name: String,
    provider: Arc<dyn ChatProvider>,
}

/// Owner of all backend connectors and the active-provider selection.
pub struct ProviderRegistry {
    /// Registration order is preserved; the mapping never changes after
    /// construction.
    entries: Vec<RegistryEntry>,
    /// Name resolved at construction: the configured default when usable,
    /// otherwise the first available provider. Always a registered key.
    default_name: String,
    /// Process-wide selection. May transiently point at a provider that has
    /// become unavailable; `dispatch` handles that.
    current: RwLock<String>,
}

impl ProviderRegistry {
    /// Build a registry from explicit providers (also the test seam).
    ///
    /// Fails when zero providers report available. When `default_name` is
    /// unknown or unavailable, silently selects the first available provider
    /// and emits a warning.
    pub fn new(
        providers: Vec<(String, Arc<dyn ChatProvider>)>,
        default_name: &str,
    ) -> Result<Self, RegistryError> {
        let entries: Vec<RegistryEntry> = providers
            .into_iter()
            .map(|(name, provider)| RegistryEntry { name, provider })
            .collect();

        let first_available = entries
            .iter()
            .find(|e| e.provider.is_available())
            .map(|e| e.name.clone())
            .ok_or(RegistryError::NoAvailableProviders)?;

        let usable_default = entries
            .iter()
            .any(|e| e.name == default_name && e.provider.is_available());

        let selected = if usable_default {
            default_name.to_string()
        } else {
            warn!(
                requested = default_name,
                fallback = %first_available,
                "default provider unknown or unavailable, using first available"
            );
            first_available
        };

        info!(provider = %selected, providers = entries.len(), "provider registry initialized");

        Ok(Self {
            entries,
            default_name: selected.clone(),
            current: RwLock::new(selected),
        })
    }

    /// Build the registry from configuration.
    ///
    /// A backend is registered iff its config section is present; a present
    /// section with missing credentials registers a provider that reports
    /// unavailable.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RegistryError> {
        let mut providers: Vec<(String, Arc<dyn ChatProvider>)> = Vec::new();

        if let Some(cfg) = &config.providers.open_router {
            providers.push((
                "OpenRouter".to_string(),
                Arc::new(OpenRouterProvider::new(cfg.clone())),
            ));
        }
        if let Some(cfg) = &config.providers.chatgpt_plus {
            providers.push((
                "ChatGPTPlus".to_string(),
                Arc::new(ChatGptPlusProvider::new(cfg.clone())),
            ));
        }
        if let Some(cfg) = &config.providers.google_oauth {
            providers.push((
                "GoogleOAuth".to_string(),
                Arc::new(GoogleOAuthProvider::new(cfg.clone())),
            ));
        }

        Self::new(providers, &config.chat.default_provider)
    }

    fn get(&self, name: &str) -> Option<&Arc<dyn ChatProvider>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.provider)
    }

    /// All registered provider names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Names of providers currently reporting available, in registration
    /// order — stable run-to-run for a fixed configuration.
    pub fn list_available(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.provider.is_available())
            .map(|e| e.name.clone())
            .collect()
    }

    /// The process-wide selection.
    pub fn current(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The name resolved as default at construction time.
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Change the selection.
    ///
    /// Takes effect only when `name` is registered and currently available;
    /// otherwise the selection is unchanged and `false` comes back. Switching
    /// is advisory — a refused switch is a warning, never a hard error.
    pub fn switch_to(&self, name: &str) -> bool {
        match self.get(name) {
            Some(provider) if provider.is_available() => {
                let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
                *current = name.to_string();
                info!(provider = name, "switched active provider");
                true
            }
            _ => {
                warn!(provider = name, "switch refused: unknown or unavailable");
                false
            }
        }
    }

    /// Relay a prompt through the active provider.
    ///
    /// If the selection has become unavailable since it was made (say, an
    /// exhausted credential with no refresh path), the call goes to the
    /// default entry directly — no full fallback search — and that provider
    /// reports its own failures in-band.
    pub async fn dispatch(&self, prompt: &str, cancel: &CancellationToken) -> String {
        let selected = self.current();

        let provider = match self.get(&selected) {
            Some(provider) if provider.is_available() => provider,
            _ => {
                warn!(
                    provider = %selected,
                    fallback = %self.default_name,
                    "selected provider unavailable, dispatching to default"
                );
                self.get(&self.default_name)
                    .expect("default provider is always a registered key")
            }
        };

        provider.respond(prompt, cancel).await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
