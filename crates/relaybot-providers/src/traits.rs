//! ChatProvider trait — the capability set every backend connector implements.
//!
//! The conversational surface has a single string reply channel, so a
//! provider never raises for ordinary failures (expired credentials, backend
//! HTTP errors, malformed payloads): it returns a human-readable diagnostic
//! instead, and the caller always has something to relay.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

/// Trait that all chat backends implement.
///
/// Implementations own their credential state (session tokens, access tokens)
/// and refresh it lazily inside `respond`. At most one refresh round trip is
/// performed per call.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a prompt to the backend and return the generated reply.
    ///
    /// Never fails: ordinary errors come back as a diagnostic string starting
    /// with `"Error"`, so the reply is always non-empty and relayable.
    /// Honors `cancel` — on cancellation the call returns promptly without
    /// completing the backend request.
    async fn respond(&self, prompt: &str, cancel: &CancellationToken) -> String;

    /// Whether the minimum configuration to attempt a call is present.
    ///
    /// Pure and fast: never performs I/O, never reflects transient outages.
    fn is_available(&self) -> bool;

    /// Stable identifier, equal to the registry key for the built-in backends.
    fn name(&self) -> &str;
}

/// Render a provider failure as the in-band reply string.
///
/// All diagnostics share the `"Error"` prefix so callers (and tests) can tell
/// them apart from normal replies.
pub fn diagnostic(provider: &str, err: &ProviderError) -> String {
    format!("Error from {provider}: {err}")
}
