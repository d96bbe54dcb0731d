//! Lazy token-refresh state machine, shared by the session-token and OAuth
//! connectors.
//!
//! Lifecycle: `Missing → (refresh) → Valid → (time passes) → Expired →
//! (refresh) → Valid → …`. A call that observes `Valid` skips the refresh; a
//! call that observes `Missing` or `Expired` performs exactly one refresh
//! attempt before the backend call. A failed refresh leaves the slot
//! untouched, so the very next call retries — no backoff, no cached failure.
//!
//! Expiry is `store time + TTL − safety margin` so we never race the
//! backend's own expiry clock; backends that omit a TTL get a conservative
//! one-hour default.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Subtracted from every TTL so a token is retired before the backend does it.
pub const SAFETY_MARGIN_SECS: i64 = 300;

/// Assumed TTL when the backend reports none.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Refresh decision for a call at a given instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenState {
    /// No token has ever been stored — refresh before calling.
    Missing,
    /// A token exists but its safety window has passed — refresh before calling.
    Expired,
    /// The token is usable as-is.
    Valid(String),
}

#[derive(Clone, Debug)]
struct CachedToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

/// Interior-mutable token slot.
///
/// Shared across concurrent calls to one provider; concurrent refreshes are
/// tolerated and resolve last-writer-wins.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The refresh decision for a call happening at `now`.
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            None => TokenState::Missing,
            Some(cached) if now >= cached.expires_at => TokenState::Expired,
            Some(cached) => TokenState::Valid(cached.secret.clone()),
        }
    }

    /// Store a freshly refreshed token.
    ///
    /// `ttl_seconds` is the backend-reported lifetime; `None` applies the
    /// one-hour default. The safety margin is subtracted either way (a TTL
    /// shorter than the margin yields a token that is already due for
    /// refresh on the next call).
    pub fn store(&self, secret: impl Into<String>, ttl_seconds: Option<i64>, now: DateTime<Utc>) {
        let ttl = ttl_seconds.unwrap_or(DEFAULT_TTL_SECS);
        let window = (ttl - SAFETY_MARGIN_SECS).max(0);
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CachedToken {
            secret: secret.into(),
            expires_at: now + Duration::seconds(window),
        });
    }
}
