//! Chat backend connectors for Relaybot.
//!
//! Every backend implements [`traits::ChatProvider`] — a small capability set
//! (`respond`/`is_available`/`name`) that keeps auth and wire formats inside
//! the connector. The [`registry::ProviderRegistry`] owns all connectors plus
//! the process-wide active-provider selection and its failover policy.
//!
//! # Architecture
//!
//! - [`traits::ChatProvider`] — trait all backends implement
//! - [`token::TokenCache`] — shared lazy token-refresh state machine
//! - [`openrouter::OpenRouterProvider`] — static API key
//! - [`chatgpt_plus::ChatGptPlusProvider`] — email/password session login
//! - [`google_oauth::GoogleOAuthProvider`] — OAuth refresh-token grant
//! - [`registry::ProviderRegistry`] — construction, selection, failover

pub mod chatgpt_plus;
mod conversation;
pub mod error;
pub mod google_oauth;
pub mod openrouter;
pub mod registry;
pub mod token;
pub mod traits;

// Re-export main types for convenience
pub use chatgpt_plus::ChatGptPlusProvider;
pub use error::ProviderError;
pub use google_oauth::GoogleOAuthProvider;
pub use openrouter::OpenRouterProvider;
pub use registry::{ProviderRegistry, RegistryError};
pub use token::{TokenCache, TokenState};
pub use traits::ChatProvider;
