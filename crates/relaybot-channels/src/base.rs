//! Channel trait — the abstract interface a chat channel must implement.
//!
//! A channel:
//! - `start()` — begins listening for incoming messages (long-running)
//! - `stop()` — graceful shutdown
//! - `send()` — delivers an outbound reply to the platform
//! - `name()` — channel identifier matching config keys

use async_trait::async_trait;
use relaybot_core::bus::types::OutboundMessage;

/// Every chat channel implements this trait.
///
/// The `ChannelManager` holds `Arc<dyn Channel>` and orchestrates
/// start/stop/send across all registered channels.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Unique channel name (e.g. "telegram").
    ///
    /// Must match the key used in `OutboundMessage.channel`.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    ///
    /// A long-running task that publishes `InboundMessage`s to the message
    /// bus; runs until `stop()` is called.
    async fn start(&self) -> anyhow::Result<()>;

    /// Graceful shutdown — stop listening and clean up resources.
    async fn stop(&self) -> anyhow::Result<()>;

    /// Send an outbound reply through this channel.
    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()>;
}
