//! Relay loop — consumes inbound messages and produces exactly one reply per
//! message.
//!
//! Each message is handled by its own spawned task, so slow backend calls on
//! one conversation never block another. The registry's selection is shared
//! across those workers by design: provider choice is process-wide.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use relaybot_core::bus::queue::MessageBus;
use relaybot_core::bus::types::{InboundMessage, OutboundMessage};
use relaybot_providers::ProviderRegistry;

use crate::commands;

/// The relay loop: polls the bus, routes to commands or the active provider.
pub struct RelayLoop {
    /// Message bus for inbound/outbound messages.
    bus: Arc<MessageBus>,
    /// Provider registry shared with every worker.
    registry: Arc<ProviderRegistry>,
    /// Whether `/switch` is honored.
    switching_enabled: bool,
    /// Root cancellation token; each worker gets a child.
    cancel: CancellationToken,
}

impl RelayLoop {
    pub fn new(
        bus: Arc<MessageBus>,
        registry: Arc<ProviderRegistry>,
        switching_enabled: bool,
    ) -> Self {
        Self {
            bus,
            registry,
            switching_enabled,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the loop: poll inbound messages, spawn a worker per message.
    ///
    /// Runs until the inbound channel closes or [`shutdown`](Self::shutdown)
    /// is called.
    pub async fn run(&self) {
        info!("relay loop started, waiting for messages");

        loop {
            let msg = tokio::select! {
                msg = self.bus.consume_inbound() => msg,
                _ = self.cancel.cancelled() => {
                    info!("relay loop cancelled");
                    break;
                }
            };

            let Some(msg) = msg else {
                info!("inbound channel closed, relay loop exiting");
                break;
            };

            debug!(
                chat_id = %msg.chat_id,
                content_len = msg.content.len(),
                "received message"
            );

            // One concurrent worker per message; conversations don't block
            // each other.
            let bus = self.bus.clone();
            let registry = self.registry.clone();
            let switching_enabled = self.switching_enabled;
            let cancel = self.cancel.child_token();

            tokio::spawn(async move {
                let reply = Self::handle(&registry, switching_enabled, &msg, &cancel).await;
                let outbound = OutboundMessage::new(&msg.channel, &msg.chat_id, reply);
                if let Err(e) = bus.publish_outbound(outbound).await {
                    error!(error = %e, chat_id = %msg.chat_id, "failed to publish reply");
                }
            });
        }
    }

    /// Cancel in-flight workers and stop the loop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Produce the single reply for one inbound message.
    async fn handle(
        registry: &ProviderRegistry,
        switching_enabled: bool,
        msg: &InboundMessage,
        cancel: &CancellationToken,
    ) -> String {
        if commands::is_command(&msg.content) {
            commands::execute(registry, switching_enabled, &msg.content)
        } else {
            registry.dispatch(&msg.content, cancel).await
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relaybot_providers::ChatProvider;

    struct EchoProvider;

    #[async_trait]
    impl ChatProvider for EchoProvider {
        async fn respond(&self, prompt: &str, _cancel: &CancellationToken) -> String {
            format!("echo: {prompt}")
        }

        fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "Echo"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl ChatProvider for SlowProvider {
        async fn respond(&self, prompt: &str, _cancel: &CancellationToken) -> String {
            if prompt == "slow" {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
            format!("done: {prompt}")
        }

        fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "Slow"
        }
    }

    fn make_loop(provider: Arc<dyn ChatProvider>) -> (Arc<MessageBus>, Arc<RelayLoop>) {
        let bus = Arc::new(MessageBus::new(32));
        let registry = Arc::new(
            ProviderRegistry::new(vec![("Echo".to_string(), provider)], "Echo").unwrap(),
        );
        let relay = Arc::new(RelayLoop::new(bus.clone(), registry, true));
        (bus, relay)
    }

    #[tokio::test]
    async fn test_chat_message_gets_provider_reply() {
        let (bus, relay) = make_loop(Arc::new(EchoProvider));
        let runner = relay.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        bus.publish_inbound(InboundMessage::new("telegram", "u", "c1", "hello"))
            .await
            .unwrap();

        let reply = bus.consume_outbound().await.unwrap();
        assert_eq!(reply.channel, "telegram");
        assert_eq!(reply.chat_id, "c1");
        assert_eq!(reply.content, "echo: hello");

        relay.shutdown();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_command_goes_to_interpreter() {
        let (bus, relay) = make_loop(Arc::new(EchoProvider));
        let runner = relay.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        bus.publish_inbound(InboundMessage::new("telegram", "u", "c1", "/current"))
            .await
            .unwrap();

        let reply = bus.consume_outbound().await.unwrap();
        assert_eq!(reply.content, "Current provider: Echo");

        relay.shutdown();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_one_reply_per_message() {
        let (bus, relay) = make_loop(Arc::new(EchoProvider));
        let runner = relay.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        for i in 0..3 {
            bus.publish_inbound(InboundMessage::new("telegram", "u", "c", format!("m{i}")))
                .await
                .unwrap();
        }

        let mut replies = Vec::new();
        for _ in 0..3 {
            replies.push(bus.consume_outbound().await.unwrap().content);
        }
        replies.sort();
        assert_eq!(replies, vec!["echo: m0", "echo: m1", "echo: m2"]);

        // No extra replies queued
        let extra = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            bus.consume_outbound(),
        )
        .await;
        assert!(extra.is_err(), "expected exactly one reply per message");

        relay.shutdown();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_slow_message_does_not_block_others() {
        let (bus, relay) = make_loop(Arc::new(SlowProvider));
        let runner = relay.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        bus.publish_inbound(InboundMessage::new("telegram", "u", "c1", "slow"))
            .await
            .unwrap();
        bus.publish_inbound(InboundMessage::new("telegram", "u", "c2", "fast"))
            .await
            .unwrap();

        // The fast message's reply arrives while the slow one is in flight
        let first = bus.consume_outbound().await.unwrap();
        assert_eq!(first.content, "done: fast");

        let second = bus.consume_outbound().await.unwrap();
        assert_eq!(second.content, "done: slow");

        relay.shutdown();
        let _ = handle.await;
    }
}
