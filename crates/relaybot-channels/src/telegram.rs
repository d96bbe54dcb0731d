//! Telegram channel — bot integration via `teloxide`.
//!
//! Features:
//! - Long polling (no webhook/public IP needed)
//! - Allow-list by user ID or username
//! - Typing indicator while the relay processes
//! - Reply splitting for >4096 char responses
//!
//! All text — including `/commands` — is forwarded to the message bus; the
//! relay loop owns command handling, the channel only moves messages.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ChatAction, UpdateKind};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use relaybot_core::bus::queue::MessageBus;
use relaybot_core::bus::types::{InboundMessage, OutboundMessage};

use crate::base::Channel;
use crate::formatting::split_message;

/// Telegram message length limit.
const TELEGRAM_MAX_LEN: usize = 4096;

// ─────────────────────────────────────────────
// TelegramChannel
// ─────────────────────────────────────────────

/// Telegram bot channel using long polling via `teloxide`.
pub struct TelegramChannel {
    /// Bot token from @BotFather.
    token: String,
    /// Message bus for inbound/outbound.
    bus: Arc<MessageBus>,
    /// Allow-list of user IDs / usernames. Empty = allow everyone.
    allowed_users: Vec<String>,
    /// Shutdown signal.
    shutdown: Arc<Notify>,
}

impl TelegramChannel {
    /// Create a new Telegram channel.
    pub fn new(token: String, bus: Arc<MessageBus>, allowed_users: Vec<String>) -> Self {
        Self {
            token,
            bus,
            allowed_users,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Check if a sender is allowed.
    ///
    /// Sender ID format: "user_id|username" — matches either part.
    /// Empty allow-list = allow everyone.
    fn is_allowed(&self, sender_id: &str) -> bool {
        if self.allowed_users.is_empty() {
            return true;
        }

        if self.allowed_users.iter().any(|u| u == sender_id) {
            return true;
        }

        for part in sender_id.split('|') {
            if !part.is_empty() && self.allowed_users.iter().any(|u| u == part) {
                return true;
            }
        }

        false
    }

    /// Handle an incoming Telegram update.
    async fn handle_update(&self, bot: &Bot, update: &Update) {
        let message = match &update.kind {
            UpdateKind::Message(msg) => msg,
            _ => return,
        };

        let user = match message.from.as_ref() {
            Some(u) => u,
            None => return,
        };

        let user_id = user.id.0.to_string();
        let username = user.username.as_deref().unwrap_or("").to_string();
        let sender_id = format!("{user_id}|{username}");
        let chat_id = message.chat.id.0.to_string();

        if !self.is_allowed(&sender_id) {
            warn!(
                sender = %sender_id,
                chat = %chat_id,
                "telegram message from unauthorized user, ignoring"
            );
            return;
        }

        let text = match message.text() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                debug!("non-text telegram message, ignoring");
                return;
            }
        };

        debug!(
            sender = %sender_id,
            chat = %chat_id,
            content_len = text.len(),
            "telegram inbound message"
        );

        // Show "typing…" while the relay works on the reply
        let _ = bot
            .send_chat_action(ChatId(message.chat.id.0), ChatAction::Typing)
            .await;

        let mut inbound = InboundMessage::new("telegram", &sender_id, &chat_id, &text);
        inbound.metadata.insert("user_id".into(), user_id);
        inbound.metadata.insert("username".into(), username);
        inbound
            .metadata
            .insert("message_id".into(), message.id.0.to_string());

        if let Err(e) = self.bus.publish_inbound(inbound).await {
            error!(error = %e, "failed to publish telegram message to bus");
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!("starting telegram channel (long polling)");

        let bot = Bot::new(&self.token);

        // Register the command menu
        let commands = vec![
            BotCommand::new("providers", "List available providers"),
            BotCommand::new("current", "Show the active provider"),
            BotCommand::new("switch", "Switch the active provider"),
            BotCommand::new("help", "Show available commands"),
        ];
        if let Err(e) = bot.set_my_commands(commands).await {
            warn!(error = %e, "failed to set bot commands menu");
        }

        info!("telegram bot connected, polling for updates");

        // Manual polling loop (we need control over the bus integration)
        let mut offset: i32 = 0;

        loop {
            tokio::select! {
                updates = bot.get_updates().offset(offset).timeout(30).send() => {
                    match updates {
                        Ok(updates) => {
                            for update in &updates {
                                offset = (update.id.0 as i32).wrapping_add(1);
                                self.handle_update(&bot, update).await;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "telegram polling error");
                            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                        }
                    }
                }
                _ = self.shutdown.notified() => {
                    info!("telegram channel shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        info!("stopping telegram channel");
        self.shutdown.notify_waiters();
        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
        let bot = Bot::new(&self.token);
        let chat_id: i64 = msg
            .chat_id
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid telegram chat_id: {}", msg.chat_id))?;

        // Split long replies at the platform limit
        let chunks = split_message(&msg.content, TELEGRAM_MAX_LEN);

        for chunk in &chunks {
            bot.send_message(ChatId(chat_id), chunk).await?;
        }

        debug!(chat_id = chat_id, chunks = chunks.len(), "telegram reply sent");
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
