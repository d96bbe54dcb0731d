//! Relaybot channels — chat platform integration.
//!
//! This crate provides:
//! - **base**: the `Channel` trait the relay loop is wired against
//! - **manager**: `ChannelManager` — lifecycle orchestration and outbound
//!   message routing
//! - **telegram**: the Telegram long-polling channel
//! - **formatting**: reply splitting for platform length limits

pub mod base;
pub mod formatting;
pub mod manager;
pub mod telegram;

pub use base::Channel;
pub use manager::ChannelManager;
pub use telegram::TelegramChannel;
