//! Run command — wires the channel, relay loop, and provider registry.
//!
//! Startup sequence:
//! 1. Load config (Telegram token missing = fatal)
//! 2. Build the provider registry (zero available providers = fatal)
//! 3. Create message bus + relay loop
//! 4. Register the Telegram channel
//! 5. Run: `tokio::select!` of relay loop + channel manager
//! 6. Handle Ctrl+C for graceful shutdown

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use relaybot_channels::{ChannelManager, TelegramChannel};
use relaybot_core::bus::queue::MessageBus;
use relaybot_core::config::load_config;
use relaybot_dispatch::RelayLoop;
use relaybot_providers::ProviderRegistry;

/// Run the bot — starts the relay loop + channel manager.
pub async fn run() -> Result<()> {
    crate::helpers::print_banner();

    // 1. Load config
    let config = load_config(None);

    if config.telegram.token.is_empty() {
        bail!(
            "Telegram bot token not configured. \
             Set telegram.token in ~/.relaybot/config.json or RELAYBOT_TELEGRAM__TOKEN."
        );
    }

    // 2. Build the provider registry — fatal when nothing is available
    let registry = Arc::new(
        ProviderRegistry::from_config(&config)
            .context("no usable chat provider — check the providers section of the config")?,
    );

    // 3. Message bus + relay loop
    let bus = Arc::new(MessageBus::new(100));
    let relay = Arc::new(RelayLoop::new(
        bus.clone(),
        registry.clone(),
        config.chat.enable_switching,
    ));

    // 4. Channel manager with the Telegram channel
    let mut channel_manager = ChannelManager::new(bus.clone());
    channel_manager.register(Arc::new(TelegramChannel::new(
        config.telegram.token.clone(),
        bus.clone(),
        config.telegram.allowed_users.clone(),
    )));

    info!(
        provider = %registry.current(),
        providers = ?registry.names(),
        "relaybot starting"
    );

    println!("  Provider:  {}", registry.current());
    println!("  Available: {}", registry.list_available().join(", "));
    println!(
        "  Switching: {}",
        if config.chat.enable_switching {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("  Ctrl+C to stop");
    println!();

    // 5. Run relay loop + channels concurrently; Ctrl+C shuts down
    tokio::select! {
        _ = relay.run() => {
            info!("relay loop exited");
        }
        result = channel_manager.start_all() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "channel manager error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("  Shutting down...");
            info!("received Ctrl+C, shutting down");
            relay.shutdown();
            channel_manager.stop_all().await;
        }
    }

    println!("  Relaybot stopped. Goodbye!");
    Ok(())
}
