//! `relaybot status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use relaybot_core::config::{get_config_path, load_config};
use relaybot_providers::{
    ChatGptPlusProvider, ChatProvider, GoogleOAuthProvider, OpenRouterProvider,
    ProviderRegistry,
};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "Relaybot Status".cyan().bold());
    println!();

    // Config
    let config_exists = config_path.exists();
    println!(
        "  {:<12} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    // Telegram
    let telegram_status = if config.telegram.token.is_empty() {
        "· token missing".dimmed().to_string()
    } else {
        format!("{} (token set)", "✓".green())
    };
    println!("  {:<12} {}", "Telegram:".bold(), telegram_status);

    // Providers: (name, registered?, available?)
    println!();
    println!("  {}", "Providers:".bold());

    let statuses: Vec<(&str, bool, bool)> = vec![
        (
            "OpenRouter",
            config.providers.open_router.is_some(),
            config
                .providers
                .open_router
                .as_ref()
                .map(|cfg| OpenRouterProvider::new(cfg.clone()).is_available())
                .unwrap_or(false),
        ),
        (
            "ChatGPTPlus",
            config.providers.chatgpt_plus.is_some(),
            config
                .providers
                .chatgpt_plus
                .as_ref()
                .map(|cfg| ChatGptPlusProvider::new(cfg.clone()).is_available())
                .unwrap_or(false),
        ),
        (
            "GoogleOAuth",
            config.providers.google_oauth.is_some(),
            config
                .providers
                .google_oauth
                .as_ref()
                .map(|cfg| GoogleOAuthProvider::new(cfg.clone()).is_available())
                .unwrap_or(false),
        ),
    ];

    for (name, registered, available) in &statuses {
        let status = if *available {
            format!("{} available", "✓".green())
        } else if *registered {
            "· registered, credentials missing".yellow().to_string()
        } else {
            "· not configured".dimmed().to_string()
        };
        println!("    {:<14} {}", name, status);
    }

    // Selection
    println!();
    match ProviderRegistry::from_config(&config) {
        Ok(registry) => {
            println!("  {:<12} {}", "Selected:".bold(), registry.current());
        }
        Err(e) => {
            println!("  {:<12} {}", "Selected:".bold(), e.to_string().red());
        }
    }
    println!(
        "  {:<12} default: {} | switching: {}",
        "Policy:".bold(),
        config.chat.default_provider.clone().dimmed(),
        if config.chat.enable_switching {
            "enabled".dimmed().to_string()
        } else {
            "disabled".dimmed().to_string()
        }
    );

    println!();

    Ok(())
}
