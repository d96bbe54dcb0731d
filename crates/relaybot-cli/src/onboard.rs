//! `relaybot onboard` — initialize configuration.
//!
//! Creates `~/.relaybot/config.json` with a skeleton the operator fills in:
//! the Telegram token plus one example provider section.

use anyhow::Result;
use colored::Colorize;

use relaybot_core::config::schema::OpenRouterConfig;
use relaybot_core::config::{get_config_path, save_config, RelayConfig};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "Relaybot — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        // Skeleton with an (unfilled) OpenRouter section so the shape is visible
        let mut config = RelayConfig::default();
        config.providers.open_router = Some(OpenRouterConfig::default());

        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!("  Next steps:");
    println!("    1. Put your bot token in telegram.token");
    println!("    2. Fill in at least one provider section (providers.openRouter, ");
    println!("       providers.chatgptPlus, or providers.googleOauth)");
    println!("    3. Run `relaybot status` to check, then `relaybot run`");
    println!();

    Ok(())
}
