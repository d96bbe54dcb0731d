//! Shared CLI helpers.

use colored::Colorize;

/// Print the startup banner.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Relaybot".cyan().bold(), version.dimmed());
    println!();
}
