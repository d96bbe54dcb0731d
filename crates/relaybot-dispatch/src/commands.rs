//! Operator command interpreter.
//!
//! A line starting with `/` is split into whitespace-separated tokens and the
//! first token (case-insensitively) selects a handler. This is a pure
//! function of (command text, registry state) → reply text; the only side
//! effect is a possible selection change through `switch_to`.
//!
//! When a `/switch` target fails the availability check, the reply reports
//! the failure and names the provider still in use (rather than claiming
//! success) — see DESIGN.md for the divergence note.

use relaybot_providers::ProviderRegistry;

/// Commands start with this character.
pub const COMMAND_PREFIX: char = '/';

/// Whether a piece of inbound text should be treated as a command.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with(COMMAND_PREFIX)
}

/// Execute a command line against the registry and produce the reply.
pub fn execute(registry: &ProviderRegistry, switching_enabled: bool, text: &str) -> String {
    let mut tokens = text.trim().split_whitespace();
    let head = tokens.next().unwrap_or("");
    let command = head.trim_start_matches(COMMAND_PREFIX).to_lowercase();

    match command.as_str() {
        "providers" => list_providers(registry),
        "current" => format!("Current provider: {}", registry.current()),
        "switch" => switch(registry, switching_enabled, tokens.next()),
        "help" => help_text(),
        _ => format!(
            "Unknown command: {head}. Send /help for the list of commands."
        ),
    }
}

fn list_providers(registry: &ProviderRegistry) -> String {
    let mut reply = String::from("Available providers:");
    for name in registry.list_available() {
        reply.push('\n');
        reply.push_str("  ");
        reply.push_str(&name);
    }
    reply
}

fn switch(registry: &ProviderRegistry, switching_enabled: bool, target: Option<&str>) -> String {
    let Some(target) = target else {
        return "Usage: /switch <provider>".to_string();
    };

    if !switching_enabled {
        return "Provider switching is disabled.".to_string();
    }

    if registry.switch_to(target) {
        format!("Switched to provider: {target}")
    } else {
        format!(
            "Provider {target} is unavailable or unknown; still using {}.",
            registry.current()
        )
    }
}

fn help_text() -> String {
    "Relaybot commands:\n\
     /providers — list available providers\n\
     /current — show the active provider\n\
     /switch <provider> — switch the active provider\n\
     /help — show this message"
        .to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
