//! `relaybot auth` — one-time Google OAuth bootstrap.
//!
//! Without `--code`: prints the consent URL to open in a browser.
//! With `--code`: exchanges the authorization code and prints the refresh
//! token to put into the config.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use uuid::Uuid;

use relaybot_core::config::load_config;
use relaybot_providers::google_oauth::{authorization_url, exchange_code};

/// Run the auth command.
pub async fn run(code: Option<String>) -> Result<()> {
    let config = load_config(None);

    let Some(oauth) = config.providers.google_oauth else {
        bail!(
            "googleOauth section missing from config — add clientId, clientSecret \
             and redirectUri first"
        );
    };

    if oauth.client_id.is_empty() || oauth.redirect_uri.is_empty() {
        bail!("googleOauth.clientId and googleOauth.redirectUri must be set");
    }

    match code {
        None => {
            let state = Uuid::new_v4().to_string();
            let url = authorization_url(&oauth.client_id, &oauth.redirect_uri, &state);

            println!();
            println!("{}", "Open this URL in a browser and grant access:".bold());
            println!();
            println!("  {url}");
            println!();
            println!(
                "Then run {} with the code from the redirect.",
                "relaybot auth --code <CODE>".cyan()
            );
            println!();
        }
        Some(code) => {
            let tokens = exchange_code(&oauth, &code)
                .await
                .context("code exchange failed")?;

            println!();
            match tokens.refresh_token {
                Some(refresh_token) => {
                    println!("{}", "Success! Put this in the config:".green().bold());
                    println!();
                    println!("  providers.googleOauth.refreshToken = {refresh_token}");
                }
                None => {
                    println!(
                        "{}",
                        "The exchange succeeded but Google returned no refresh token."
                            .yellow()
                    );
                    println!("Revoke the app's access and run the flow again.");
                }
            }
            println!();
        }
    }

    Ok(())
}
