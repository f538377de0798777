use std::env;

use log::{debug, error, info};

use crate::error::Result;

const DEFAULT_PREFIX: &str = "!";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub prefix: String,
    pub site_api_url: String,
    pub site_api_key: String,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let site_api_url = env::var("SITE_API_URL").map_err(|e| {
            error!("Failed to load SITE_API_URL from environment: {e}");
            e
        })?;

        let site_api_key = env::var("SITE_API_KEY").map_err(|e| {
            error!("Failed to load SITE_API_KEY from environment: {e}");
            e
        })?;

        let prefix = parse_prefix(env::var("BOT_PREFIX").ok());

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("Site API URL: {site_api_url}");
        debug!("Site API key length: {} characters", site_api_key.len());
        debug!("Command prefix: {prefix}");

        Ok(Self {
            discord_token,
            prefix,
            site_api_url,
            site_api_key,
        })
    }
}

fn parse_prefix(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_defaults_when_unset_or_blank() {
        assert_eq!(parse_prefix(None), "!");
        assert_eq!(parse_prefix(Some("   ".to_string())), "!");
    }

    #[test]
    fn prefix_is_trimmed() {
        assert_eq!(parse_prefix(Some(" ?? ".to_string())), "??");
    }
}
