use crate::media::DEFAULT_PROGRAM;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

pub const TOKEN_ENV: &str = "BOT_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub bot_token: Option<String>,
    pub bot: BotSettings,
    pub transport: TransportConfig,
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BotSettings {
    /// How many recent posts are fetched per request.
    pub fetch_limit: usize,
    /// Thread replies and media groups to the user's message.
    pub thread_replies: bool,
    /// Refuse /start outside of private chats.
    pub private_only: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            fetch_limit: 10,
            thread_replies: true,
            private_only: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Polling,
    Webhook,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TransportConfig {
    pub mode: TransportMode,
    /// Public URL Telegram posts updates to.
    pub webhook_url: Option<String>,
    pub listen_addr: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Polling,
            webhook_url: None,
            listen_addr: "0.0.0.0:8443".to_string(),
        }
    }
}

impl TransportConfig {
    pub fn webhook(&self) -> Result<(SocketAddr, Url)> {
        let url = self
            .webhook_url
            .as_deref()
            .context("transport.webhook_url is required in webhook mode")?;
        let url = Url::parse(url).with_context(|| format!("Invalid webhook URL: {url}"))?;
        let addr = self
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.listen_addr))?;
        Ok((addr, url))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ScraperConfig {
    pub program: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.bot.fetch_limit == 0 {
            anyhow::bail!("bot.fetch_limit must be at least 1");
        }
        if self.transport.mode == TransportMode::Webhook {
            self.transport.webhook()?;
        }
        Ok(())
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }

    /// The bot token from the environment, falling back to the config file.
    pub fn bot_token(&self) -> Result<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| self.bot_token.clone())
            .with_context(|| format!("{TOKEN_ENV} environment variable is required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.bot.fetch_limit, 10);
        assert!(config.bot.thread_replies);
        assert!(config.bot.private_only);
        assert_eq!(config.transport.mode, TransportMode::Polling);
        assert_eq!(config.scraper.program, "gallery-dl");
        assert_eq!(config.get_logging_format(), "json");
    }

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            bot_token = "123:abc"

            [bot]
            fetch_limit = 20
            thread_replies = false

            [transport]
            mode = "webhook"
            webhook_url = "https://bot.example.com/hook"
            listen_addr = "127.0.0.1:8080"

            [scraper]
            program = "/usr/local/bin/gallery-dl"

            [logging]
            format = "pretty"
            "#,
        )
        .unwrap();

        assert_eq!(config.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.bot.fetch_limit, 20);
        assert!(!config.bot.thread_replies);
        assert!(config.bot.private_only);
        let (addr, url) = config.transport.webhook().unwrap();
        assert_eq!(addr.port(), 8080);
        assert_eq!(url.as_str(), "https://bot.example.com/hook");
        assert_eq!(config.scraper.program, "/usr/local/bin/gallery-dl");
        assert_eq!(config.get_logging_format(), "pretty");
    }

    #[test]
    fn test_rejects_zero_limit() {
        assert!(Config::parse("[bot]\nfetch_limit = 0").is_err());
    }

    #[test]
    fn test_webhook_requires_url() {
        assert!(Config::parse("[transport]\nmode = \"webhook\"").is_err());
        assert!(Config::parse(
            "[transport]\nmode = \"webhook\"\nwebhook_url = \"https://x.example/hook\"\nlisten_addr = \"nope\""
        )
        .is_err());
    }
}
