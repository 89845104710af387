//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Signal configuration
    pub signal: SignalConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// Macro configuration
    #[serde(default)]
    pub macros: MacrosConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    /// Signal CLI REST API endpoint
    #[serde(default = "default_signal_service")]
    pub service_url: String,

    /// Account the bot receives and sends as
    pub phone_number: String,

    /// Poll interval for messages
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Rules file (commands, channels, permissions)
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Pause after each reply to the same recipient
    #[serde(default = "default_reply_cooldown", with = "humantime_serde")]
    pub reply_cooldown: Duration,

    /// Maximum reply length in characters
    #[serde(default = "default_max_reply_len")]
    pub max_reply_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MacrosConfig {
    /// Upper bound for a single macro expansion
    #[serde(default = "default_macro_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// %XKCD% and %RANDOM_XKCD%
    #[serde(default)]
    pub xkcd: XkcdConfig,

    /// %WIKI%
    #[serde(default)]
    pub wiki: WikiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XkcdConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_xkcd_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_wiki_url")]
    pub api_url: String,
}

// Default implementations
impl Default for BotConfig {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            reply_cooldown: default_reply_cooldown(),
            max_reply_len: default_max_reply_len(),
        }
    }
}

impl Default for MacrosConfig {
    fn default() -> Self {
        Self {
            timeout: default_macro_timeout(),
            xkcd: XkcdConfig::default(),
            wiki: WikiConfig::default(),
        }
    }
}

impl Default for XkcdConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_xkcd_url(),
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_url: default_wiki_url(),
        }
    }
}

// Default value functions
fn default_signal_service() -> String {
    "http://signal-api:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(200)
}

fn default_rules_file() -> PathBuf {
    PathBuf::from("config/rules.json")
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> LogFormat {
    LogFormat::Plain
}

fn default_reply_cooldown() -> Duration {
    Duration::from_secs(1)
}

fn default_max_reply_len() -> usize {
    2000
}

fn default_macro_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_xkcd_url() -> String {
    "https://xkcd.com".into()
}

fn default_wiki_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}

fn default_true() -> bool {
    true
}

fn environment() -> config::Environment {
    config::Environment::default()
        .separator("__")
        // try_parsing(true) would turn +15551234567 into a number and drop
        // the +. Keep strings as strings.
        .try_parsing(false)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_environment(environment())
    }

    fn from_environment(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
