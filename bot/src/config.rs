//! Bot configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use shared::validation::{
    parse_weekday, validate_poll, validate_secret, validate_time_of_day, validate_utc_offset, ValidationError,
};
use shared::PointTable;
use time::{Time, UtcOffset, Weekday};

use crate::error::BotError;

pub const CONFIG_PATH_ENV: &str = "POLLBOT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
const ENV_PREFIX: &str = "POLLBOT";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub message: MessageConfig,
    pub poll: PollConfig,
    pub schedule: ScheduleConfig,
    /// Channels keyed by a local label.
    pub channels: BTreeMap<String, ChannelConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub token: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Upper bound for a single transport call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How long a `getUpdates` call may wait for new updates.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Required. Webhook and job routes reject requests without a matching
    /// secret header.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Public URL of `/telegram/webhook`. Without it updates are fetched by
    /// long polling.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl ServerConfig {
    pub fn secret(&self) -> Result<&str, ValidationError> {
        let secret = self.webhook_secret.as_deref().unwrap_or_default();
        validate_secret(secret)?;
        Ok(secret)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            webhook_secret: None,
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageConfig {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub points: PointTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub hour: u8,
    pub minute: u8,
    #[serde(default = "default_weekly_weekday")]
    pub weekly_weekday: String,
    #[serde(default = "default_weekly_hour")]
    pub weekly_hour: u8,
    #[serde(default)]
    pub weekly_minute: u8,
    #[serde(default)]
    pub utc_offset_hours: i8,
}

impl ScheduleConfig {
    pub fn daily_time(&self) -> Result<Time, BotError> {
        Ok(Time::from_hms(self.hour, self.minute, 0)?)
    }

    pub fn weekly_time(&self) -> Result<Time, BotError> {
        Ok(Time::from_hms(self.weekly_hour, self.weekly_minute, 0)?)
    }

    pub fn weekday(&self) -> Result<Weekday, BotError> {
        Ok(parse_weekday(&self.weekly_weekday)?)
    }

    pub fn offset(&self) -> Result<UtcOffset, BotError> {
        Ok(UtcOffset::from_hms(self.utc_offset_hours, 0, 0)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Chat id or `@username`.
    pub id: String,
    #[serde(default = "default_true")]
    pub include_poll: bool,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    10
}

const fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_database_url() -> String {
    "sqlite://poll_results.db?mode=rwc".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_weekly_weekday() -> String {
    "sunday".to_string()
}

const fn default_weekly_hour() -> u8 {
    20
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load from the file named by `POLLBOT_CONFIG` (default `config.toml`),
    /// overlaid with `POLLBOT__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, BotError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(path)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BotError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn from_toml(source: &str) -> Result<Self, BotError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_poll(&self.poll.question, &self.poll.options, &self.poll.points)?;
        validate_time_of_day(self.schedule.hour, self.schedule.minute)?;
        validate_time_of_day(self.schedule.weekly_hour, self.schedule.weekly_minute)?;
        parse_weekday(&self.schedule.weekly_weekday)?;
        validate_utc_offset(self.schedule.utc_offset_hours)?;
        self.server.secret()?;

        if self.channels.is_empty() {
            return Err(ValidationError::NoChannels);
        }
        Ok(())
    }
}
