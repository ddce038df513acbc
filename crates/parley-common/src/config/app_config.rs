//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub chat: ChatConfig,
    pub poll: PollConfig,
    pub admin: AdminConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Listen address
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chat listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub listen: ServerConfig,
    /// Number of consecutive ports tried, starting at `listen.port`
    #[serde(default = "default_port_scan")]
    pub port_scan: u16,
    /// Open the chat gate as soon as the server starts
    #[serde(default = "default_true")]
    pub auto_start: bool,
}

/// Poll configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_duration_ms")]
    pub duration_ms: u64,
}

impl PollConfig {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Admin HTTP surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub listen: ServerConfig,
}

// Default value functions
fn default_app_name() -> String {
    "parley".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_chat_host() -> String {
    "0.0.0.0".to_string()
}

fn default_chat_port() -> u16 {
    5000
}

fn default_port_scan() -> u16 {
    100
}

fn default_admin_port() -> u16 {
    5999
}

fn default_true() -> bool {
    true
}

fn default_poll_duration_ms() -> u64 {
    90_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            chat: ChatConfig {
                listen: ServerConfig {
                    host: default_chat_host(),
                    port: default_chat_port(),
                },
                port_scan: default_port_scan(),
                auto_start: true,
            },
            poll: PollConfig {
                duration_ms: default_poll_duration_ms(),
            },
            admin: AdminConfig {
                enabled: true,
                listen: ServerConfig {
                    host: default_host(),
                    port: default_admin_port(),
                },
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Unset keys fall back to their defaults; set keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let env_var = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_secs: Option<u64> = parse_var(&lookup, "POLL_DURATION_SECS")?;

        Ok(Self {
            app: AppSettings {
                name: env_var("APP_NAME").unwrap_or(defaults.app.name),
                env: env_var("APP_ENV")
                    .map(|s| {
                        s.parse()
                            .map_err(|()| ConfigError::InvalidValue("APP_ENV", s))
                    })
                    .transpose()?
                    .unwrap_or_default(),
            },
            chat: ChatConfig {
                listen: ServerConfig {
                    host: env_var("CHAT_HOST").unwrap_or(defaults.chat.listen.host),
                    port: parse_var(&lookup, "CHAT_PORT")?
                        .unwrap_or(defaults.chat.listen.port),
                },
                port_scan: parse_var(&lookup, "CHAT_PORT_SCAN")?
                    .unwrap_or(defaults.chat.port_scan),
                auto_start: parse_bool(&lookup, "CHAT_AUTO_START")?
                    .unwrap_or(defaults.chat.auto_start),
            },
            poll: PollConfig {
                duration_ms: poll_secs
                    .map_or(defaults.poll.duration_ms, |secs| secs.saturating_mul(1000)),
            },
            admin: AdminConfig {
                enabled: parse_bool(&lookup, "ADMIN_ENABLED")?.unwrap_or(defaults.admin.enabled),
                listen: ServerConfig {
                    host: env_var("ADMIN_HOST").unwrap_or(defaults.admin.listen.host),
                    port: parse_var(&lookup, "ADMIN_PORT")?
                        .unwrap_or(defaults.admin.listen.port),
                },
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue(key, raw)),
        },
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
