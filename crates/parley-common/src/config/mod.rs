//! Configuration structs

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, AppSettings, ChatConfig, ConfigError, Environment, PollConfig, ServerConfig,
};
