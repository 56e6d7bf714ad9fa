pub mod app_config;

pub use app_config::{AppConfig, DigitsConfig, LogConfig, SentimentConfig, CONFIG_ENV_VAR};
