use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::config::LogConfig;
use crate::error::LogError;

/// Timestamp layout of every log line, e.g. `2024-05-01 13:37:00.123`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Builds the log dispatcher described by `config`.
///
/// Lines are appended to `config.path` as `<timestamp> <LEVEL> <message>`.
/// Nothing is installed globally: the caller decides the scope, typically
/// by wrapping the whole program in `tracing::dispatcher::with_default`.
pub fn init(config: &LogConfig) -> Result<Dispatch, LogError> {
    let level: LevelFilter = config
        .level
        .parse()
        .map_err(|_| LogError::Level(config.level.clone()))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.path)
        .map_err(|source| LogError::Open {
            path: config.path.clone(),
            source,
        })?;

    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_owned()))
        .with_max_level(level)
        .finish();

    Ok(Dispatch::new(subscriber))
}
