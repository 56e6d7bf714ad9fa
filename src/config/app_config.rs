use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sentiment::describe::CONFIDENCE_THRESHOLD;
use crate::session::command::QUIT_COMMAND;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "FERRITE_INSIGHT_CONFIG";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Where log lines go and how verbose they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; opened in append mode.
    pub path: PathBuf,
    /// One of `trace`, `debug`, `info`, `warn`, `error`, `off`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            path: PathBuf::from("ferrite-insight.log"),
            level: "info".to_owned(),
        }
    }
}

/// Settings for the sentiment pipeline and the interactive loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Hub repository of the pre-trained sequence classifier.
    pub model_repo: String,
    /// Confidence above which a label is reported without "somewhat".
    pub confidence_threshold: f64,
    /// Input that ends the session (case-insensitive).
    pub quit_command: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        SentimentConfig {
            model_repo: "clapAI/modernBERT-base-multilingual-sentiment".to_owned(),
            confidence_threshold: CONFIDENCE_THRESHOLD,
            quit_command: QUIT_COMMAND.to_owned(),
        }
    }
}

/// Hyperparameters and file locations for the digit classifier run.
///
/// Kept separate from the [`Topology`](crate::digits::Topology) so the
/// architecture can be stored independently of how it is trained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitsConfig {
    /// Directory holding the four MNIST IDX files.
    pub data_dir: PathBuf,
    pub epochs: usize,
    pub batch_size: usize,
    /// Width of the single hidden dense layer.
    pub hidden_units: usize,
    /// Dropout rate applied after the hidden layer.
    pub dropout: f32,
    pub learning_rate: f64,
    /// Fraction of the training set held out for validation, if any.
    pub validation_split: Option<f32>,
    /// Number of test predictions logged and plotted.
    pub preview_count: usize,
    /// PNG written with the first `preview_count` predictions; `None` skips plotting.
    pub plot_path: Option<PathBuf>,
}

impl Default for DigitsConfig {
    fn default() -> Self {
        DigitsConfig {
            data_dir: PathBuf::from("data/mnist"),
            epochs: 5,
            batch_size: 32,
            hidden_units: 128,
            dropout: 0.2,
            learning_rate: 0.001,
            validation_split: None,
            preview_count: 5,
            plot_path: Some(PathBuf::from("predictions.png")),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Whole-process configuration. Every section falls back to its defaults,
/// so a config file only needs the keys it overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogConfig,
    pub sentiment: SentimentConfig,
    pub digits: DigitsConfig,
}

impl AppConfig {
    /// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults when the
    /// variable is unset.
    pub fn load() -> Result<AppConfig, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => AppConfig::load_json(Path::new(&path)),
            None => Ok(AppConfig::default()),
        }
    }

    /// Deserializes a config from a JSON file.
    pub fn load_json(path: &Path) -> Result<AppConfig, ConfigError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = AppConfig::default();
        assert_eq!(config.sentiment.confidence_threshold, 0.75);
        assert_eq!(config.sentiment.quit_command, "q");
        assert_eq!(config.digits.epochs, 5);
        assert_eq!(config.digits.hidden_units, 128);
        assert_eq!(config.digits.preview_count, 5);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "digits": { "epochs": 2 }, "log": { "level": "debug" } }"#)
            .unwrap();

        let config = AppConfig::load_json(&path).unwrap();
        assert_eq!(config.digits.epochs, 2);
        assert_eq!(config.digits.batch_size, 32);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.sentiment.quit_command, "q");
    }

    #[test]
    fn save_then_load_preserves_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.digits.plot_path = None;
        config.sentiment.confidence_threshold = 0.9;
        config.save_json(&path).unwrap();

        let loaded = AppConfig::load_json(&path).unwrap();
        assert!(loaded.digits.plot_path.is_none());
        assert_eq!(loaded.sentiment.confidence_threshold, 0.9);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AppConfig::load_json(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
