//! Error types for this crate.
//!
//! Each area gets its own enum so callers can tell a soft, per-request
//! failure (an [`AnalysisError`] from one collaborator call) apart from a
//! failure that should stop the process (a dataset that cannot be read, a
//! pipeline that cannot be loaded).

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a sentiment or lexicon collaborator.
///
/// `ModelLoad` and `Download` only come out of initialization; the other
/// variants are produced per analyzed text and never end the session.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The pre-trained pipeline could not be constructed.
    #[error("failed to load sentiment model: {0}")]
    ModelLoad(String),

    /// Model files could not be fetched from the hub.
    #[error("failed to download model files: {0}")]
    Download(String),

    /// The tokenizer rejected the input text.
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// The forward pass or label lookup failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The lexicon analyzer failed on the input text.
    #[error("lexicon analysis failed: {0}")]
    Lexicon(String),
}

impl From<hf_hub::api::sync::ApiError> for AnalysisError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        AnalysisError::Download(value.to_string())
    }
}

impl From<candle_core::Error> for AnalysisError {
    fn from(value: candle_core::Error) -> Self {
        AnalysisError::Inference(value.to_string())
    }
}

/// Failure to read or decode an image dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Format(String),
}

/// Failure inside the trainable classifier.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The declared topology cannot be built.
    #[error("invalid topology: {0}")]
    Topology(String),

    /// `fit` was called before `compile`.
    #[error("model must be compiled before training")]
    NotCompiled,

    /// Inputs and labels do not line up with the model.
    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error(transparent)]
    Backend(#[from] candle_core::Error),
}

/// Failure to render or write the prediction grid.
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("nothing to plot")]
    Empty,

    #[error("image and prediction counts differ ({images} images, {predictions} predictions)")]
    CountMismatch { images: usize, predictions: usize },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Failure to load the JSON configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to set up the log sink.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("cannot open log file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown log level '{0}'")]
    Level(String),
}

/// Any failure of the digit classification run.
#[derive(Error, Debug)]
pub enum DigitsError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Plot(#[from] PlotError),
}
