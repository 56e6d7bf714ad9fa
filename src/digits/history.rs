use serde::{Deserialize, Serialize};

/// Hyperparameters of one `fit` call.
///
/// # Fields
/// - `epochs`: full passes over the training data
/// - `batch_size`: samples per mini-batch
/// - `validation_split`: fraction of the training samples, taken from the
///   end before shuffling, held out for validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub validation_split: Option<f32>,
}

impl FitOptions {
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        FitOptions { epochs, batch_size, validation_split: None }
    }

    /// Number of held-out samples for a training set of `n` samples.
    pub fn validation_len(&self, n: usize) -> usize {
        match self.validation_split {
            Some(split) if split > 0.0 => ((n as f64 * f64::from(split)) as usize).min(n),
            _ => 0,
        }
    }
}

/// Metrics recorded at the end of one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean training loss over the epoch.
    pub loss: f64,
    /// Training accuracy in [0, 1], when accuracy is tracked.
    pub accuracy: Option<f64>,
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of the epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Per-epoch metric sequence returned by `fit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

/// Result of `evaluate` on a held-out set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub loss: f64,
    /// Fraction of samples whose arg-max matches the label.
    pub accuracy: f64,
}
