use serde::{Deserialize, Serialize};

use crate::sentiment::describe::{describe_with_threshold, SentimentDescription};

/// Output of the pre-trained sentiment pipeline for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Label as produced by the pipeline, e.g. `POSITIVE`.
    pub label: String,
    /// Probability of `label`, in [0, 1].
    pub confidence: f64,
}

impl SentimentResult {
    pub fn describe(&self, threshold: f64) -> SentimentDescription {
        describe_with_threshold(&self.label, self.confidence, threshold)
    }
}

/// Output of the lexicon analyzer for one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectivityPolarity {
    /// 0 = objective, 1 = subjective.
    pub subjectivity: f64,
    /// -1 = negative, 1 = positive.
    pub polarity: f64,
}
