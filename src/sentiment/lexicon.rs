use std::panic::{self, AssertUnwindSafe};

use vader_sentiment::SentimentIntensityAnalyzer;

use crate::error::AnalysisError;
use crate::sentiment::analyzer::PolarityAnalyzer;
use crate::sentiment::result::SubjectivityPolarity;

/// Lexicon-based subjectivity/polarity scorer backed by VADER.
///
/// - polarity     = VADER `compound`, already normalized to [-1, 1]
/// - subjectivity = `pos + neg`, the share of the text carrying sentiment,
///   clamped to [0, 1]
pub struct LexiconPolarity {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl LexiconPolarity {
    pub fn new() -> Self {
        LexiconPolarity {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for LexiconPolarity {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityAnalyzer for LexiconPolarity {
    fn score(&self, text: &str) -> Result<SubjectivityPolarity, AnalysisError> {
        // The lexicon library signals bad input by panicking. The default
        // panic hook still prints the message to stderr.
        let scores = panic::catch_unwind(AssertUnwindSafe(|| {
            let scores = self.analyzer.polarity_scores(text);
            let get = |key: &str| scores.get(key).copied();
            (get("compound"), get("pos"), get("neg"))
        }))
        .map_err(|payload| AnalysisError::Lexicon(panic_message(payload.as_ref())))?;

        match scores {
            (Some(compound), Some(pos), Some(neg)) => Ok(SubjectivityPolarity {
                subjectivity: (pos + neg).clamp(0.0, 1.0),
                polarity: compound.clamp(-1.0, 1.0),
            }),
            _ => Err(AnalysisError::Lexicon(
                "lexicon scores are missing compound/pos/neg".to_owned(),
            )),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "lexicon analyzer panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_text_has_positive_polarity() {
        let lexicon = LexiconPolarity::new();
        let scored = lexicon.score("I love this, it is great and wonderful!").unwrap();
        assert!(scored.polarity > 0.0);
        assert!(scored.subjectivity > 0.0 && scored.subjectivity <= 1.0);
    }

    #[test]
    fn negative_text_has_negative_polarity() {
        let lexicon = LexiconPolarity::new();
        let scored = lexicon.score("This is terrible, I hate it.").unwrap();
        assert!(scored.polarity < 0.0);
    }

    #[test]
    fn factual_text_is_objective() {
        let lexicon = LexiconPolarity::new();
        let scored = lexicon.score("The train leaves at seven.").unwrap();
        assert_eq!(scored.polarity, 0.0);
        assert_eq!(scored.subjectivity, 0.0);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("index out of bounds");
        assert_eq!(panic_message(payload.as_ref()), "index out of bounds");
        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "lexicon analyzer panicked");
    }
}
