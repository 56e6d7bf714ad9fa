use std::fmt;

use crate::sentiment::describe::SentimentDescription;
use crate::sentiment::result::{SentimentResult, SubjectivityPolarity};

/// Everything shown to the user for one successfully analyzed text.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub label: String,
    pub confidence: f64,
    pub description: SentimentDescription,
    pub subjectivity: f64,
    pub polarity: f64,
}

impl Report {
    pub fn new(sentiment: &SentimentResult, lexical: SubjectivityPolarity, threshold: f64) -> Report {
        Report {
            label: sentiment.label.clone(),
            confidence: sentiment.confidence,
            description: sentiment.describe(threshold),
            subjectivity: lexical.subjectivity,
            polarity: lexical.polarity,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sentiment Analysis Results:")?;
        writeln!(f, "Sentiment: {}", self.label)?;
        writeln!(f, "Confidence Score: {:.4}", self.confidence)?;
        writeln!(f, "Description: The text is {}.", self.description)?;
        writeln!(f)?;
        writeln!(f, "Subjectivity: {:.4} (0 = objective, 1 = subjective)", self.subjectivity)?;
        write!(f, "Polarity: {:.4} (-1 = negative, 1 = positive)", self.polarity)
    }
}

/// Coarse reading of lexicon polarity alone, used by the one-shot tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarityVerdict {
    Positive,
    Negative,
    Neutral,
}

impl PolarityVerdict {
    pub fn from_polarity(polarity: f64) -> PolarityVerdict {
        if polarity > 0.0 {
            PolarityVerdict::Positive
        } else if polarity < 0.0 {
            PolarityVerdict::Negative
        } else {
            PolarityVerdict::Neutral
        }
    }
}

impl fmt::Display for PolarityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolarityVerdict::Positive => "The text expresses a positive sentiment.",
            PolarityVerdict::Negative => "The text expresses a negative sentiment.",
            PolarityVerdict::Neutral => "The text is neutral.",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_four_decimals() {
        let sentiment = SentimentResult { label: "NEGATIVE".into(), confidence: 0.612345 };
        let lexical = SubjectivityPolarity { subjectivity: 0.5, polarity: -0.33333 };
        let text = Report::new(&sentiment, lexical, 0.75).to_string();

        assert_eq!(
            text,
            "Sentiment Analysis Results:\n\
             Sentiment: NEGATIVE\n\
             Confidence Score: 0.6123\n\
             Description: The text is somewhat negative.\n\
             \n\
             Subjectivity: 0.5000 (0 = objective, 1 = subjective)\n\
             Polarity: -0.3333 (-1 = negative, 1 = positive)"
        );
    }

    #[test]
    fn polarity_verdict_signs() {
        assert_eq!(PolarityVerdict::from_polarity(0.2), PolarityVerdict::Positive);
        assert_eq!(PolarityVerdict::from_polarity(-0.01), PolarityVerdict::Negative);
        assert_eq!(PolarityVerdict::from_polarity(0.0), PolarityVerdict::Neutral);
        assert_eq!(
            PolarityVerdict::from_polarity(0.0).to_string(),
            "The text is neutral."
        );
    }
}
