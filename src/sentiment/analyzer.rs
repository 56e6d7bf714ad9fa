use crate::error::AnalysisError;
use crate::sentiment::report::Report;
use crate::sentiment::result::{SentimentResult, SubjectivityPolarity};

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// A pre-trained text classifier mapping raw text to a label and confidence.
pub trait SentimentAnalyzer {
    fn classify(&self, text: &str) -> Result<SentimentResult, AnalysisError>;
}

/// A lexicon-based scorer mapping raw text to subjectivity and polarity.
pub trait PolarityAnalyzer {
    fn score(&self, text: &str) -> Result<SubjectivityPolarity, AnalysisError>;
}

// ---------------------------------------------------------------------------
// Per-text pipeline
// ---------------------------------------------------------------------------

/// Both collaborator outcomes for one text.
#[derive(Debug)]
pub struct TextAnalysis {
    pub sentiment: Result<SentimentResult, AnalysisError>,
    pub lexical: Result<SubjectivityPolarity, AnalysisError>,
}

impl TextAnalysis {
    /// The printable report, or `None` if either collaborator failed.
    pub fn report(&self, threshold: f64) -> Option<Report> {
        match (&self.sentiment, &self.lexical) {
            (Ok(sentiment), Ok(lexical)) => Some(Report::new(sentiment, *lexical, threshold)),
            _ => None,
        }
    }
}

/// Runs `text` through both collaborators.
///
/// The calls are independent: a failure of the classifier does not skip the
/// lexicon, and neither failure is propagated. Each call and each failure is
/// logged.
pub fn analyze_text<S, P>(sentiment: &S, lexicon: &P, text: &str) -> TextAnalysis
where
    S: SentimentAnalyzer + ?Sized,
    P: PolarityAnalyzer + ?Sized,
{
    tracing::info!(chars = text.chars().count(), "Running sentiment analysis");
    let sentiment = sentiment.classify(text);
    match &sentiment {
        Ok(result) => tracing::info!(
            label = %result.label,
            confidence = result.confidence,
            "Sentiment analysis finished"
        ),
        Err(e) => tracing::error!("Error during sentiment analysis: {e}"),
    }

    tracing::info!("Running subjectivity/polarity analysis");
    let lexical = lexicon.score(text);
    match &lexical {
        Ok(result) => tracing::info!(
            subjectivity = result.subjectivity,
            polarity = result.polarity,
            "Subjectivity/polarity analysis finished"
        ),
        Err(e) => tracing::error!("Error during subjectivity/polarity analysis: {e}"),
    }

    TextAnalysis { sentiment, lexical }
}
