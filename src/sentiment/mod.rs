pub mod analyzer;
pub mod describe;
pub mod lexicon;
pub mod pipeline;
pub mod report;
pub mod result;

pub use analyzer::{analyze_text, PolarityAnalyzer, SentimentAnalyzer, TextAnalysis};
pub use describe::{describe, describe_with_threshold, SentimentDescription, CONFIDENCE_THRESHOLD};
pub use lexicon::LexiconPolarity;
pub use pipeline::TransformerSentiment;
pub use report::{PolarityVerdict, Report};
pub use result::{SentimentResult, SubjectivityPolarity};
