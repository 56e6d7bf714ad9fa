pub mod config;
pub mod digits;
pub mod error;
pub mod logging;
pub mod sentiment;
pub mod session;

// Convenience re-exports
pub use config::AppConfig;
pub use error::{AnalysisError, DigitsError};
pub use sentiment::{LexiconPolarity, PolarityAnalyzer, Report, SentimentAnalyzer, TransformerSentiment};
pub use session::Session;
