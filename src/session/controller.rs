use std::io::{self, BufRead, Write};

use crate::config::SentimentConfig;
use crate::sentiment::analyzer::{analyze_text, PolarityAnalyzer, SentimentAnalyzer};
use crate::sentiment::describe::CONFIDENCE_THRESHOLD;
use crate::sentiment::report::PolarityVerdict;
use crate::session::command::{Command, LoopState, QUIT_COMMAND};

pub const PROMPT: &str = "\nEnter the text for sentiment analysis (or 'q' to quit): ";
pub const FAREWELL: &str = "Thank you for using the sentiment analyzer. Goodbye!";
pub const EMPTY_INPUT_WARNING: &str = "Please enter some text to analyze.";
pub const ANALYSIS_FAILED: &str = "Sorry, the text could not be analyzed. Please try again.";

/// Knobs of the interactive loop.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub quit_command: String,
    pub confidence_threshold: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            quit_command: QUIT_COMMAND.to_owned(),
            confidence_threshold: CONFIDENCE_THRESHOLD,
        }
    }
}

impl From<&SentimentConfig> for SessionSettings {
    fn from(config: &SentimentConfig) -> Self {
        SessionSettings {
            quit_command: config.quit_command.clone(),
            confidence_threshold: config.confidence_threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Interactive read-analyze-print loop over borrowed collaborators.
///
/// Each line is handled to completion before the next is read. A failing
/// collaborator only affects the line that triggered it.
pub struct Session<'a, S: ?Sized, P: ?Sized> {
    sentiment: &'a S,
    lexicon: &'a P,
    settings: SessionSettings,
    state: LoopState,
}

impl<'a, S, P> Session<'a, S, P>
where
    S: SentimentAnalyzer + ?Sized,
    P: PolarityAnalyzer + ?Sized,
{
    pub fn new(sentiment: &'a S, lexicon: &'a P, settings: SessionSettings) -> Self {
        Session {
            sentiment,
            lexicon,
            settings,
            state: LoopState::Reading,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Handles one line of input and returns the resulting state.
    ///
    /// Once terminated, further lines are ignored.
    pub fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<LoopState> {
        if self.state == LoopState::Terminated {
            return Ok(self.state);
        }

        match Command::parse(line, &self.settings.quit_command) {
            Command::Quit => {
                tracing::info!("User requested to quit");
                writeln!(out, "{FAREWELL}")?;
                self.state = LoopState::Terminated;
            }
            Command::Empty => {
                tracing::warn!("Empty input received");
                writeln!(out, "{EMPTY_INPUT_WARNING}")?;
            }
            Command::Analyze(text) => {
                let analysis = analyze_text(self.sentiment, self.lexicon, text);
                match analysis.report(self.settings.confidence_threshold) {
                    Some(report) => {
                        writeln!(out)?;
                        writeln!(out, "{report}")?;
                    }
                    None => writeln!(out, "{ANALYSIS_FAILED}")?,
                }
            }
        }

        Ok(self.state)
    }

    /// Prompts and handles lines until the quit command or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> io::Result<()> {
        tracing::info!("Interactive session started");
        let mut line = String::new();

        while self.state == LoopState::Reading {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                tracing::info!("End of input; closing session");
                writeln!(out)?;
                self.state = LoopState::Terminated;
                break;
            }
            self.handle(&line, &mut out)?;
        }

        out.flush()
    }
}

// ---------------------------------------------------------------------------
// One-shot
// ---------------------------------------------------------------------------

/// Analyzes a single line and prints the short summary: label, confidence
/// and the lexicon polarity verdict.
///
/// Collaborator failures are soft: the generic failure message is printed
/// instead of a partial summary.
pub fn analyze_once<S, P, W>(sentiment: &S, lexicon: &P, line: &str, out: &mut W) -> io::Result<()>
where
    S: SentimentAnalyzer + ?Sized,
    P: PolarityAnalyzer + ?Sized,
    W: Write,
{
    let text = line.trim();
    if text.is_empty() {
        tracing::warn!("Empty input received");
        return writeln!(out, "{EMPTY_INPUT_WARNING}");
    }

    let analysis = analyze_text(sentiment, lexicon, text);
    match (&analysis.sentiment, &analysis.lexical) {
        (Ok(sentiment), Ok(lexical)) => {
            writeln!(out, "\nSentiment Analysis:")?;
            writeln!(out, "Sentiment: {}", sentiment.label)?;
            writeln!(out, "Confidence Score: {:.4}", sentiment.confidence)?;
            writeln!(out, "{}", PolarityVerdict::from_polarity(lexical.polarity))
        }
        _ => writeln!(out, "{ANALYSIS_FAILED}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::sentiment::result::{SentimentResult, SubjectivityPolarity};

    struct Always;

    impl SentimentAnalyzer for Always {
        fn classify(&self, _text: &str) -> Result<SentimentResult, AnalysisError> {
            Ok(SentimentResult { label: "POSITIVE".into(), confidence: 0.9 })
        }
    }

    impl PolarityAnalyzer for Always {
        fn score(&self, _text: &str) -> Result<SubjectivityPolarity, AnalysisError> {
            Ok(SubjectivityPolarity { subjectivity: 0.1, polarity: 0.2 })
        }
    }

    #[test]
    fn terminated_session_ignores_input() {
        let mut session = Session::new(&Always, &Always, SessionSettings::default());
        let mut out = Vec::new();

        assert_eq!(session.handle("q", &mut out).unwrap(), LoopState::Terminated);
        out.clear();
        assert_eq!(session.handle("more text", &mut out).unwrap(), LoopState::Terminated);
        assert!(out.is_empty());
    }

    #[test]
    fn settings_follow_config() {
        let config = SentimentConfig {
            quit_command: "exit".into(),
            confidence_threshold: 0.5,
            ..SentimentConfig::default()
        };
        let settings = SessionSettings::from(&config);
        assert_eq!(settings.quit_command, "exit");
        assert_eq!(settings.confidence_threshold, 0.5);
    }
}
