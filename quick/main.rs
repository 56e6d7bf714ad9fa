//! One-shot sentiment check: reads a single line, prints the transformer's
//! label and confidence followed by the lexicon polarity verdict.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use ferrite_insight::config::AppConfig;
use ferrite_insight::logging;
use ferrite_insight::sentiment::{LexiconPolarity, TransformerSentiment};
use ferrite_insight::session::analyze_once;

const PROMPT: &str = "Enter the text for sentiment analysis: ";

fn main() -> anyhow::Result<ExitCode> {
    let config = AppConfig::load().context("loading configuration")?;
    let dispatch = logging::init(&config.log).context("initializing logging")?;

    tracing::dispatcher::with_default(&dispatch, || run(&config))
}

fn run(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let pipeline = match TransformerSentiment::load(&config.sentiment) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("Error loading sentiment analyzer: {e}");
            eprintln!("Error loading sentiment analyzer: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let lexicon = LexiconPolarity::new();

    let mut out = io::stdout().lock();
    write!(out, "{PROMPT}")?;
    out.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("reading input")?;
    analyze_once(&pipeline, &lexicon, &line, &mut out)?;
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}
