//! Interactive sentiment analyzer.
//!
//! Reads lines from stdin, classifies each with the pre-trained transformer
//! and scores it with the lexicon, and prints a combined report. Type `q`
//! (or end the input) to leave. Configuration comes from the JSON file named
//! by `FERRITE_INSIGHT_CONFIG`, if set.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use ferrite_insight::config::AppConfig;
use ferrite_insight::logging;
use ferrite_insight::sentiment::{LexiconPolarity, TransformerSentiment};
use ferrite_insight::session::{Session, SessionSettings};

fn main() -> anyhow::Result<ExitCode> {
    let config = AppConfig::load().context("loading configuration")?;
    let dispatch = logging::init(&config.log).context("initializing logging")?;

    tracing::dispatcher::with_default(&dispatch, || run(&config))
}

fn run(config: &AppConfig) -> anyhow::Result<ExitCode> {
    println!("Loading sentiment analysis model...");
    let pipeline = match TransformerSentiment::load(&config.sentiment) {
        Ok(pipeline) => {
            tracing::info!(model = %config.sentiment.model_repo, "Sentiment analyzer loaded");
            pipeline
        }
        Err(e) => {
            tracing::error!("Error loading sentiment analyzer: {e}");
            eprintln!("Error loading sentiment analyzer: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let lexicon = LexiconPolarity::new();

    let mut session = Session::new(&pipeline, &lexicon, SessionSettings::from(&config.sentiment));
    session
        .run(io::stdin().lock(), io::stdout().lock())
        .context("interactive session I/O")?;

    Ok(ExitCode::SUCCESS)
}
