//! Trains a small dense network on MNIST, reports test accuracy and writes a
//! preview of the first few test predictions.
//!
//! Expects the four IDX files (`train-images-idx3-ubyte`, ...) in the
//! configured `digits.data_dir`.

use anyhow::Context;
use ferrite_insight::config::AppConfig;
use ferrite_insight::digits::{self, CandleBackend, IdxDirectory};
use ferrite_insight::logging;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    let dispatch = logging::init(&config.log).context("initializing logging")?;

    tracing::dispatcher::with_default(&dispatch, || -> anyhow::Result<()> {
        let provider = IdxDirectory::new(&config.digits.data_dir);
        let backend = CandleBackend::cpu();

        let run = digits::run(&provider, &backend, &config.digits)
            .with_context(|| format!("digit run over {}", config.digits.data_dir.display()))?;

        for (i, result) in run.preview(config.digits.preview_count).iter().enumerate() {
            match result.actual_label {
                Some(actual) => println!("Sample {i}: predicted {}, actual {actual}", result.predicted_label),
                None => println!("Sample {i}: predicted {}", result.predicted_label),
            }
        }
        if let Some(path) = &run.plot_path {
            println!("Predictions plotted to {}", path.display());
        }
        Ok(())
    })
}
