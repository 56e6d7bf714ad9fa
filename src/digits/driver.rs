use std::path::PathBuf;

use crate::config::DigitsConfig;
use crate::digits::classifier::{Classifier, ClassifierBackend};
use crate::digits::dataset::{normalize, DatasetProvider};
use crate::digits::history::{EpochMetrics, Evaluation, FitOptions, History};
use crate::digits::label::{classify_all, ClassificationResult};
use crate::digits::plot::render_prediction_grid;
use crate::digits::topology::{CompileOptions, Topology};
use crate::error::DigitsError;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct DigitRun {
    pub history: History,
    pub evaluation: Evaluation,
    /// One entry per test image, in dataset order.
    pub results: Vec<ClassificationResult>,
    /// Where the preview grid was written, if plotting was enabled.
    pub plot_path: Option<PathBuf>,
}

impl DigitRun {
    /// The first `count` results, as shown in the preview.
    pub fn preview(&self, count: usize) -> &[ClassificationResult] {
        &self.results[..count.min(self.results.len())]
    }
}

/// Trains and evaluates the digit classifier end to end.
///
/// Steps: load → normalize → build → compile → fit → evaluate → predict →
/// map labels → plot. Each step is logged; per-epoch metrics are logged
/// from the returned history.
pub fn run<P, B>(provider: &P, backend: &B, config: &DigitsConfig) -> Result<DigitRun, DigitsError>
where
    P: DatasetProvider + ?Sized,
    B: ClassifierBackend + ?Sized,
{
    tracing::info!("Loading MNIST dataset");
    let (train, test) = provider.load()?;
    tracing::info!(train = train.len(), test = test.len(), "Dataset loaded");

    tracing::info!("Normalizing data");
    let train_x = normalize(&train);
    let test_x = normalize(&test);

    tracing::info!(hidden = config.hidden_units, dropout = config.dropout, "Building model");
    let mut topology = Topology::mnist_mlp(config.hidden_units, config.dropout);
    topology.input_shape = (train.rows, train.cols);
    let mut model = backend.build(&topology)?;

    tracing::info!(learning_rate = config.learning_rate, "Compiling model");
    model.compile(&CompileOptions::adam(config.learning_rate))?;

    tracing::info!(epochs = config.epochs, batch_size = config.batch_size, "Training model");
    let fit_options = FitOptions {
        epochs: config.epochs,
        batch_size: config.batch_size,
        validation_split: config.validation_split,
    };
    let history = model.fit(&train_x, &train.labels, &fit_options)?;
    for metrics in &history.epochs {
        log_epoch(metrics);
    }

    tracing::info!("Evaluating model");
    let evaluation = model.evaluate(&test_x, &test.labels)?;
    tracing::info!(
        "Test accuracy: {:.4}, test loss: {:.4}",
        evaluation.accuracy,
        evaluation.loss
    );
    println!("Test accuracy: {}", evaluation.accuracy);

    tracing::info!("Making predictions");
    let probabilities = model.predict(&test_x)?;
    let results = classify_all(&probabilities, &test.labels)?;
    for (i, result) in results.iter().take(config.preview_count).enumerate() {
        tracing::info!(
            "Sample {i}: predicted {}, actual {}",
            result.predicted_label,
            result
                .actual_label
                .map_or_else(|| "unknown".to_owned(), |l| l.to_string())
        );
    }

    let plot_path = match &config.plot_path {
        Some(path) if config.preview_count > 0 && !results.is_empty() => {
            let shown = config.preview_count.min(results.len());
            tracing::info!(path = %path.display(), count = shown, "Plotting predictions");
            render_prediction_grid(&test_x, &results[..shown], path)?;
            Some(path.clone())
        }
        _ => None,
    };

    Ok(DigitRun {
        history,
        evaluation,
        results,
        plot_path,
    })
}

fn log_epoch(metrics: &EpochMetrics) {
    let accuracy = metrics
        .accuracy
        .map_or_else(|| "n/a".to_owned(), |a| format!("{a:.4}"));
    match (metrics.val_loss, metrics.val_accuracy) {
        (Some(val_loss), val_accuracy) => tracing::info!(
            "Epoch {}/{}: loss={:.4}, accuracy={}, val_loss={:.4}, val_accuracy={}",
            metrics.epoch,
            metrics.total_epochs,
            metrics.loss,
            accuracy,
            val_loss,
            val_accuracy.map_or_else(|| "n/a".to_owned(), |a| format!("{a:.4}"))
        ),
        (None, _) => tracing::info!(
            "Epoch {}/{}: loss={:.4}, accuracy={}",
            metrics.epoch,
            metrics.total_epochs,
            metrics.loss,
            accuracy
        ),
    }
}
