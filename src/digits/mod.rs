pub mod candle_model;
pub mod classifier;
pub mod dataset;
pub mod driver;
pub mod history;
pub mod label;
pub mod plot;
pub mod topology;

pub use candle_model::{CandleBackend, CandleClassifier};
pub use classifier::{Classifier, ClassifierBackend};
pub use dataset::{normalize, DatasetProvider, IdxDirectory, LabeledImages, NormalizedImages};
pub use driver::{run, DigitRun};
pub use history::{EpochMetrics, Evaluation, FitOptions, History};
pub use label::{classify_all, predicted_label, ClassificationResult};
pub use plot::{prediction_grid, render_prediction_grid};
pub use topology::{Activation, CompileOptions, LayerSpec, Topology};
