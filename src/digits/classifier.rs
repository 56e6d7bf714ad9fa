use crate::digits::dataset::NormalizedImages;
use crate::digits::history::{Evaluation, FitOptions, History};
use crate::digits::topology::{CompileOptions, Topology};
use crate::error::ClassifierError;

/// A trainable image classifier.
///
/// Labels are class indices; `predict` returns one probability vector per
/// input image, in input order.
pub trait Classifier {
    fn compile(&mut self, options: &CompileOptions) -> Result<(), ClassifierError>;

    fn fit(
        &mut self,
        inputs: &NormalizedImages,
        labels: &[u8],
        options: &FitOptions,
    ) -> Result<History, ClassifierError>;

    fn evaluate(&self, inputs: &NormalizedImages, labels: &[u8]) -> Result<Evaluation, ClassifierError>;

    fn predict(&self, inputs: &NormalizedImages) -> Result<Vec<Vec<f32>>, ClassifierError>;
}

/// Builds classifiers from a declarative topology.
pub trait ClassifierBackend {
    type Model: Classifier;

    fn build(&self, topology: &Topology) -> Result<Self::Model, ClassifierError>;
}

/// Checks inputs and labels describe the same samples.
pub fn check_samples(inputs: &NormalizedImages, labels: &[u8]) -> Result<(), ClassifierError> {
    if inputs.len() != labels.len() {
        return Err(ClassifierError::Shape(format!(
            "{} images but {} labels",
            inputs.len(),
            labels.len()
        )));
    }
    if inputs.values.len() != inputs.len() * inputs.rows * inputs.cols {
        return Err(ClassifierError::Shape(format!(
            "{} values do not fill whole {}×{} images",
            inputs.values.len(),
            inputs.rows,
            inputs.cols
        )));
    }
    Ok(())
}
