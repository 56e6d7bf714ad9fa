use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// Activation applied after a dense layer's linear transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Softmax,
    /// Identity; the layer emits raw logits.
    Linear,
}

/// One layer of a declarative topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Collapses each `rows × cols` image into a vector.
    Flatten,
    /// Fully connected layer of `units` neurons.
    Dense { units: usize, activation: Activation },
    /// Zeroes a `rate` fraction of activations while training.
    Dropout { rate: f32 },
}

/// A fully serializable description of a classifier architecture.
///
/// Like the trained weights it produces, a `Topology` can be saved to and
/// loaded from JSON so architectures can be stored before training starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// `(rows, cols)` of one input image.
    pub input_shape: (usize, usize),
    /// Ordered layers, input → output.
    pub layers: Vec<LayerSpec>,
}

impl Topology {
    /// 28×28 → Flatten → Dense(hidden, ReLU) → Dropout(dropout) → Dense(10, Softmax).
    pub fn mnist_mlp(hidden_units: usize, dropout: f32) -> Topology {
        Topology {
            input_shape: (28, 28),
            layers: vec![
                LayerSpec::Flatten,
                LayerSpec::Dense { units: hidden_units, activation: Activation::Relu },
                LayerSpec::Dropout { rate: dropout },
                LayerSpec::Dense { units: 10, activation: Activation::Softmax },
            ],
        }
    }

    /// Width of the last dense layer, i.e. the number of classes.
    pub fn output_width(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|layer| match layer {
            LayerSpec::Dense { units, .. } => Some(*units),
            _ => None,
        })
    }

    /// Checks the topology can be built:
    /// - input shape and every dense width are non-zero
    /// - a `Flatten` comes before the first `Dense`, and none after it
    /// - dropout rates lie in [0, 1)
    /// - there is at least one `Dense` layer
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let (rows, cols) = self.input_shape;
        if rows == 0 || cols == 0 {
            return Err(ClassifierError::Topology(format!(
                "input shape must be non-zero, got {rows}×{cols}"
            )));
        }

        let mut flattened = false;
        let mut seen_dense = false;
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                LayerSpec::Flatten if seen_dense => {
                    return Err(ClassifierError::Topology(format!(
                        "layer {i}: flatten after a dense layer"
                    )));
                }
                LayerSpec::Flatten => flattened = true,
                LayerSpec::Dense { units, .. } => {
                    seen_dense = true;
                    if !flattened {
                        return Err(ClassifierError::Topology(format!(
                            "layer {i}: dense layer needs a preceding flatten"
                        )));
                    }
                    if *units == 0 {
                        return Err(ClassifierError::Topology(format!(
                            "layer {i}: dense layer must have at least one unit"
                        )));
                    }
                }
                LayerSpec::Dropout { rate } => {
                    if !(0.0..1.0).contains(rate) {
                        return Err(ClassifierError::Topology(format!(
                            "layer {i}: dropout rate {rate} is outside [0, 1)"
                        )));
                    }
                }
            }
        }

        if self.output_width().is_none() {
            return Err(ClassifierError::Topology("no dense layer".to_owned()));
        }
        Ok(())
    }

    /// Serializes the topology to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `Topology` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<Topology> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

// ---------------------------------------------------------------------------
// Compile options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Adam,
    Sgd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    /// Cross-entropy against integer class labels.
    SparseCategoricalCrossentropy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
}

/// Optimizer, loss and metrics attached to a built model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOptions {
    pub optimizer: OptimizerKind,
    pub learning_rate: f64,
    pub loss: LossKind,
    pub metrics: Vec<Metric>,
}

impl CompileOptions {
    /// Adam + sparse categorical cross-entropy, tracking accuracy.
    pub fn adam(learning_rate: f64) -> CompileOptions {
        CompileOptions {
            optimizer: OptimizerKind::Adam,
            learning_rate,
            loss: LossKind::SparseCategoricalCrossentropy,
            metrics: vec![Metric::Accuracy],
        }
    }

    pub fn tracks(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }
}
