use std::time::Instant;

use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{loss, ops, AdamW, Dropout, Linear, Optimizer, ParamsAdamW, VarBuilder, VarMap, SGD};
use rand::seq::SliceRandom;

use crate::digits::classifier::{check_samples, Classifier, ClassifierBackend};
use crate::digits::dataset::NormalizedImages;
use crate::digits::history::{EpochMetrics, Evaluation, FitOptions, History};
use crate::digits::topology::{Activation, CompileOptions, LayerSpec, Metric, OptimizerKind, Topology};
use crate::error::ClassifierError;

/// Samples per forward pass in `evaluate` and `predict`.
const EVAL_BATCH: usize = 256;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Builds [`CandleClassifier`]s on a fixed device.
#[derive(Debug, Clone)]
pub struct CandleBackend {
    device: Device,
}

impl CandleBackend {
    pub fn new(device: Device) -> Self {
        CandleBackend { device }
    }

    pub fn cpu() -> Self {
        CandleBackend::new(Device::Cpu)
    }
}

impl ClassifierBackend for CandleBackend {
    type Model = CandleClassifier;

    fn build(&self, topology: &Topology) -> Result<CandleClassifier, ClassifierError> {
        CandleClassifier::build(topology, &self.device)
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

enum Stage {
    Flatten,
    Dense { linear: Linear, activation: Activation },
    Dropout(Dropout),
}

enum Trainer {
    Adam(AdamW),
    Sgd(SGD),
}

impl Trainer {
    fn new(options: &CompileOptions, varmap: &VarMap) -> candle_core::Result<Trainer> {
        let vars = varmap.all_vars();
        match options.optimizer {
            // Plain Adam: AdamW without decoupled weight decay.
            OptimizerKind::Adam => {
                let params = ParamsAdamW {
                    lr: options.learning_rate,
                    eps: 1e-7,
                    weight_decay: 0.0,
                    ..Default::default()
                };
                Ok(Trainer::Adam(AdamW::new(vars, params)?))
            }
            OptimizerKind::Sgd => Ok(Trainer::Sgd(SGD::new(vars, options.learning_rate)?)),
        }
    }

    fn backward_step(&mut self, loss: &Tensor) -> candle_core::Result<()> {
        match self {
            Trainer::Adam(opt) => opt.backward_step(loss),
            Trainer::Sgd(opt) => opt.backward_step(loss),
        }
    }
}

struct Compiled {
    trainer: Trainer,
    track_accuracy: bool,
}

/// Feed-forward classifier assembled from a [`Topology`] with candle-nn.
///
/// A softmax on the last dense layer is folded into the loss while training
/// and applied explicitly by `predict`.
pub struct CandleClassifier {
    stages: Vec<Stage>,
    varmap: VarMap,
    input_shape: (usize, usize),
    classes: usize,
    device: Device,
    compiled: Option<Compiled>,
}

impl CandleClassifier {
    pub fn build(topology: &Topology, device: &Device) -> Result<CandleClassifier, ClassifierError> {
        topology.validate()?;
        let classes = topology
            .output_width()
            .ok_or_else(|| ClassifierError::Topology("no dense layer".to_owned()))?;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);

        let (rows, cols) = topology.input_shape;
        let mut width = rows * cols;
        let mut stages = Vec::with_capacity(topology.layers.len());
        for (i, layer) in topology.layers.iter().enumerate() {
            let stage = match *layer {
                LayerSpec::Flatten => Stage::Flatten,
                LayerSpec::Dense { units, activation } => {
                    let linear = candle_nn::linear(width, units, vb.pp(format!("dense_{i}")))?;
                    width = units;
                    Stage::Dense { linear, activation }
                }
                LayerSpec::Dropout { rate } => Stage::Dropout(Dropout::new(rate)),
            };
            stages.push(stage);
        }

        Ok(CandleClassifier {
            stages,
            varmap,
            input_shape: topology.input_shape,
            classes,
            device: device.clone(),
            compiled: None,
        })
    }

    /// Number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.varmap
            .all_vars()
            .iter()
            .map(|var| var.as_tensor().elem_count())
            .sum()
    }

    fn check_inputs(&self, inputs: &NormalizedImages) -> Result<(), ClassifierError> {
        if (inputs.rows, inputs.cols) != self.input_shape {
            return Err(ClassifierError::Shape(format!(
                "model expects {}×{} images, got {}×{}",
                self.input_shape.0, self.input_shape.1, inputs.rows, inputs.cols
            )));
        }
        Ok(())
    }

    fn check_labelled(&self, inputs: &NormalizedImages, labels: &[u8]) -> Result<(), ClassifierError> {
        self.check_inputs(inputs)?;
        check_samples(inputs, labels)?;
        if let Some(&label) = labels.iter().find(|&&l| usize::from(l) >= self.classes) {
            return Err(ClassifierError::Shape(format!(
                "label {label} is out of range for {} classes",
                self.classes
            )));
        }
        Ok(())
    }
}

impl Classifier for CandleClassifier {
    fn compile(&mut self, options: &CompileOptions) -> Result<(), ClassifierError> {
        let trainer = Trainer::new(options, &self.varmap)?;
        self.compiled = Some(Compiled {
            trainer,
            track_accuracy: options.tracks(Metric::Accuracy),
        });
        Ok(())
    }

    fn fit(
        &mut self,
        inputs: &NormalizedImages,
        labels: &[u8],
        options: &FitOptions,
    ) -> Result<History, ClassifierError> {
        self.check_labelled(inputs, labels)?;
        if options.batch_size == 0 {
            return Err(ClassifierError::Shape("batch size must be at least 1".to_owned()));
        }

        let n = labels.len();
        let val_len = options.validation_len(n);
        let train_len = n - val_len;
        if train_len == 0 {
            return Err(ClassifierError::Shape("no samples left for training".to_owned()));
        }

        let compiled = self.compiled.as_mut().ok_or(ClassifierError::NotCompiled)?;
        let stages = &self.stages;
        let device = &self.device;

        let xs = images_tensor(inputs, device)?;
        let ys = labels_tensor(labels, device)?;
        let train_x = xs.narrow(0, 0, train_len)?;
        let train_y = ys.narrow(0, 0, train_len)?;
        let validation = if val_len > 0 {
            Some((xs.narrow(0, train_len, val_len)?, ys.narrow(0, train_len, val_len)?))
        } else {
            None
        };

        let mut order: Vec<u32> = (0..train_len as u32).collect();
        let mut rng = rand::thread_rng();
        let mut history = History::default();

        for epoch in 1..=options.epochs {
            let t_start = Instant::now();

            // Shuffle sample order each epoch.
            order.shuffle(&mut rng);

            let mut loss_sum = 0.0;
            let mut correct = 0.0;
            for batch in order.chunks(options.batch_size) {
                let idx = Tensor::new(batch, device)?;
                let batch_x = train_x.index_select(&idx, 0)?;
                let batch_y = train_y.index_select(&idx, 0)?;

                let logits = forward(stages, &batch_x, true)?;
                let batch_loss = loss::cross_entropy(&logits, &batch_y)?;
                compiled.trainer.backward_step(&batch_loss)?;

                loss_sum += f64::from(batch_loss.to_scalar::<f32>()?) * batch.len() as f64;
                correct += count_correct(&logits, &batch_y)?;
            }

            let (val_loss, val_accuracy) = match &validation {
                Some((val_x, val_y)) => {
                    let eval = evaluate_tensors(stages, val_x, val_y)?;
                    (Some(eval.loss), compiled.track_accuracy.then_some(eval.accuracy))
                }
                None => (None, None),
            };

            history.epochs.push(EpochMetrics {
                epoch,
                total_epochs: options.epochs,
                loss: loss_sum / train_len as f64,
                accuracy: compiled.track_accuracy.then_some(correct / train_len as f64),
                val_loss,
                val_accuracy,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            });
        }

        Ok(history)
    }

    fn evaluate(&self, inputs: &NormalizedImages, labels: &[u8]) -> Result<Evaluation, ClassifierError> {
        self.check_labelled(inputs, labels)?;
        if labels.is_empty() {
            return Err(ClassifierError::Shape("nothing to evaluate".to_owned()));
        }
        let xs = images_tensor(inputs, &self.device)?;
        let ys = labels_tensor(labels, &self.device)?;
        Ok(evaluate_tensors(&self.stages, &xs, &ys)?)
    }

    fn predict(&self, inputs: &NormalizedImages) -> Result<Vec<Vec<f32>>, ClassifierError> {
        self.check_inputs(inputs)?;
        let n = inputs.len();
        let mut out = Vec::with_capacity(n);
        if n == 0 {
            return Ok(out);
        }

        let xs = images_tensor(inputs, &self.device)?;
        for start in (0..n).step_by(EVAL_BATCH) {
            let len = EVAL_BATCH.min(n - start);
            let logits = forward(&self.stages, &xs.narrow(0, start, len)?, false)?;
            let probs = ops::softmax(&logits, D::Minus1)?;
            out.extend(probs.to_vec2::<f32>()?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs the stages and returns pre-softmax scores for the output layer.
fn forward(stages: &[Stage], xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
    let head = stages
        .iter()
        .rposition(|stage| matches!(stage, Stage::Dense { .. }));

    let mut xs = xs.clone();
    for (i, stage) in stages.iter().enumerate() {
        xs = match stage {
            Stage::Flatten => xs.flatten_from(1)?,
            Stage::Dense { linear, activation } => {
                let z = linear.forward(&xs)?;
                match activation {
                    Activation::Relu => z.relu()?,
                    Activation::Softmax if Some(i) == head => z,
                    Activation::Softmax => ops::softmax(&z, D::Minus1)?,
                    Activation::Linear => z,
                }
            }
            Stage::Dropout(dropout) => dropout.forward(&xs, train)?,
        };
    }
    Ok(xs)
}

/// Mean loss and accuracy over `xs`/`ys` in inference mode.
fn evaluate_tensors(stages: &[Stage], xs: &Tensor, ys: &Tensor) -> candle_core::Result<Evaluation> {
    let n = ys.dim(0)?;
    if n == 0 {
        return Ok(Evaluation { loss: 0.0, accuracy: 0.0 });
    }

    let mut loss_sum = 0.0;
    let mut correct = 0.0;
    for start in (0..n).step_by(EVAL_BATCH) {
        let len = EVAL_BATCH.min(n - start);
        let batch_y = ys.narrow(0, start, len)?;
        let logits = forward(stages, &xs.narrow(0, start, len)?, false)?;
        let batch_loss = loss::cross_entropy(&logits, &batch_y)?;
        loss_sum += f64::from(batch_loss.to_scalar::<f32>()?) * len as f64;
        correct += count_correct(&logits, &batch_y)?;
    }

    Ok(Evaluation {
        loss: loss_sum / n as f64,
        accuracy: correct / n as f64,
    })
}

/// Number of rows whose arg-max equals the label.
fn count_correct(logits: &Tensor, labels: &Tensor) -> candle_core::Result<f64> {
    let hits = logits
        .argmax(D::Minus1)?
        .eq(labels)?
        .to_dtype(DType::F32)?
        .sum_all()?
        .to_scalar::<f32>()?;
    Ok(f64::from(hits))
}

fn images_tensor(inputs: &NormalizedImages, device: &Device) -> candle_core::Result<Tensor> {
    Tensor::from_slice(&inputs.values, (inputs.len(), inputs.rows, inputs.cols), device)
}

fn labels_tensor(labels: &[u8], device: &Device) -> candle_core::Result<Tensor> {
    let labels: Vec<u32> = labels.iter().map(|&l| u32::from(l)).collect();
    let n = labels.len();
    Tensor::from_vec(labels, n, device)
}
