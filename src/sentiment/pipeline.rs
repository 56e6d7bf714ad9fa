use std::collections::HashMap;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config, ModernBertForSequenceClassification,
};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::config::SentimentConfig;
use crate::error::AnalysisError;
use crate::sentiment::analyzer::SentimentAnalyzer;
use crate::sentiment::result::SentimentResult;

/// Pre-trained sentiment pipeline: a ModernBERT sequence classifier
/// fetched from the hub and run on the CPU (or the first CUDA device when
/// candle was built with CUDA support).
///
/// Built once by the entry point with [`TransformerSentiment::load`] and
/// then shared by reference.
pub struct TransformerSentiment {
    model: ModernBertForSequenceClassification,
    tokenizer: Tokenizer,
    id2label: HashMap<String, String>,
    device: Device,
}

#[derive(Deserialize)]
struct LabelMaps {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    label2id: HashMap<String, u32>,
}

impl TransformerSentiment {
    /// Downloads (or reuses the cached) config, weights and tokenizer of
    /// `config.model_repo` and builds the classifier.
    pub fn load(config: &SentimentConfig) -> Result<Self, AnalysisError> {
        let device = Device::cuda_if_available(0)?;

        let api = Api::new()?;
        let repo = api.repo(Repo::new(config.model_repo.clone(), RepoType::Model));

        let config_path = repo.get("config.json")?;
        let tokenizer_path = repo.get("tokenizer.json")?;
        let weights_path = repo
            .get("model.safetensors")
            .or_else(|_| repo.get("pytorch_model.bin"))?;

        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| AnalysisError::ModelLoad(format!("{}: {e}", config_path.display())))?;
        let mut model_config: Config = serde_json::from_str(&raw)
            .map_err(|e| AnalysisError::ModelLoad(format!("invalid model config: {e}")))?;
        let labels: LabelMaps = serde_json::from_str(&raw)
            .map_err(|e| AnalysisError::ModelLoad(format!("invalid label maps: {e}")))?;

        let num_labels = labels.label2id.len().max(labels.id2label.len());
        if num_labels == 0 {
            return Err(AnalysisError::ModelLoad(format!(
                "'{}' declares no output labels",
                config.model_repo
            )));
        }
        ensure_classifier_config(&mut model_config, num_labels);

        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            // SAFETY: the hub cache file is not modified while mapped.
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&weights_path, DType::F32, &device)?
        };
        let model = ModernBertForSequenceClassification::load(vb, &model_config)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            AnalysisError::ModelLoad(format!(
                "failed to load tokenizer from '{}': {e}",
                tokenizer_path.display()
            ))
        })?;

        tracing::info!(repo = %config.model_repo, labels = num_labels, "Sentiment model loaded");

        Ok(TransformerSentiment {
            model,
            tokenizer,
            id2label: labels.id2label,
            device,
        })
    }
}

impl SentimentAnalyzer for TransformerSentiment {
    fn classify(&self, text: &str) -> Result<SentimentResult, AnalysisError> {
        let tokens = self.tokenizer.encode(text, true).map_err(|e| {
            AnalysisError::Tokenization(format!(
                "'{}': {e}",
                text.chars().take(50).collect::<String>()
            ))
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let probs = softmax(&logits, D::Minus1)?.squeeze(0)?.to_vec1::<f32>()?;

        let (pred_id, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
                Some((_, top)) if top >= p => best,
                _ => Some((i, p)),
            })
            .ok_or_else(|| AnalysisError::Inference("model returned no scores".to_owned()))?;

        let label = self.id2label.get(&pred_id.to_string()).ok_or_else(|| {
            AnalysisError::Inference(format!("predicted label id {pred_id} has no name"))
        })?;

        Ok(SentimentResult {
            label: normalize_label(label),
            confidence: f64::from(confidence),
        })
    }
}

/// Pipelines name classes in different cases (`positive`, `Positive`,
/// `POSITIVE`); the decision layer expects the upper-case form.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// The hub config stores `label2id` with integer values, which the candle
/// config cannot read; rebuild the classifier section with synthetic names
/// so the head is sized for `num_labels`.
fn ensure_classifier_config(config: &mut Config, num_labels: usize) {
    let declared = config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0);
    if declared == num_labels {
        return;
    }

    let id2label: HashMap<String, String> = (0..num_labels)
        .map(|i| (i.to_string(), format!("label_{i}")))
        .collect();
    let label2id: HashMap<String, String> = id2label
        .iter()
        .map(|(k, v)| (v.clone(), k.clone()))
        .collect();

    config.classifier_config = Some(ClassifierConfig {
        id2label,
        label2id,
        classifier_pooling: ClassifierPooling::default(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_upper_cased() {
        assert_eq!(normalize_label("positive"), "POSITIVE");
        assert_eq!(normalize_label(" Negative "), "NEGATIVE");
        assert_eq!(normalize_label("NEUTRAL"), "NEUTRAL");
    }

    #[test]
    fn label_maps_accept_integer_ids() {
        let maps: LabelMaps = serde_json::from_str(
            r#"{ "id2label": { "0": "negative", "1": "neutral", "2": "positive" },
                 "label2id": { "negative": 0, "neutral": 1, "positive": 2 },
                 "hidden_size": 768 }"#,
        )
        .unwrap();
        assert_eq!(maps.id2label.len(), 3);
        assert_eq!(maps.label2id["positive"], 2);
    }
}
