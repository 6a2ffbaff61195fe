//! SQuAD-style extractive question answering over an ONNX transformer.

use std::path::Path;

use autofill_inference::{InferenceBackend, InputTensor, OrtBackend, OutputTensor};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::{Answer, QuestionAnswerer};
use crate::error::QaError;
use crate::models::config::{AutofillConfig, QaConfig};

const DEFAULT_CLS_ID: u32 = 101;
const DEFAULT_SEP_ID: u32 = 102;

/// Extractive QA model: `[CLS] question [SEP] context [SEP]` in, start and
/// end logits out.
pub struct BertQa {
    backend: Box<dyn InferenceBackend>,
    tokenizer: Tokenizer,
    config: QaConfig,
    cls_id: u32,
    sep_id: u32,
}

impl BertQa {
    pub fn new(backend: Box<dyn InferenceBackend>, tokenizer: Tokenizer, config: QaConfig) -> Self {
        let cls_id = tokenizer.token_to_id("[CLS]").unwrap_or(DEFAULT_CLS_ID);
        let sep_id = tokenizer.token_to_id("[SEP]").unwrap_or(DEFAULT_SEP_ID);

        Self {
            backend,
            tokenizer,
            config,
            cls_id,
            sep_id,
        }
    }

    /// Load an ONNX model and its `tokenizer.json`.
    pub fn from_files(model_path: &Path, tokenizer_path: &Path, config: QaConfig) -> Result<Self, QaError> {
        if !model_path.exists() {
            return Err(QaError::ModelLoad(format!("missing {}", model_path.display())));
        }

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| QaError::Tokenizer(format!("{}: {}", tokenizer_path.display(), e)))?;
        let backend = OrtBackend::from_file(model_path, config.num_threads)
            .map_err(|e| QaError::ModelLoad(e.to_string()))?;

        info!("Loaded question answering model from {}", model_path.display());
        Ok(Self::new(Box::new(backend), tokenizer, config))
    }

    /// Load the model files named in the configuration.
    pub fn from_config(config: &AutofillConfig) -> Result<Self, QaError> {
        Self::from_files(
            &config.model_path(&config.models.qa_model),
            &config.model_path(&config.models.qa_tokenizer),
            config.qa.clone(),
        )
    }

    fn logits(&self, outputs: &[(String, OutputTensor)], name: &str, position: usize) -> Result<Vec<f32>, QaError> {
        outputs
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| outputs.get(position))
            .and_then(|(_, tensor)| tensor.to_f32_vec())
            .ok_or_else(|| QaError::Inference(format!("model did not return {}", name)))
    }
}

impl QuestionAnswerer for BertQa {
    fn answer(&self, question: &str, context: &str) -> Result<Answer, QaError> {
        let question_enc = self
            .tokenizer
            .encode(question, false)
            .map_err(|e| QaError::Tokenizer(e.to_string()))?;
        let context_enc = self
            .tokenizer
            .encode(context, false)
            .map_err(|e| QaError::Tokenizer(e.to_string()))?;

        let question_ids = question_enc.get_ids();
        let budget = self
            .config
            .max_sequence_length
            .saturating_sub(question_ids.len() + 3);
        let context_ids = &context_enc.get_ids()[..context_enc.len().min(budget)];
        if context_ids.is_empty() {
            return Err(QaError::Inference("question leaves no room for context".to_string()));
        }

        let mut input_ids: Vec<u32> = Vec::with_capacity(question_ids.len() + context_ids.len() + 3);
        input_ids.push(self.cls_id);
        input_ids.extend_from_slice(question_ids);
        input_ids.push(self.sep_id);
        let context_start = input_ids.len();
        input_ids.extend_from_slice(context_ids);
        let context_end = input_ids.len();
        input_ids.push(self.sep_id);

        let seq_len = input_ids.len();
        let ids: Vec<i64> = input_ids.iter().map(|&id| id as i64).collect();
        let type_ids: Vec<i64> = (0..seq_len).map(|i| i64::from(i >= context_start)).collect();

        let to_tensor = |data: Vec<i64>| {
            InputTensor::from_i64(data, &[1, seq_len]).map_err(|e| QaError::Inference(e.to_string()))
        };

        let mut inputs = vec![
            ("input_ids", to_tensor(ids)?),
            ("attention_mask", to_tensor(vec![1; seq_len])?),
        ];
        if self.backend.has_input("token_type_ids") {
            inputs.push(("token_type_ids", to_tensor(type_ids)?));
        }

        let outputs = self
            .backend
            .run(&inputs)
            .map_err(|e| QaError::Inference(e.to_string()))?;

        let start_probs = softmax(&self.logits(&outputs, "start_logits", 0)?);
        let end_probs = softmax(&self.logits(&outputs, "end_logits", 1)?);
        if start_probs.len() < context_end || end_probs.len() < context_end {
            return Err(QaError::Inference(format!(
                "expected {} logits, got {}",
                seq_len,
                start_probs.len().min(end_probs.len())
            )));
        }

        let Some((start, end, score)) = best_span(
            &start_probs,
            &end_probs,
            context_start..context_end,
            self.config.max_answer_tokens,
        ) else {
            return Ok(Answer {
                text: String::new(),
                score: 0.0,
            });
        };

        let offsets = context_enc.get_offsets();
        let (char_start, _) = offsets[start - context_start];
        let (_, char_end) = offsets[end - context_start];
        let text = context.get(char_start..char_end).unwrap_or_default().trim().to_string();

        debug!("QA span [{}, {}] score {:.4}: {:?}", start, end, score, text);
        Ok(Answer { text, score })
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Highest `start_prob * end_prob` span inside `range`, at most `max_len`
/// tokens long.
fn best_span(
    start_probs: &[f32],
    end_probs: &[f32],
    range: std::ops::Range<usize>,
    max_len: usize,
) -> Option<(usize, usize, f32)> {
    let mut best: Option<(usize, usize, f32)> = None;

    for s in range.clone() {
        for e in s..(s + max_len).min(range.end) {
            let score = start_probs[s] * end_probs[e];
            if best.is_none_or(|(_, _, b)| score > b) {
                best = Some((s, e, score));
            }
        }
    }

    best
}
