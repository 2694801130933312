//! BERT classification head
//!
//! Composes the BERT encoder with a dropout stage and an optional linear
//! projection, supporting sequence-level classification (from the pooled CLS
//! output or from all time steps) and step-wise token classification.

use candle_core::{Device, IndexOp, Module, Tensor, D};
use candle_nn::{Dropout, Linear, VarBuilder};
use candle_transformers::models::bert::{Config, HiddenAct};

use crate::classifier::predictions;
use crate::core::config::{ClassificationStrategy, ClassifierConfig};
use crate::core::error::{
    config_errors, processing_errors, ClassifierResult, ModelErrorType,
};
use crate::core::tokenization::TextTokenizer;
use crate::encoder::{BertEncoder, ModelAssets};
use crate::{model_error, validation_error};

/// Classifier based on a BERT encoder.
///
/// The classification strategy and class count are fixed at construction;
/// `forward` returns `(logits, predictions)` with shapes governed by both
/// (see [`ClassificationStrategy`]).
pub struct BertClassifier {
    encoder: BertEncoder,
    dropout: Dropout,
    /// Projection to `num_classes` logits; absent when `num_classes <= 0`,
    /// in which case the encoder output is used as logits directly.
    logits_layer: Option<Linear>,
    /// Tokenizer for the text-level entry points; absent when the classifier
    /// was built from a bare `VarBuilder`.
    tokenizer: Option<TextTokenizer>,
    config: ClassifierConfig,
    /// Fixed at construction: single-logit heads threshold at zero instead
    /// of taking an argmax.
    is_binary: bool,
    device: Device,
}

impl BertClassifier {
    /// Build the classifier from a `VarBuilder` holding the model weights.
    ///
    /// Encoder weights are read under the `bert` prefix and the projection
    /// under `classifier`. With `all_time` strategy the projection input
    /// dimension is `hidden_size * max_seq_length`; a missing
    /// `max_seq_length` is rejected here.
    pub fn load(
        vb: VarBuilder,
        encoder_config: &Config,
        config: ClassifierConfig,
    ) -> ClassifierResult<Self> {
        config.validate()?;

        let encoder = BertEncoder::load(vb.clone(), encoder_config)?;
        let dropout = Dropout::new(config.dropout);

        let logits_layer = if config.num_classes > 0 {
            let num_classes = config.num_classes as usize;
            let input_dim = match config.strategy {
                ClassificationStrategy::AllTime => {
                    let max_seq_length = config
                        .max_seq_length
                        .ok_or_else(|| config_errors::missing_field("max_seq_length", "config"))?;
                    encoder.output_size() * max_seq_length
                }
                _ => encoder.output_size(),
            };
            let vb_classifier = vb.pp("classifier");
            let layer = if config.logit_layer.bias {
                candle_nn::linear(input_dim, num_classes, vb_classifier)
            } else {
                candle_nn::linear_no_bias(input_dim, num_classes, vb_classifier)
            }
            .map_err(|e| model_error!(ModelErrorType::Classifier, "projection loading", e))?;
            Some(layer)
        } else {
            None
        };

        let is_binary =
            config.num_classes == 1 || (config.num_classes <= 0 && encoder.output_size() == 1);
        let device = encoder.device().clone();

        Ok(Self {
            encoder,
            dropout,
            logits_layer,
            tokenizer: None,
            config,
            is_binary,
            device,
        })
    }

    /// Load a pretrained model by id (local directory or HuggingFace Hub),
    /// including its tokenizer.
    pub fn from_pretrained(
        model_id: &str,
        config: ClassifierConfig,
        use_cpu: bool,
    ) -> ClassifierResult<Self> {
        let device = if use_cpu {
            Device::Cpu
        } else {
            Device::cuda_if_available(0)?
        };

        println!("Initializing BERT classifier: {}", model_id);
        let assets = ModelAssets::resolve(model_id)?;

        let content = std::fs::read_to_string(&assets.config)
            .map_err(|_| config_errors::file_not_found(&assets.config.to_string_lossy()))?;
        let mut encoder_config: Config = serde_json::from_str(&content)?;
        // Approximate GELU for better performance.
        encoder_config.hidden_act = HiddenAct::GeluApproximate;

        let tokenizer =
            TextTokenizer::from_file(&assets.tokenizer, device.clone(), config.max_seq_length)?;

        let vb = assets.var_builder(&device)?;
        let mut classifier = Self::load(vb, &encoder_config, config)?;
        classifier.set_tokenizer(tokenizer);
        Ok(classifier)
    }

    /// Attach a tokenizer for the text-level entry points.
    pub fn set_tokenizer(&mut self, tokenizer: TextTokenizer) {
        self.tokenizer = Some(tokenizer);
    }

    /// Feed token ids through the encoder and head.
    ///
    /// * `token_ids` - shape `[batch, time]`.
    /// * `sequence_lengths` - unpadded length per sequence; positions beyond
    ///   a length are masked by the encoder.
    /// * `segment_ids` - shape `[batch, time]`; all-zero when absent.
    ///
    /// Returns `(logits, predictions)`:
    /// - `cls_time` / `all_time`: logits `[batch]` (binary) or
    ///   `[batch, num_classes]`, predictions `[batch]`;
    /// - `time_wise`: logits `[batch, time]` (binary) or
    ///   `[batch, time, num_classes]`, predictions `[batch, time]`.
    pub fn forward(
        &self,
        token_ids: &Tensor,
        sequence_lengths: Option<&[usize]>,
        segment_ids: Option<&Tensor>,
    ) -> ClassifierResult<(Tensor, Tensor)> {
        let (sequence_output, pooled_output) =
            self.encoder.encode(token_ids, sequence_lengths, segment_ids)?;

        let logits_source = match self.config.strategy {
            ClassificationStrategy::TimeWise => sequence_output,
            ClassificationStrategy::ClsTime => pooled_output,
            ClassificationStrategy::AllTime => {
                let (batch_size, seq_len, features) = sequence_output.dims3()?;
                let max_seq_length = self
                    .config
                    .max_seq_length
                    .ok_or_else(|| config_errors::missing_field("max_seq_length", "config"))?;
                if seq_len > max_seq_length {
                    return Err(processing_errors::sequence_too_long(seq_len, max_seq_length));
                }
                // Zero-pad the time axis to max_seq_length before flattening.
                let padded = sequence_output.pad_with_zeros(1, 0, max_seq_length - seq_len)?;
                padded.reshape((batch_size, features * max_seq_length))?
            }
        };

        let logits = match &self.logits_layer {
            Some(layer) => {
                let regularized = self.dropout.forward(&logits_source, false)?;
                layer.forward(&regularized)?
            }
            None => logits_source,
        };

        match self.config.strategy {
            ClassificationStrategy::TimeWise => predictions::token_level(logits, self.is_binary),
            _ => predictions::sequence_level(logits, self.is_binary),
        }
    }

    /// The trailing logit dimension implied by the configuration.
    ///
    /// Fails while `num_classes < 1`: without running the encoder the true
    /// dimension is unknown. Identical for all three strategies.
    pub fn output_size(&self) -> ClassifierResult<usize> {
        if self.config.num_classes < 1 {
            return Err(validation_error!(
                "num_classes",
                ">= 1",
                self.config.num_classes,
                "logit dimension is undefined without running the encoder"
            ));
        }
        Ok(self.config.num_classes as usize)
    }

    /// Classify a single text, returning the predicted class and its
    /// confidence. Requires a sequence-level strategy.
    pub fn classify_text(&self, text: &str) -> ClassifierResult<(usize, f32)> {
        self.require_sequence_level("classify_text")?;
        let tokenizer = self.tokenizer()?;

        let input = tokenizer.encode(text)?;
        let (token_ids, _, _) = tokenizer.tensors(&input)?;
        let lengths = [input.token_ids.len()];
        let (logits, preds) = self.forward(&token_ids, Some(&lengths), None)?;

        let pred = preds.to_vec1::<u32>()?[0] as usize;
        let confidence = if self.is_binary {
            let logit = logits.to_vec1::<f32>()?[0];
            binary_confidence(logit, pred)
        } else {
            let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)?;
            probabilities.i(0)?.to_vec1::<f32>()?[pred]
        };
        Ok((pred, confidence))
    }

    /// Classify a batch of texts. Requires a sequence-level strategy.
    pub fn classify_batch(&self, texts: &[&str]) -> ClassifierResult<Vec<(usize, f32)>> {
        self.require_sequence_level("classify_batch")?;
        let tokenizer = self.tokenizer()?;

        let batch = tokenizer.encode_batch(texts)?;
        let (logits, preds) =
            self.forward(&batch.token_ids, Some(&batch.sequence_lengths), None)?;
        let preds = preds.to_vec1::<u32>()?;

        if self.is_binary {
            let logits = logits.to_vec1::<f32>()?;
            Ok(preds
                .iter()
                .zip(logits.iter())
                .map(|(&pred, &logit)| (pred as usize, binary_confidence(logit, pred as usize)))
                .collect())
        } else {
            let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)?;
            let rows = probabilities.to_vec2::<f32>()?;
            Ok(preds
                .iter()
                .zip(rows.iter())
                .map(|(&pred, row)| (pred as usize, row[pred as usize]))
                .collect())
        }
    }

    /// Classify each token of a text. Requires the `time_wise` strategy.
    ///
    /// Returns `(token, predicted class, confidence)` per token.
    pub fn classify_tokens(&self, text: &str) -> ClassifierResult<Vec<(String, usize, f32)>> {
        if self.config.strategy != ClassificationStrategy::TimeWise {
            return Err(validation_error!(
                "strategy",
                "time_wise",
                self.config.strategy,
                "classify_tokens produces one prediction per time step"
            ));
        }
        let tokenizer = self.tokenizer()?;

        let input = tokenizer.encode(text)?;
        let (token_ids, _, _) = tokenizer.tensors(&input)?;
        let lengths = [input.token_ids.len()];
        let (logits, preds) = self.forward(&token_ids, Some(&lengths), None)?;
        let preds = preds.to_vec2::<u32>()?;

        let mut results = Vec::with_capacity(input.tokens.len());
        if self.is_binary {
            let logits = logits.to_vec2::<f32>()?;
            for (step, token) in input.tokens.iter().enumerate() {
                let pred = preds[0][step] as usize;
                results.push((token.clone(), pred, binary_confidence(logits[0][step], pred)));
            }
        } else {
            let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)?;
            let probs = probabilities.to_vec3::<f32>()?;
            for (step, token) in input.tokens.iter().enumerate() {
                let pred = preds[0][step] as usize;
                results.push((token.clone(), pred, probs[0][step][pred]));
            }
        }
        Ok(results)
    }

    pub fn num_classes(&self) -> i64 {
        self.config.num_classes
    }

    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    pub fn strategy(&self) -> ClassificationStrategy {
        self.config.strategy
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn encoder(&self) -> &BertEncoder {
        &self.encoder
    }

    fn tokenizer(&self) -> ClassifierResult<&TextTokenizer> {
        self.tokenizer.as_ref().ok_or_else(|| {
            model_error!(
                ModelErrorType::Tokenizer,
                "tokenizer lookup",
                "no tokenizer attached; load the classifier with from_pretrained"
            )
        })
    }

    fn require_sequence_level(&self, operation: &str) -> ClassifierResult<()> {
        if !self.config.strategy.is_sequence_level() {
            return Err(validation_error!(
                "strategy",
                "cls_time or all_time",
                self.config.strategy,
                operation
            ));
        }
        Ok(())
    }
}

/// Confidence of the predicted class for a single-logit head.
fn binary_confidence(logit: f32, pred: usize) -> f32 {
    let positive = 1.0 / (1.0 + (-logit).exp());
    if pred == 1 {
        positive
    } else {
        1.0 - positive
    }
}

impl std::fmt::Debug for BertClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertClassifier")
            .field("name", &self.config.name)
            .field("strategy", &self.config.strategy)
            .field("num_classes", &self.config.num_classes)
            .field("is_binary", &self.is_binary)
            .field("device", &self.device)
            .finish()
    }
}
