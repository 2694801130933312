//! Text tokenization front end
//!
//! Thin wrapper around `tokenizers::Tokenizer` that produces the token-id,
//! token-type and attention-mask tensors the classifier consumes.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use tokenizers::{Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

use crate::core::error::{ClassifierResult, ModelErrorType};
use crate::model_error;

/// Default truncation length when none is configured.
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Tokenization result for a single text.
#[derive(Debug, Clone)]
pub struct TokenizedInput {
    pub token_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub tokens: Vec<String>,
}

/// Tokenization result for a batch of texts, padded to the batch maximum.
#[derive(Debug)]
pub struct TokenizedBatch {
    /// Token ids, shape `[batch, max_len]`.
    pub token_ids: Tensor,
    /// Token type ids (all zero for single-sentence input), shape `[batch, max_len]`.
    pub token_type_ids: Tensor,
    /// Attention mask, shape `[batch, max_len]`.
    pub attention_mask: Tensor,
    /// Unpadded length of each sequence.
    pub sequence_lengths: Vec<usize>,
    /// Token strings per sequence, unpadded.
    pub tokens: Vec<Vec<String>>,
}

/// Tokenizer wrapper bound to a compute device.
pub struct TextTokenizer {
    tokenizer: Tokenizer,
    device: Device,
    max_length: usize,
}

impl TextTokenizer {
    /// Wrap an existing tokenizer, configuring right-side longest-first
    /// truncation at `max_length`.
    pub fn new(
        mut tokenizer: Tokenizer,
        device: Device,
        max_length: Option<usize>,
    ) -> ClassifierResult<Self> {
        let max_length = max_length.unwrap_or(DEFAULT_MAX_LENGTH);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                strategy: TruncationStrategy::LongestFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| model_error!(ModelErrorType::Tokenizer, "truncation setup", e))?;
        Ok(Self {
            tokenizer,
            device,
            max_length,
        })
    }

    /// Load a `tokenizer.json` file.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        device: Device,
        max_length: Option<usize>,
    ) -> ClassifierResult<Self> {
        let tokenizer = Tokenizer::from_file(path.as_ref()).map_err(|e| {
            model_error!(
                ModelErrorType::Tokenizer,
                "tokenizer loading",
                e,
                path.as_ref().to_string_lossy()
            )
        })?;
        Self::new(tokenizer, device, Some(max_length.unwrap_or(DEFAULT_MAX_LENGTH)))
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Tokenize a single text.
    pub fn encode(&self, text: &str) -> ClassifierResult<TokenizedInput> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| model_error!(ModelErrorType::Tokenizer, "tokenization", e))?;
        Ok(TokenizedInput {
            token_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
            tokens: encoding.get_tokens().to_vec(),
        })
    }

    /// Build `[1, T]` tensors for a single tokenized text.
    pub fn tensors(&self, input: &TokenizedInput) -> ClassifierResult<(Tensor, Tensor, Tensor)> {
        let token_ids = Tensor::new(&input.token_ids[..], &self.device)?.unsqueeze(0)?;
        let token_type_ids = token_ids.zeros_like()?;
        let attention_mask = Tensor::new(&input.attention_mask[..], &self.device)?.unsqueeze(0)?;
        Ok((token_ids, token_type_ids, attention_mask))
    }

    /// Tokenize a batch of texts, padding every sequence to the batch maximum.
    pub fn encode_batch(&self, texts: &[&str]) -> ClassifierResult<TokenizedBatch> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| model_error!(ModelErrorType::Tokenizer, "batch tokenization", e))?;

        let batch_size = encodings.len();
        let sequence_lengths: Vec<usize> = encodings.iter().map(|e| e.get_ids().len()).collect();
        let max_len = sequence_lengths.iter().copied().max().unwrap_or(0);

        let mut ids = Vec::with_capacity(batch_size * max_len);
        let mut mask = Vec::with_capacity(batch_size * max_len);
        let mut tokens = Vec::with_capacity(batch_size);
        for encoding in &encodings {
            let seq_ids = encoding.get_ids();
            ids.extend_from_slice(seq_ids);
            ids.extend(std::iter::repeat(0u32).take(max_len - seq_ids.len()));
            mask.extend(std::iter::repeat(1u32).take(seq_ids.len()));
            mask.extend(std::iter::repeat(0u32).take(max_len - seq_ids.len()));
            tokens.push(encoding.get_tokens().to_vec());
        }

        let token_ids = Tensor::from_vec(ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::zeros((batch_size, max_len), DType::U32, &self.device)?;

        Ok(TokenizedBatch {
            token_ids,
            token_type_ids,
            attention_mask,
            sequence_lengths,
            tokens,
        })
    }
}

impl std::fmt::Debug for TextTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTokenizer")
            .field("device", &self.device)
            .field("max_length", &self.max_length)
            .finish()
    }
}
