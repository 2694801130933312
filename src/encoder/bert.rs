//! BERT encoder wrapper
//!
//! Wraps Candle's official BERT implementation together with the pooler
//! layer, exposing per-token outputs and a pooled first-position (CLS)
//! output. Reference pattern:
//! https://github.com/huggingface/candle/blob/main/candle-examples/examples/bert/main.rs

use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};

use crate::core::error::{ClassifierResult, ModelErrorType};
use crate::model_error;

/// BERT encoder with pooler.
///
/// `encode` produces the pair of representations the classification
/// strategies select from: the full per-token output `[batch, time, hidden]`
/// and the pooled output `[batch, hidden]` derived from the CLS token.
pub struct BertEncoder {
    bert: BertModel,
    /// Pooler layer (CLS token -> pooled output), tanh-activated.
    pooler: Linear,
    hidden_size: usize,
    device: Device,
}

impl BertEncoder {
    /// Load the encoder from a `VarBuilder`. Weights live under the `bert`
    /// prefix, the pooler under `bert.pooler.dense`.
    pub fn load(vb: VarBuilder, config: &Config) -> ClassifierResult<Self> {
        let device = vb.device().clone();
        let bert = BertModel::load(vb.pp("bert"), config)
            .map_err(|e| model_error!(ModelErrorType::Encoder, "BERT loading", e))?;
        let pooler = candle_nn::linear(
            config.hidden_size,
            config.hidden_size,
            vb.pp("bert").pp("pooler").pp("dense"),
        )
        .map_err(|e| model_error!(ModelErrorType::Encoder, "pooler loading", e))?;

        Ok(Self {
            bert,
            pooler,
            hidden_size: config.hidden_size,
            device,
        })
    }

    /// The encoder's output feature dimension.
    pub fn output_size(&self) -> usize {
        self.hidden_size
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Run the encoder.
    ///
    /// * `token_ids` - token ids, shape `[batch, time]`.
    /// * `sequence_lengths` - unpadded length per sequence; positions beyond
    ///   a length are masked out. All positions attend when absent.
    /// * `segment_ids` - token type ids, shape `[batch, time]`; all-zero when
    ///   absent.
    ///
    /// Returns `(sequence_output [batch, time, hidden], pooled_output
    /// [batch, hidden])`.
    pub fn encode(
        &self,
        token_ids: &Tensor,
        sequence_lengths: Option<&[usize]>,
        segment_ids: Option<&Tensor>,
    ) -> ClassifierResult<(Tensor, Tensor)> {
        let (_batch_size, seq_len) = token_ids.dims2()?;

        let attention_mask = match sequence_lengths {
            Some(lengths) => self.length_mask(lengths, seq_len)?,
            None => Tensor::ones_like(token_ids)?,
        };
        let token_type_ids = match segment_ids {
            Some(ids) => ids.clone(),
            None => token_ids.zeros_like()?,
        };

        let sequence_output =
            self.bert
                .forward(token_ids, &token_type_ids, Some(&attention_mask))?;

        // BERT pooler: dense + tanh over the CLS token.
        let cls_output = sequence_output.i((.., 0))?;
        let pooled_output = self.pooler.forward(&cls_output)?.tanh()?;

        Ok((sequence_output, pooled_output))
    }

    /// Binary mask `[batch, time]` with ones at positions below each
    /// sequence's length. Lengths above `seq_len` are clamped.
    fn length_mask(&self, lengths: &[usize], seq_len: usize) -> ClassifierResult<Tensor> {
        let mut mask = Vec::with_capacity(lengths.len() * seq_len);
        for &len in lengths {
            let len = len.min(seq_len);
            mask.extend(std::iter::repeat(1u32).take(len));
            mask.extend(std::iter::repeat(0u32).take(seq_len - len));
        }
        Ok(Tensor::from_vec(
            mask,
            (lengths.len(), seq_len),
            &self.device,
        )?)
    }
}

impl std::fmt::Debug for BertEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEncoder")
            .field("hidden_size", &self.hidden_size)
            .field("device", &self.device)
            .finish()
    }
}

/// All-zero segment ids matching a token-id tensor. Exposed for callers that
/// build encoder inputs by hand.
pub fn default_segment_ids(token_ids: &Tensor) -> ClassifierResult<Tensor> {
    Ok(Tensor::zeros(
        token_ids.dims2()?,
        DType::U32,
        token_ids.device(),
    )?)
}
