//! Prediction derivation
//!
//! Converts logits into discrete class predictions. Binary heads threshold
//! the raw logit at zero; multiclass heads take the argmax over the class
//! axis. Kept as free functions so the shape contracts are testable on
//! hand-built tensors.

use candle_core::{DType, Tensor, D};

use crate::core::error::ClassifierResult;

/// Derive sequence-level predictions (`cls_time` / `all_time`).
///
/// Binary: logits are flattened to `[batch]` and the prediction is
/// `logit > 0`. Multiclass: logits stay `[batch, num_classes]` and the
/// prediction is the per-row argmax, flattened to `[batch]`.
pub fn sequence_level(logits: Tensor, is_binary: bool) -> ClassifierResult<(Tensor, Tensor)> {
    if is_binary {
        let predictions = logits.gt(0f32)?.to_dtype(DType::U32)?.flatten_all()?;
        let logits = logits.flatten_all()?;
        Ok((logits, predictions))
    } else {
        let predictions = logits.argmax(D::Minus1)?.flatten_all()?;
        Ok((logits, predictions))
    }
}

/// Derive step-wise predictions (`time_wise`).
///
/// Binary: the trailing singleton class dimension is squeezed away and the
/// prediction is `logit > 0`, both `[batch, time]`. Multiclass: logits stay
/// `[batch, time, num_classes]` and the prediction is the per-step argmax,
/// `[batch, time]`.
pub fn token_level(logits: Tensor, is_binary: bool) -> ClassifierResult<(Tensor, Tensor)> {
    if is_binary {
        let logits = logits.squeeze(D::Minus1)?;
        let predictions = logits.gt(0f32)?.to_dtype(DType::U32)?;
        Ok((logits, predictions))
    } else {
        let predictions = logits.argmax(D::Minus1)?;
        Ok((logits, predictions))
    }
}
