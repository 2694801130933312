//! BERT classification head on top of Candle.
//!
//! A configuration-driven composition of Candle's BERT encoder with a
//! dropout stage and an optional linear projection. Both sequence-level
//! classification (from the pooled CLS output or from all time steps) and
//! step-wise token classification are supported, selected by
//! [`ClassificationStrategy`].
//!
//! Based on Candle's official BERT implementation pattern, following the
//! reference: https://github.com/huggingface/candle/blob/main/candle-examples/examples/bert/main.rs

pub mod classifier;
pub mod core;
pub mod encoder;

pub use crate::core::{
    ClassificationStrategy, ClassifierConfig, ClassifierError, ClassifierResult, LogitLayerConfig,
    ModelConfigLoader, TextTokenizer,
};

pub use crate::classifier::BertClassifier;
pub use crate::encoder::{BertEncoder, ModelAssets};

// Shared test fixtures
#[cfg(test)]
pub mod test_fixtures;
