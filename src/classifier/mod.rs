//! # Classification Head
//!
//! The classification head composed over the encoder: strategy dispatch,
//! optional logit projection and prediction derivation.

pub mod bert_classifier;
pub mod predictions;

pub use bert_classifier::BertClassifier;
