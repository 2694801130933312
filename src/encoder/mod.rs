//! # Encoder Layer
//!
//! The external collaborator the classification head composes over: Candle's
//! BERT model plus pooler, and the model asset resolution that feeds it.

pub mod bert;
pub mod loader;

pub use bert::{default_segment_ids, BertEncoder};
pub use loader::ModelAssets;

// Test modules
#[cfg(test)]
pub mod bert_test;
#[cfg(test)]
pub mod loader_test;
