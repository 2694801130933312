//! # Core Layer
//!
//! Configuration, error handling and tokenization shared by the encoder and
//! classifier modules.

pub mod config;
pub mod error;
pub mod tokenization;

pub use config::{ClassificationStrategy, ClassifierConfig, LogitLayerConfig, ModelConfigLoader};

pub use error::{
    config_errors, processing_errors, ClassifierError, ClassifierResult, ConfigErrorType,
    ModelErrorType,
};

pub use tokenization::{TextTokenizer, TokenizedBatch, TokenizedInput, DEFAULT_MAX_LENGTH};

// Test modules (only compiled in test builds)
#[cfg(test)]
pub mod config_test;
