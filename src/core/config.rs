//! Classifier configuration
//!
//! Typed configuration record for the classification head, plus helpers for
//! reading label metadata out of a model directory's `config.json`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::core::error::{config_errors, ClassifierError, ClassifierResult, ConfigErrorType};

/// How the classification signal is derived from the encoder output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStrategy {
    /// Sequence-level classification from the pooled first-position (CLS) output.
    ClsTime,
    /// Sequence-level classification from all time steps, zero-padded to
    /// `max_seq_length` and flattened.
    AllTime,
    /// Step-wise classification, one prediction per time step.
    TimeWise,
}

impl ClassificationStrategy {
    /// True for the strategies that produce one prediction per sequence.
    pub fn is_sequence_level(&self) -> bool {
        !matches!(self, ClassificationStrategy::TimeWise)
    }
}

impl fmt::Display for ClassificationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassificationStrategy::ClsTime => "cls_time",
            ClassificationStrategy::AllTime => "all_time",
            ClassificationStrategy::TimeWise => "time_wise",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ClassificationStrategy {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cls_time" => Ok(ClassificationStrategy::ClsTime),
            "all_time" => Ok(ClassificationStrategy::AllTime),
            "time_wise" => Ok(ClassificationStrategy::TimeWise),
            other => Err(ClassifierError::Configuration {
                operation: "strategy parsing".to_string(),
                source: ConfigErrorType::InvalidValue(format!(
                    "unknown classification strategy: {}",
                    other
                )),
                context: Some("expected one of: cls_time, all_time, time_wise".to_string()),
            }),
        }
    }
}

/// Constructor options for the logit projection layer.
///
/// Ignored when no projection layer is built (`num_classes <= 0`).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LogitLayerConfig {
    /// Whether the projection carries a bias term.
    pub bias: bool,
}

impl Default for LogitLayerConfig {
    fn default() -> Self {
        Self { bias: true }
    }
}

/// Configuration for [`BertClassifier`](crate::classifier::BertClassifier).
///
/// Encoder options live in `candle_transformers`' own `bert::Config`, loaded
/// from the model's `config.json` next to this record.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of classes. If `> 0` a linear projection maps the encoder
    /// output to this many logits; if `<= 0` no projection is built and the
    /// encoder's own output dimension is the effective logit dimension.
    pub num_classes: i64,
    /// Options for the logit projection layer.
    pub logit_layer: LogitLayerConfig,
    /// Classification strategy.
    pub strategy: ClassificationStrategy,
    /// Maximum possible input sequence length. Required when `strategy` is
    /// `all_time`.
    pub max_seq_length: Option<usize>,
    /// Dropout rate applied to the encoder output before the projection.
    pub dropout: f32,
    /// Name of the classifier.
    pub name: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            num_classes: 2,
            logit_layer: LogitLayerConfig::default(),
            strategy: ClassificationStrategy::ClsTime,
            max_seq_length: None,
            dropout: 0.1,
            name: "bert_classifier".to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Check required option combinations up front, before any weights load.
    pub fn validate(&self) -> ClassifierResult<()> {
        if self.strategy == ClassificationStrategy::AllTime && self.max_seq_length.is_none() {
            return Err(ClassifierError::Configuration {
                operation: "config validation".to_string(),
                source: ConfigErrorType::MissingField("max_seq_length".to_string()),
                context: Some("required when strategy is all_time".to_string()),
            });
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ClassifierError::Configuration {
                operation: "config validation".to_string(),
                source: ConfigErrorType::InvalidValue(format!(
                    "dropout must lie in [0, 1), got {}",
                    self.dropout
                )),
                context: None,
            });
        }
        Ok(())
    }

    /// Parse a configuration from a JSON value. Unknown strategy strings
    /// surface as configuration errors here.
    pub fn from_value(value: Value) -> ClassifierResult<Self> {
        let config: ClassifierConfig = serde_json::from_value(value).map_err(|e| {
            config_errors::invalid_json("classifier config", &e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClassifierResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| config_errors::file_not_found(&path.to_string_lossy()))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| config_errors::invalid_json(&path.to_string_lossy(), &e.to_string()))?;
        Self::from_value(value)
    }
}

/// Helpers for reading label metadata from a model directory's `config.json`.
pub struct ModelConfigLoader;

impl ModelConfigLoader {
    /// Load and parse the `config.json` inside a model directory.
    pub fn load_json_config(model_path: &str) -> ClassifierResult<Value> {
        let config_path = Path::new(model_path).join("config.json");
        let content = std::fs::read_to_string(&config_path)
            .map_err(|_| config_errors::file_not_found(&config_path.to_string_lossy()))?;
        serde_json::from_str(&content)
            .map_err(|e| config_errors::invalid_json(&config_path.to_string_lossy(), &e.to_string()))
    }

    /// Extract the `id2label` mapping.
    pub fn extract_id2label(config_json: &Value) -> ClassifierResult<HashMap<usize, String>> {
        let id2label_json = config_json
            .get("id2label")
            .ok_or_else(|| config_errors::missing_field("id2label", "config.json"))?;

        let obj = id2label_json.as_object().ok_or_else(|| {
            config_errors::invalid_json("config.json", "id2label is not an object")
        })?;

        let mut id2label = HashMap::new();
        for (id_str, label_value) in obj {
            let id: usize = id_str.parse().map_err(|e| {
                config_errors::invalid_json(
                    "config.json",
                    &format!("invalid id in id2label: {}", e),
                )
            })?;
            let label = label_value
                .as_str()
                .ok_or_else(|| {
                    config_errors::invalid_json("config.json", "label value is not a string")
                })?
                .to_string();
            id2label.insert(id, label);
        }
        Ok(id2label)
    }

    /// Derive the class count from `id2label`.
    pub fn num_labels(config_json: &Value) -> ClassifierResult<usize> {
        Ok(Self::extract_id2label(config_json)?.len())
    }
}
