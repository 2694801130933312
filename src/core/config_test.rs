//! Tests for the configuration module

use std::str::FromStr;

use rstest::*;
use serde_json::json;

use super::config::*;
use crate::core::error::ClassifierError;

#[rstest]
fn test_config_defaults() {
    let config = ClassifierConfig::default();
    assert_eq!(config.num_classes, 2);
    assert_eq!(config.strategy, ClassificationStrategy::ClsTime);
    assert!(config.max_seq_length.is_none());
    assert!((config.dropout - 0.1).abs() < f32::EPSILON);
    assert_eq!(config.name, "bert_classifier");
    assert!(config.logit_layer.bias);
    assert!(config.validate().is_ok());
}

#[rstest]
#[case("cls_time", ClassificationStrategy::ClsTime)]
#[case("all_time", ClassificationStrategy::AllTime)]
#[case("time_wise", ClassificationStrategy::TimeWise)]
fn test_strategy_from_str(#[case] input: &str, #[case] expected: ClassificationStrategy) {
    let strategy = ClassificationStrategy::from_str(input).unwrap();
    assert_eq!(strategy, expected);
    assert_eq!(strategy.to_string(), input);
}

#[rstest]
fn test_strategy_rejects_unknown_value() {
    let error = ClassificationStrategy::from_str("first_token").unwrap_err();
    assert!(matches!(error, ClassifierError::Configuration { .. }));
    let error_string = format!("{}", error);
    assert!(error_string.contains("unknown classification strategy"));
    assert!(error_string.contains("first_token"));
}

#[rstest]
#[case(ClassificationStrategy::ClsTime, true)]
#[case(ClassificationStrategy::AllTime, true)]
#[case(ClassificationStrategy::TimeWise, false)]
fn test_strategy_sequence_level(
    #[case] strategy: ClassificationStrategy,
    #[case] expected: bool,
) {
    assert_eq!(strategy.is_sequence_level(), expected);
}

#[rstest]
fn test_config_from_value() {
    let config = ClassifierConfig::from_value(json!({
        "num_classes": 5,
        "strategy": "time_wise",
        "dropout": 0.2,
        "logit_layer": {"bias": false}
    }))
    .unwrap();
    assert_eq!(config.num_classes, 5);
    assert_eq!(config.strategy, ClassificationStrategy::TimeWise);
    assert!(!config.logit_layer.bias);
    // Unspecified fields keep their defaults
    assert_eq!(config.name, "bert_classifier");
}

#[rstest]
fn test_config_from_value_rejects_unknown_strategy() {
    let result = ClassifierConfig::from_value(json!({ "strategy": "last_token" }));
    assert!(result.is_err());
}

#[rstest]
fn test_config_from_value_rejects_non_mapping_logit_layer() {
    let result = ClassifierConfig::from_value(json!({ "logit_layer": 5 }));
    assert!(result.is_err());
}

#[rstest]
fn test_validate_all_time_requires_max_seq_length() {
    let config = ClassifierConfig {
        strategy: ClassificationStrategy::AllTime,
        ..Default::default()
    };
    let error = config.validate().unwrap_err();
    assert!(format!("{}", error).contains("max_seq_length"));

    let config = ClassifierConfig {
        strategy: ClassificationStrategy::AllTime,
        max_seq_length: Some(128),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[rstest]
#[case(1.0)]
#[case(1.5)]
#[case(-0.1)]
fn test_validate_rejects_out_of_range_dropout(#[case] dropout: f32) {
    let config = ClassifierConfig {
        dropout,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[rstest]
fn test_model_config_loader_num_labels() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        json!({
            "hidden_size": 768,
            "id2label": {"0": "negative", "1": "neutral", "2": "positive"}
        })
        .to_string(),
    )
    .unwrap();

    let config_json = ModelConfigLoader::load_json_config(dir.path().to_str().unwrap()).unwrap();
    let id2label = ModelConfigLoader::extract_id2label(&config_json).unwrap();
    assert_eq!(id2label.len(), 3);
    assert_eq!(id2label[&2], "positive");
    assert_eq!(
        ModelConfigLoader::num_labels(&config_json).unwrap(),
        3
    );
}

#[rstest]
fn test_model_config_loader_missing_id2label() {
    let config_json = json!({ "hidden_size": 768 });
    let error = ModelConfigLoader::extract_id2label(&config_json).unwrap_err();
    assert!(format!("{}", error).contains("id2label"));
}

#[rstest]
fn test_model_config_loader_missing_file() {
    let result = ModelConfigLoader::load_json_config("/nonexistent/model/path");
    assert!(result.is_err());
}
