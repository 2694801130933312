//! Structured error handling for the classifier crate.
//!
//! Replaces ad-hoc `candle_core::Error::Msg` strings with one error type
//! whose variants carry the operation that failed and optional context.

use std::fmt;

/// Error type for all classifier operations
#[derive(Debug)]
pub enum ClassifierError {
    /// Configuration errors (file loading, parsing, invalid option combinations)
    Configuration {
        operation: String,
        source: ConfigErrorType,
        context: Option<String>,
    },

    /// Model errors (encoder/tokenizer/classifier loading and inference)
    Model {
        model_type: ModelErrorType,
        operation: String,
        source: String,
        context: Option<String>,
    },

    /// Processing errors (tensor operations, shape mismatches)
    Processing {
        operation: String,
        source: String,
        input_context: Option<String>,
    },

    /// Validation errors (parameter checks, query preconditions)
    Validation {
        field: String,
        expected: String,
        actual: String,
        context: Option<String>,
    },

    /// I/O errors (file and device access)
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
    },
}

/// Configuration error subtypes
#[derive(Debug)]
pub enum ConfigErrorType {
    FileNotFound(String),
    ParseError(String),
    MissingField(String),
    InvalidValue(String),
}

/// Model error subtypes
#[derive(Debug, Clone, Copy)]
pub enum ModelErrorType {
    Encoder,
    Tokenizer,
    Classifier,
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierError::Configuration {
                operation,
                source,
                context,
            } => {
                write!(f, "Configuration error in '{}': {}", operation, source)?;
                if let Some(ctx) = context {
                    write!(f, " (context: {})", ctx)?;
                }
                Ok(())
            }
            ClassifierError::Model {
                model_type,
                operation,
                source,
                context,
            } => {
                write!(
                    f,
                    "Model error ({:?}) in '{}': {}",
                    model_type, operation, source
                )?;
                if let Some(ctx) = context {
                    write!(f, " (context: {})", ctx)?;
                }
                Ok(())
            }
            ClassifierError::Processing {
                operation,
                source,
                input_context,
            } => {
                write!(f, "Processing error in '{}': {}", operation, source)?;
                if let Some(ctx) = input_context {
                    write!(f, " (input: {})", ctx)?;
                }
                Ok(())
            }
            ClassifierError::Validation {
                field,
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Validation error for '{}': expected '{}', got '{}'",
                    field, expected, actual
                )?;
                if let Some(ctx) = context {
                    write!(f, " (context: {})", ctx)?;
                }
                Ok(())
            }
            ClassifierError::Io {
                operation,
                path,
                source,
            } => {
                write!(f, "I/O error in '{}': {}", operation, source)?;
                if let Some(p) = path {
                    write!(f, " (path: {})", p)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ConfigErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorType::FileNotFound(path) => write!(f, "file not found: {}", path),
            ConfigErrorType::ParseError(msg) => write!(f, "parse error: {}", msg),
            ConfigErrorType::MissingField(field) => write!(f, "missing required field: {}", field),
            ConfigErrorType::InvalidValue(msg) => write!(f, "invalid value: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClassifierError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias used across the crate
pub type ClassifierResult<T> = Result<T, ClassifierError>;

impl From<std::io::Error> for ClassifierError {
    fn from(err: std::io::Error) -> Self {
        ClassifierError::Io {
            operation: "I/O operation".to_string(),
            path: None,
            source: err,
        }
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::Configuration {
            operation: "JSON parsing".to_string(),
            source: ConfigErrorType::ParseError(err.to_string()),
            context: None,
        }
    }
}

impl From<candle_core::Error> for ClassifierError {
    fn from(err: candle_core::Error) -> Self {
        ClassifierError::Processing {
            operation: "tensor operation".to_string(),
            source: err.to_string(),
            input_context: None,
        }
    }
}

impl From<hf_hub::api::sync::ApiError> for ClassifierError {
    fn from(err: hf_hub::api::sync::ApiError) -> Self {
        ClassifierError::Model {
            model_type: ModelErrorType::Encoder,
            operation: "hub download".to_string(),
            source: err.to_string(),
            context: None,
        }
    }
}

/// Interop with candle call sites that expect `candle_core::Error`
impl From<ClassifierError> for candle_core::Error {
    fn from(err: ClassifierError) -> Self {
        candle_core::Error::Msg(err.to_string())
    }
}

/// Create a configuration error
#[macro_export]
macro_rules! config_error {
    ($operation:expr, $msg:expr) => {
        $crate::core::error::ClassifierError::Configuration {
            operation: $operation.to_string(),
            source: $crate::core::error::ConfigErrorType::InvalidValue($msg.to_string()),
            context: None,
        }
    };
    ($operation:expr, $msg:expr, $context:expr) => {
        $crate::core::error::ClassifierError::Configuration {
            operation: $operation.to_string(),
            source: $crate::core::error::ConfigErrorType::InvalidValue($msg.to_string()),
            context: Some($context.to_string()),
        }
    };
}

/// Create a model error
#[macro_export]
macro_rules! model_error {
    ($model_type:expr, $operation:expr, $msg:expr) => {
        $crate::core::error::ClassifierError::Model {
            model_type: $model_type,
            operation: $operation.to_string(),
            source: $msg.to_string(),
            context: None,
        }
    };
    ($model_type:expr, $operation:expr, $msg:expr, $context:expr) => {
        $crate::core::error::ClassifierError::Model {
            model_type: $model_type,
            operation: $operation.to_string(),
            source: $msg.to_string(),
            context: Some($context.to_string()),
        }
    };
}

/// Create a processing error
#[macro_export]
macro_rules! processing_error {
    ($operation:expr, $msg:expr) => {
        $crate::core::error::ClassifierError::Processing {
            operation: $operation.to_string(),
            source: $msg.to_string(),
            input_context: None,
        }
    };
    ($operation:expr, $msg:expr, $input:expr) => {
        $crate::core::error::ClassifierError::Processing {
            operation: $operation.to_string(),
            source: $msg.to_string(),
            input_context: Some($input.to_string()),
        }
    };
}

/// Create a validation error
#[macro_export]
macro_rules! validation_error {
    ($field:expr, $expected:expr, $actual:expr) => {
        $crate::core::error::ClassifierError::Validation {
            field: $field.to_string(),
            expected: $expected.to_string(),
            actual: $actual.to_string(),
            context: None,
        }
    };
    ($field:expr, $expected:expr, $actual:expr, $context:expr) => {
        $crate::core::error::ClassifierError::Validation {
            field: $field.to_string(),
            expected: $expected.to_string(),
            actual: $actual.to_string(),
            context: Some($context.to_string()),
        }
    };
}

/// Configuration file loading errors
pub mod config_errors {
    use super::*;

    pub fn file_not_found(path: &str) -> ClassifierError {
        ClassifierError::Configuration {
            operation: "config file loading".to_string(),
            source: ConfigErrorType::FileNotFound(path.to_string()),
            context: None,
        }
    }

    pub fn missing_field(field: &str, file: &str) -> ClassifierError {
        ClassifierError::Configuration {
            operation: "config validation".to_string(),
            source: ConfigErrorType::MissingField(field.to_string()),
            context: Some(format!("in file: {}", file)),
        }
    }

    pub fn invalid_json(file: &str, error: &str) -> ClassifierError {
        ClassifierError::Configuration {
            operation: "JSON parsing".to_string(),
            source: ConfigErrorType::ParseError(error.to_string()),
            context: Some(format!("file: {}", file)),
        }
    }
}

/// Processing operation errors
pub mod processing_errors {
    use super::*;

    pub fn tensor_operation(operation: &str, error: &str) -> ClassifierError {
        ClassifierError::Processing {
            operation: format!("tensor {}", operation),
            source: error.to_string(),
            input_context: None,
        }
    }

    pub fn sequence_too_long(seq_len: usize, max_seq_length: usize) -> ClassifierError {
        ClassifierError::Processing {
            operation: "time-axis padding".to_string(),
            source: format!(
                "input sequence length {} exceeds configured max_seq_length {}",
                seq_len, max_seq_length
            ),
            input_context: None,
        }
    }
}
